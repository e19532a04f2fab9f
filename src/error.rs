use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Falhas de execução. Qualquer uma delas aborta a rodada inteira.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("corpus file not found: {}", .0.display())]
    CorpusNotFound(PathBuf),

    #[error("failed to create cache directory {}: {source}", path.display())]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("missing TTS credentials: set {0}")]
    MissingCredentials(&'static str),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Falhas por frase. São registradas e contadas, nunca passam da frase que
/// as gerou.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no voice found for locale {locale} or language {language}")]
    VoiceNotFound { language: String, locale: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("text sanitizes to an empty file name")]
    EmptyKey,

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
