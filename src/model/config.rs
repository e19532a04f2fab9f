use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data").join("corpus").join("lyrics.txt")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data").join("static").join("sounds")
}

fn default_missing_path() -> PathBuf {
    PathBuf::from("data").join("missing_sounds.txt")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("data").join("audio_report.json")
}

fn default_language() -> String {
    "ja".to_string()
}

fn default_locale() -> String {
    "ja-JP".to_string()
}

fn default_rate() -> String {
    "-25%".to_string()
}

fn default_concurrency() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_output_format() -> String {
    "audio-24khz-48kbitrate-mono-mp3".to_string()
}

/// Tudo que uma execução precisa. Caminhos relativos são resolvidos contra o
/// diretório base em `services::config::load`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_corpus_path", alias = "corpus")]
    pub corpus_path: PathBuf,

    #[serde(default = "default_cache_dir", alias = "sound_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_missing_path")]
    pub missing_path: PathBuf,

    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// Ajuste de velocidade enviado em toda requisição, ex.: `-25%`.
    #[serde(default = "default_rate")]
    pub rate: String,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            cache_dir: default_cache_dir(),
            missing_path: default_missing_path(),
            report_path: default_report_path(),
            language: default_language(),
            locale: default_locale(),
            rate: default_rate(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_timeout_secs(),
            provider: ProviderConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            api_key: String::new(),
            output_format: default_output_format(),
        }
    }
}
