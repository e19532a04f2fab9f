use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "lyric_voice.json";

fn base_dir() -> PathBuf {
    if let Ok(home) = std::env::var("LYRIC_VOICE_HOME") {
        return PathBuf::from(home);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Carrega a configuração do diretório base (`$LYRIC_VOICE_HOME` ou o
/// diretório atual) e aplica as variáveis de ambiente por cima.
pub fn load() -> Result<AppConfig, ConfigError> {
    let base = base_dir();
    let mut cfg = load_from(&base)?;
    apply_env(&mut cfg, |key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Lê `<base>/lyric_voice.json` se existir e resolve caminhos relativos.
pub fn load_from(base: &Path) -> Result<AppConfig, ConfigError> {
    let path = base.join(CONFIG_FILE);

    let mut cfg = if path.exists() {
        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str::<AppConfig>(&data).map_err(|e| ConfigError::InvalidConfig {
            path: path.clone(),
            message: e.to_string(),
        })?
    } else {
        log::debug!("no {} in {}, using defaults", CONFIG_FILE, base.display());
        AppConfig::default()
    };

    for p in [
        &mut cfg.corpus_path,
        &mut cfg.cache_dir,
        &mut cfg.missing_path,
        &mut cfg.report_path,
    ] {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    }

    Ok(cfg)
}

fn apply_env(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    if let Some(corpus) = non_empty("LYRIC_VOICE_CORPUS") {
        cfg.corpus_path = PathBuf::from(corpus);
    }
    if let Some(key) = non_empty("AZURE_SPEECH_KEY") {
        cfg.provider.api_key = key;
    }
    if let Some(region) = non_empty("AZURE_SPEECH_REGION") {
        cfg.provider.region = region;
    }
}

fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.concurrency == 0 {
        return Err(ConfigError::InvalidConfig {
            path: PathBuf::from(CONFIG_FILE),
            message: "concurrency must be at least 1".into(),
        });
    }
    if cfg.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfig {
            path: PathBuf::from(CONFIG_FILE),
            message: "request_timeout_secs must be at least 1".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_against_base() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from(dir.path()).unwrap();

        assert_eq!(cfg.cache_dir, dir.path().join("data").join("static").join("sounds"));
        assert_eq!(cfg.missing_path, dir.path().join("data").join("missing_sounds.txt"));
        assert_eq!(cfg.concurrency, 5);
        assert_eq!(cfg.rate, "-25%");
        assert_eq!(cfg.locale, "ja-JP");
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("elsewhere").join("songs.txt");
        fs::write(
            dir.path().join(CONFIG_FILE),
            serde_json::json!({
                "corpus": abs,
                "sound_dir": "audio",
                "concurrency": 2,
                "provider": { "region": "japaneast" }
            })
            .to_string(),
        )
        .unwrap();

        let cfg = load_from(dir.path()).unwrap();
        assert_eq!(cfg.corpus_path, abs);
        assert_eq!(cfg.cache_dir, dir.path().join("audio"));
        assert_eq!(cfg.concurrency, 2);
        assert_eq!(cfg.provider.region, "japaneast");
        assert_eq!(cfg.provider.output_format, "audio-24khz-48kbitrate-mono-mp3");
    }

    #[test]
    fn broken_file_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(matches!(
            load_from(dir.path()),
            Err(ConfigError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn env_overrides_credentials_and_corpus() {
        let mut cfg = AppConfig::default();
        apply_env(&mut cfg, |key| match key {
            "AZURE_SPEECH_KEY" => Some("secret".into()),
            "AZURE_SPEECH_REGION" => Some("  ".into()),
            "LYRIC_VOICE_CORPUS" => Some("/tmp/lyrics.txt".into()),
            _ => None,
        });

        assert_eq!(cfg.provider.api_key, "secret");
        assert_eq!(cfg.provider.region, "");
        assert_eq!(cfg.corpus_path, PathBuf::from("/tmp/lyrics.txt"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg = AppConfig {
            concurrency: 0,
            ..AppConfig::default()
        };
        assert!(validate(&cfg).is_err());
        assert!(validate(&AppConfig::default()).is_ok());
    }
}
