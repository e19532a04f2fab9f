use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::record::AudioRecord;

/// Sobrescreve o arquivo de frases faltantes, uma por linha.
pub fn save_missing(path: &Path, phrases: &[String]) -> Result<(), ConfigError> {
    let mut out = String::new();

    for phrase in phrases {
        // Garante uma frase limpa por linha: sem barra invertida nem quebra embutida.
        let clean = phrase.replace('\\', "");
        let clean = clean.trim();
        if clean.is_empty() || clean.contains('\n') {
            log::warn!("skipping unwritable phrase {phrase:?}");
            continue;
        }
        out.push_str(clean);
        out.push('\n');
    }

    write_atomic(path, out.as_bytes())
}

/// Lê as frases faltantes. Arquivo ausente conta como lista vazia.
pub fn load_missing(path: &Path) -> Result<Vec<String>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn save_report(path: &Path, records: &[AudioRecord]) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(records).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    write_atomic(path, json.as_bytes())
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    fs::write(&tmp, bytes).map_err(io_err)?;

    if path.exists() {
        fs::remove_file(path).map_err(io_err)?;
    }

    fs::rename(&tmp, path).map_err(io_err)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "out".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("missing.txt");

        save_missing(&path, &["愛よ".to_string(), "愛よ".to_string(), "a\\b".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "愛よ\n愛よ\nab\n");

        save_missing(&path, &["おやすみ".to_string()]).unwrap();
        assert_eq!(load_missing(&path).unwrap(), vec!["おやすみ".to_string()]);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn absent_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_missing(&dir.path().join("none.txt")).unwrap().is_empty());
    }

    #[test]
    fn load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        fs::write(&path, "\n  愛よ  \n\n").unwrap();
        assert_eq!(load_missing(&path).unwrap(), vec!["愛よ".to_string()]);
    }

    #[test]
    fn report_is_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let records = vec![AudioRecord {
            line_number: 3,
            japanese: "愛よ".into(),
            translation: "爱啊".into(),
            artifact_filename: "愛よ.mp3".into(),
            exists: false,
        }];

        save_report(&path, &records).unwrap();

        let back: Vec<AudioRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, records);
    }
}
