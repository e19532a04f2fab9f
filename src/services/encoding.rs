use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::error::ConfigError;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, PartialEq)]
pub struct EncodingGuess {
    pub name: String,
    pub confidence: f32,
}

/// Lê o corpus como texto. Arquivos que não são UTF-8 (Shift_JIS, GBK...)
/// passam pelo chardetng em vez de falhar.
pub fn read_corpus(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::CorpusNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, guess) = decode(&bytes);
    if guess.name != "utf-8" {
        log::warn!(
            "corpus {} is not UTF-8, decoded as {} (confidence {:.2})",
            path.display(),
            guess.name,
            guess.confidence
        );
    }

    Ok(text)
}

pub fn decode(bytes: &[u8]) -> (String, EncodingGuess) {
    let body = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(body) {
        return (
            text.to_string(),
            EncodingGuess {
                name: "utf-8".into(),
                confidence: 0.99,
            },
        );
    }

    let mut detector = EncodingDetector::new();
    detector.feed(body, true);

    let encoding = detector.guess(None, true);
    let confidence = estimate_confidence(body, encoding);
    let (text, _, _) = encoding.decode(body);

    (
        text.into_owned(),
        EncodingGuess {
            name: encoding.name().to_lowercase(),
            confidence,
        },
    )
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    if encoding == UTF_8 {
        // Já falhou na validação acima; o detector só não achou nada melhor.
        return 0.20;
    }

    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
