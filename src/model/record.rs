use serde::{Deserialize, Serialize};

/// Tradução padrão quando a linha não traz nenhuma.
pub const UNKNOWN_TRANSLATION: &str = "unknown";

/// Uma linha do corpus já dividida em frase japonesa e tradução.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedEntry {
    pub japanese: String,
    pub translation: String,
}

impl SegmentedEntry {
    pub fn new(japanese: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            japanese: japanese.into(),
            translation: translation.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AudioRecord {
    #[serde(default)]
    pub line_number: usize,

    pub japanese: String,

    #[serde(default = "default_translation")]
    pub translation: String,

    pub artifact_filename: String,

    #[serde(default)]
    pub exists: bool,
}

fn default_translation() -> String {
    UNKNOWN_TRANSLATION.to_string()
}
