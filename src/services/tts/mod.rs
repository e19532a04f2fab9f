pub mod azure;

use std::future::Future;

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Voice {
    #[serde(rename = "ShortName", alias = "short_name")]
    pub short_name: String,

    #[serde(rename = "Locale", alias = "locale")]
    pub locale: String,
}

impl Voice {
    pub fn new(short_name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            locale: locale.into(),
        }
    }

    /// `ja-JP` -> `ja`
    pub fn language(&self) -> &str {
        self.locale.split('-').next().unwrap_or("")
    }
}

/// Serviço externo de síntese de voz.
pub trait TtsProvider: Send + Sync {
    fn list_voices(&self) -> impl Future<Output = Result<Vec<Voice>, SynthesisError>> + Send;

    /// Retorna o áudio já codificado (MP3).
    fn synthesize(
        &self,
        text: &str,
        voice: &Voice,
        rate: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SynthesisError>> + Send;
}

#[derive(Debug, PartialEq, Eq)]
pub enum VoiceLookup<'a> {
    Found(Vec<&'a Voice>),
    NotFound,
}

impl<'a> VoiceLookup<'a> {
    fn from_vec(voices: Vec<&'a Voice>) -> Self {
        if voices.is_empty() {
            VoiceLookup::NotFound
        } else {
            VoiceLookup::Found(voices)
        }
    }

    fn or_else(self, f: impl FnOnce() -> VoiceLookup<'a>) -> Self {
        match self {
            VoiceLookup::NotFound => f(),
            found => found,
        }
    }

    /// Escolha uniforme. Variedade de vozes num corpus grande é desejável.
    pub fn choose(&self) -> Option<&'a Voice> {
        match self {
            VoiceLookup::Found(voices) => voices.choose(&mut thread_rng()).copied(),
            VoiceLookup::NotFound => None,
        }
    }
}

/// Catálogo carregado uma vez por execução.
#[derive(Debug, Default, Clone)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// Falha no provedor vira catálogo vazio: cada frase registra o próprio
    /// `VoiceNotFound` em vez de derrubar o lote.
    pub async fn fetch<P: TtsProvider>(provider: &P) -> Self {
        match provider.list_voices().await {
            Ok(voices) => {
                log::info!("voice catalog loaded: {} voices", voices.len());
                Self::new(voices)
            }
            Err(e) => {
                log::error!("failed to load voice catalog: {e}");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn find(&self, language: &str, locale: Option<&str>) -> VoiceLookup<'_> {
        VoiceLookup::from_vec(
            self.voices
                .iter()
                .filter(|v| v.language().eq_ignore_ascii_case(language))
                .filter(|v| locale.map_or(true, |l| v.locale.eq_ignore_ascii_case(l)))
                .collect(),
        )
    }

    /// Locale primeiro; se vazio, só o idioma.
    pub fn candidates(&self, language: &str, locale: &str) -> VoiceLookup<'_> {
        self.find(language, Some(locale)).or_else(|| {
            log::warn!("no {locale} voice, falling back to any {language} voice");
            self.find(language, None)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::new(vec![
            Voice::new("ja-JP-NanamiNeural", "ja-JP"),
            Voice::new("ja-JP-KeitaNeural", "ja-JP"),
            Voice::new("zh-CN-XiaoxiaoNeural", "zh-CN"),
        ])
    }

    #[test]
    fn language_comes_from_locale() {
        assert_eq!(Voice::new("x", "ja-JP").language(), "ja");
        assert_eq!(Voice::new("x", "ja").language(), "ja");
    }

    #[test]
    fn locale_filter_wins_when_non_empty() {
        let c = catalog();
        match c.candidates("ja", "ja-JP") {
            VoiceLookup::Found(v) => assert_eq!(v.len(), 2),
            VoiceLookup::NotFound => panic!("expected voices"),
        }
    }

    #[test]
    fn falls_back_to_language_only() {
        let c = VoiceCatalog::new(vec![Voice::new("ja-XX-Test", "ja-XX")]);
        let found = c.candidates("ja", "ja-JP");
        assert_eq!(found.choose().map(|v| v.short_name.as_str()), Some("ja-XX-Test"));
    }

    #[test]
    fn unknown_language_is_not_found() {
        let c = catalog();
        assert_eq!(c.candidates("ko", "ko-KR"), VoiceLookup::NotFound);
        assert_eq!(c.candidates("ko", "ko-KR").choose(), None);
        assert_eq!(VoiceCatalog::default().candidates("ja", "ja-JP"), VoiceLookup::NotFound);
    }

    #[test]
    fn choose_stays_within_candidates() {
        let c = catalog();
        let lookup = c.candidates("ja", "ja-JP");
        for _ in 0..32 {
            let v = lookup.choose().expect("voice");
            assert_eq!(v.locale, "ja-JP");
        }
    }

    #[test]
    fn voices_parse_from_catalog_json() {
        let json = r#"[{"Name":"Microsoft Server Speech Text to Speech Voice (ja-JP, NanamiNeural)",
                        "ShortName":"ja-JP-NanamiNeural","Gender":"Female","Locale":"ja-JP"}]"#;
        let voices: Vec<Voice> = serde_json::from_str(json).unwrap();
        assert_eq!(voices, vec![Voice::new("ja-JP-NanamiNeural", "ja-JP")]);
    }
}
