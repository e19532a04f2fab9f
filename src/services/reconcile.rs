use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::model::config::AppConfig;
use crate::model::record::{AudioRecord, UNKNOWN_TRANSLATION};
use crate::parsers::segment;
use crate::services::{encoding, sanitize, store};

static STRAY_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[a-zA-Z\\]\s*$").expect("static regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<AudioRecord>,
    /// Frases sem áudio, na ordem do corpus. Duplicatas são mantidas.
    pub missing: Vec<String>,
    /// Números das linhas que não renderam parte japonesa.
    pub skipped: Vec<usize>,
}

impl Reconciliation {
    pub fn cached(&self) -> usize {
        self.records.iter().filter(|r| r.exists).count()
    }
}

/// Executa a reconciliação completa: lê o corpus, confere o cache e grava o
/// arquivo de faltantes e o relatório JSON.
pub fn run(cfg: &AppConfig) -> Result<Reconciliation, ConfigError> {
    let text = encoding::read_corpus(&cfg.corpus_path)?;

    fs::create_dir_all(&cfg.cache_dir).map_err(|source| ConfigError::CacheDir {
        path: cfg.cache_dir.clone(),
        source,
    })?;

    log::info!(
        "reconciling {} ({} lines) against {}",
        cfg.corpus_path.display(),
        text.lines().count(),
        cfg.cache_dir.display()
    );

    let result = reconcile(&text, &cfg.cache_dir);

    store::save_missing(&cfg.missing_path, &result.missing)?;
    store::save_report(&cfg.report_path, &result.records)?;

    log::info!(
        "{} records, {} missing, missing list saved to {}",
        result.records.len(),
        result.missing.len(),
        cfg.missing_path.display()
    );

    Ok(result)
}

/// Parte pura da reconciliação: só toca o disco para checar existência.
pub fn reconcile(corpus: &str, cache_dir: &Path) -> Reconciliation {
    let mut out = Reconciliation::default();

    for (i, raw) in corpus.lines().enumerate() {
        let ln = i + 1;

        let Some(entry) = segment::segment(raw) else {
            continue;
        };

        let japanese = STRAY_TAIL.replace(&entry.japanese, "");
        let japanese = WHITESPACE.replace_all(japanese.trim(), " ").into_owned();

        let Some(artifact_filename) = sanitize::artifact_filename(&japanese) else {
            log::warn!("line {ln}: no usable Japanese text: {}", raw.trim());
            out.skipped.push(ln);
            continue;
        };

        // segment() apara a linha antes de dividir e usa "unknown" no fallback;
        // com o segmentador atual a tradução não chega vazia aqui.
        let translation = if entry.translation.is_empty() {
            log::warn!("line {ln}: missing translation: {}", raw.trim());
            UNKNOWN_TRANSLATION.to_string()
        } else {
            entry.translation
        };

        let exists = cache_dir.join(&artifact_filename).exists();

        if exists {
            log::debug!("cached: {japanese} -> {translation}");
        } else {
            log::debug!("missing: {japanese} -> {translation}");
            out.missing.push(japanese.replace('\\', "").trim().to_string());
        }

        out.records.push(AudioRecord {
            line_number: ln,
            japanese,
            translation,
            artifact_filename,
            exists,
        });
    }

    out
}
