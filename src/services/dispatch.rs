use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rand::{thread_rng, Rng};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::SynthesisError;
use crate::model::config::AppConfig;
use crate::services::sanitize;
use crate::services::tts::azure::retry_budget;
use crate::services::tts::{TtsProvider, Voice, VoiceCatalog};

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub cache_dir: PathBuf,
    pub language: String,
    pub locale: String,
    pub rate: String,
    pub concurrency: usize,
    pub call_timeout: Duration,
}

impl From<&AppConfig> for DispatchConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            cache_dir: cfg.cache_dir.clone(),
            language: cfg.language.clone(),
            locale: cfg.locale.clone(),
            rate: cfg.rate.clone(),
            concurrency: cfg.concurrency.max(1),
            // O cliente HTTP usa `request_timeout_secs` por tentativa; aqui cabe o retry inteiro.
            call_timeout: retry_budget(Duration::from_secs(cfg.request_timeout_secs)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseOutcome {
    Synthesized { voice: String },
    Cached,
    Cancelled,
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct PhraseResult {
    pub phrase: String,
    pub outcome: PhraseOutcome,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub synthesized: usize,
    pub cached: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub items: Vec<PhraseResult>,
}

impl DispatchReport {
    fn push(&mut self, item: PhraseResult) {
        match item.outcome {
            PhraseOutcome::Synthesized { .. } => self.synthesized += 1,
            PhraseOutcome::Cached => self.cached += 1,
            PhraseOutcome::Cancelled => self.cancelled += 1,
            PhraseOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(item);
    }
}

/// Sintetiza cada frase faltante de forma independente.
///
/// No máximo `concurrency` chamadas ao provedor ficam em andamento. Falha de
/// uma frase nunca interrompe as outras. Depois de `cancel`, frases que ainda
/// não pegaram permissão são marcadas como canceladas; as que já estão no
/// provedor terminam normalmente.
pub async fn dispatch<P>(
    phrases: Vec<String>,
    provider: Arc<P>,
    catalog: Arc<VoiceCatalog>,
    cfg: DispatchConfig,
    cancel: CancellationToken,
) -> DispatchReport
where
    P: TtsProvider + 'static,
{
    let gate = Arc::new(Semaphore::new(cfg.concurrency.max(1)));
    let cfg = Arc::new(cfg);

    let mut tasks = JoinSet::new();

    for phrase in phrases {
        let provider = Arc::clone(&provider);
        let catalog = Arc::clone(&catalog);
        let gate = Arc::clone(&gate);
        let cfg = Arc::clone(&cfg);
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let outcome = process_phrase(&phrase, &*provider, &catalog, &gate, &cfg, &cancel).await;
            PhraseResult { phrase, outcome }
        });
    }

    let mut report = DispatchReport::default();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(item) => report.push(item),
            Err(e) => {
                log::error!("synthesis task aborted: {e}");
                report.push(PhraseResult {
                    phrase: String::new(),
                    outcome: PhraseOutcome::Failed {
                        error: e.to_string(),
                    },
                });
            }
        }
    }

    report
}

async fn process_phrase<P: TtsProvider>(
    phrase: &str,
    provider: &P,
    catalog: &VoiceCatalog,
    gate: &Semaphore,
    cfg: &DispatchConfig,
    cancel: &CancellationToken,
) -> PhraseOutcome {
    if cancel.is_cancelled() {
        return PhraseOutcome::Cancelled;
    }

    match synthesize_one(phrase, provider, catalog, gate, cfg, cancel).await {
        Ok(outcome) => {
            if let PhraseOutcome::Synthesized { voice } = &outcome {
                log::info!("synthesized '{phrase}' with {voice}");
            }
            outcome
        }
        Err(e) => {
            log::warn!("failed to synthesize '{phrase}': {e}");
            PhraseOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

async fn synthesize_one<P: TtsProvider>(
    phrase: &str,
    provider: &P,
    catalog: &VoiceCatalog,
    gate: &Semaphore,
    cfg: &DispatchConfig,
    cancel: &CancellationToken,
) -> Result<PhraseOutcome, SynthesisError> {
    // Recalcula o nome: a frase veio do arquivo de faltantes, não do corpus.
    let file_name = sanitize::artifact_filename(phrase).ok_or(SynthesisError::EmptyKey)?;
    let output = cfg.cache_dir.join(&file_name);

    if output.exists() {
        log::debug!("already cached: {}", output.display());
        return Ok(PhraseOutcome::Cached);
    }

    let voice: Voice = catalog
        .candidates(&cfg.language, &cfg.locale)
        .choose()
        .cloned()
        .ok_or_else(|| SynthesisError::VoiceNotFound {
            language: cfg.language.clone(),
            locale: cfg.locale.clone(),
        })?;

    let _permit = tokio::select! {
        permit = gate.acquire() => permit.map_err(|e| SynthesisError::Provider(e.to_string()))?,
        _ = cancel.cancelled() => return Ok(PhraseOutcome::Cancelled),
    };

    // Outra tarefa (frase duplicada) pode ter gravado enquanto esperávamos.
    if output.exists() {
        return Ok(PhraseOutcome::Cached);
    }

    log::debug!("requesting '{phrase}' with {}", voice.short_name);

    let audio = tokio::time::timeout(cfg.call_timeout, provider.synthesize(phrase, &voice, &cfg.rate))
        .await
        .map_err(|_| SynthesisError::Timeout(cfg.call_timeout))??;

    write_artifact(&output, &audio).await?;

    Ok(PhraseOutcome::Synthesized {
        voice: voice.short_name,
    })
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), SynthesisError> {
    let io_err = |source| SynthesisError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Um temporário por escritor: frases duplicadas podem gravar ao mesmo tempo.
    let tmp = unique_tmp_path(path);

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }

    Ok(())
}

fn unique_tmp_path(path: &Path) -> PathBuf {
    let suffix: u64 = thread_rng().gen();
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    path.with_file_name(format!("{file_name}.{suffix:016x}.tmp"))
}
