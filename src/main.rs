use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

mod error;
mod model;
mod parsers;
mod services;

use services::dispatch::{self, DispatchConfig, DispatchReport};
use services::tts::azure::AzureSpeech;
use services::tts::VoiceCatalog;
use services::{config, reconcile, store};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let started = Instant::now();

    let cfg = match config::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let reconciled = match reconcile::run(&cfg) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "{} cached, {} missing, {} lines skipped",
        reconciled.cached(),
        reconciled.missing.len(),
        reconciled.skipped.len()
    );

    if reconciled.missing.is_empty() {
        log::info!("all audio files already exist, nothing to synthesize");
        println!(
            "{}",
            summary(reconciled.records.len(), 0, None, started.elapsed())
        );
        return ExitCode::SUCCESS;
    }

    // O dispatcher só conhece o arquivo de faltantes, nunca o corpus.
    let phrases = match store::load_missing(&cfg.missing_path) {
        Ok(p) => p,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let provider = match AzureSpeech::new(
        &cfg.provider,
        Duration::from_secs(cfg.request_timeout_secs),
    ) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("{} phrases missing audio, starting synthesis", phrases.len());

    let catalog = Arc::new(VoiceCatalog::fetch(&*provider).await);
    if catalog.is_empty() {
        log::warn!("voice catalog is empty, every phrase will fail");
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupted, finishing in-flight requests");
                cancel.cancel();
            }
        });
    }

    let total = phrases.len();
    let report = dispatch::dispatch(
        phrases,
        provider,
        catalog,
        DispatchConfig::from(&cfg),
        cancel,
    )
    .await;

    println!(
        "{}",
        summary(reconciled.records.len(), total, Some(&report), started.elapsed())
    );

    ExitCode::SUCCESS
}

fn summary(
    records: usize,
    missing: usize,
    report: Option<&DispatchReport>,
    elapsed: Duration,
) -> String {
    let secs = elapsed.as_secs_f64();
    let per_item_base = if missing > 0 { missing } else { records.max(1) };
    let avg = secs / per_item_base as f64;

    match report {
        Some(r) => format!(
            "{records} lines, {missing} missing: {} synthesized, {} cached, {} failed, {} cancelled in {secs:.2}s ({avg:.2}s per item)",
            r.synthesized, r.cached, r.failed, r.cancelled
        ),
        None => format!("{records} lines, 0 missing in {secs:.2}s ({avg:.2}s per item)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_without_dispatch() {
        let s = summary(4, 0, None, Duration::from_secs(2));
        assert_eq!(s, "4 lines, 0 missing in 2.00s (0.50s per item)");
    }

    #[test]
    fn summary_with_dispatch_averages_over_missing() {
        let report = DispatchReport {
            synthesized: 2,
            cached: 1,
            failed: 1,
            cancelled: 0,
            items: Vec::new(),
        };
        let s = summary(10, 4, Some(&report), Duration::from_secs(8));
        assert_eq!(
            s,
            "10 lines, 4 missing: 2 synthesized, 1 cached, 1 failed, 0 cancelled in 8.00s (2.00s per item)"
        );
    }

    #[test]
    fn summary_with_empty_corpus() {
        let s = summary(0, 0, None, Duration::from_millis(500));
        assert_eq!(s, "0 lines, 0 missing in 0.50s (0.50s per item)");
    }
}
