use std::time::Duration;

use rand::{thread_rng, Rng};
use reqwest::{Client, StatusCode};

use super::{TtsProvider, Voice};
use crate::error::{ConfigError, SynthesisError};
use crate::model::config::ProviderConfig;

pub const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const USER_AGENT: &str = concat!("lyric-voice-core/", env!("CARGO_PKG_VERSION"));

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

/// Tempo máximo de uma chamada completa: todas as tentativas mais o pior
/// backoff entre elas. `per_attempt` é o timeout do cliente HTTP.
pub fn retry_budget(per_attempt: Duration) -> Duration {
    let pauses: u64 = (0..MAX_RETRIES - 1)
        .map(|a| BASE_DELAY_MS * 2_u64.pow(a as u32) + 200)
        .sum();
    per_attempt * MAX_RETRIES as u32 + Duration::from_millis(pauses)
}

/// Azure Speech (REST). Mesmo catálogo de vozes neurais do Edge.
pub struct AzureSpeech {
    client: Client,
    base_url: String,
    api_key: String,
    output_format: String,
}

impl AzureSpeech {
    pub fn new(cfg: &ProviderConfig, timeout: Duration) -> Result<Self, ConfigError> {
        if cfg.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials("AZURE_SPEECH_KEY"));
        }
        if cfg.region.trim().is_empty() {
            return Err(ConfigError::MissingCredentials("AZURE_SPEECH_REGION"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::InvalidConfig {
                path: "provider".into(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: format!("https://{}.tts.speech.microsoft.com", cfg.region.trim()),
            api_key: cfg.api_key.trim().to_string(),
            output_format: cfg.output_format.clone(),
        })
    }

    /// GET/POST com as mesmas regras de retry: 408/429/5xx e erros de transporte.
    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SynthesisError> {
        let mut last_err = String::from("no attempt made");

        for attempt in 0..MAX_RETRIES {
            let is_last = attempt + 1 == MAX_RETRIES;

            match build().send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp);
                    }

                    // Lê como texto: preserva a mensagem mesmo quando não é JSON
                    let text = resp.text().await.unwrap_or_default();
                    last_err = extract_error_message(status, &text);

                    if !should_retry_http(status) || is_last {
                        break;
                    }
                }
                Err(err) => {
                    last_err = err.to_string();
                    if is_last {
                        break;
                    }
                }
            }

            log::debug!("attempt {} failed: {last_err}", attempt + 1);
            tokio::time::sleep(backoff(attempt)).await;
        }

        Err(SynthesisError::Provider(last_err))
    }
}

impl TtsProvider for AzureSpeech {
    async fn list_voices(&self) -> Result<Vec<Voice>, SynthesisError> {
        let url = format!("{}/cognitiveservices/voices/list", self.base_url);

        let resp = self
            .send_with_retry(|| {
                self.client
                    .get(&url)
                    .header("Ocp-Apim-Subscription-Key", &self.api_key)
            })
            .await?;

        resp.json::<Vec<Voice>>()
            .await
            .map_err(|e| SynthesisError::Provider(format!("invalid voice list: {e}")))
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &Voice,
        rate: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/cognitiveservices/v1", self.base_url);
        let body = build_ssml(text, voice, rate);

        let resp = self
            .send_with_retry(|| {
                self.client
                    .post(&url)
                    .header("Ocp-Apim-Subscription-Key", &self.api_key)
                    .header("Content-Type", "application/ssml+xml")
                    .header("X-Microsoft-OutputFormat", &self.output_format)
                    .body(body.clone())
            })
            .await?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SynthesisError::Provider(e.to_string()))?;

        if bytes.is_empty() {
            return Err(SynthesisError::Provider("empty audio response".into()));
        }

        Ok(bytes.to_vec())
    }
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx tipicamente são temporários
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    if trimmed.is_empty() {
        return format!("HTTP {}", status.as_u16());
    }

    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("HTTP {}: {}...", status.as_u16(), snippet)
    } else {
        format!("HTTP {}: {}", status.as_u16(), snippet)
    }
}

fn build_ssml(text: &str, voice: &Voice, rate: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'>\
         <voice name='{}'><prosody rate='{}'>{}</prosody></voice></speak>",
        escape_xml(&voice.locale),
        escape_xml(&voice.short_name),
        escape_xml(rate),
        escape_xml(text)
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
