/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions MUST go through this module, behind the `ChatModel`
/// trait so tests can substitute scripted backends.
///
/// Model: gpt-4o (hardcoded — do not make configurable to prevent drift)
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 3;
const CALL_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("LLM returned no choices")]
    EmptyChoices,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

/// One role-tagged message. `content` is a JSON value because the vision
/// call sends an array of text and image parts rather than a plain string.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// The chat backend seam. Production uses `LlmClient`; tests use scripted
/// fakes. Carried in `AppState` as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends a single user message and returns the first choice's content.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Sends image bytes with the extraction instruction and returns the
    /// model's transcription.
    async fn extract_text_from_image(
        &self,
        image: &[u8],
        filename: &str,
    ) -> Result<String, LlmError>;
}

/// The real LLM client. Wraps an OpenAI-compatible chat-completions API
/// with bounded retry and a per-call timeout.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(CALL_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_base,
            api_key,
        }
    }

    /// Makes a raw chat-completions call.
    /// Retries on 429 (rate limit), 5xx, and transport errors with jittered
    /// exponential backoff; other 4xx fail immediately.
    async fn send(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages,
        };
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(url.as_str())
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse the provider's error message
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            debug!("LLM call succeeded with {} choice(s)", chat.choices.len());
            return Ok(chat);
        }

        if let Some(e) = last_error {
            warn!("LLM retry budget spent, last error: {e}");
        }
        Err(LlmError::RetriesExhausted {
            attempts: MAX_RETRIES,
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let messages = vec![ChatMessage {
            role: "user",
            content: json!(prompt),
        }];
        let chat = self.send(messages).await?;
        first_choice_text(chat)
    }

    async fn extract_text_from_image(
        &self,
        image: &[u8],
        filename: &str,
    ) -> Result<String, LlmError> {
        let messages = vec![ChatMessage {
            role: "user",
            content: json!([
                { "type": "text", "text": prompts::IMAGE_EXTRACTION_INSTRUCTION },
                { "type": "image_url", "image_url": { "url": image_data_url(image, filename) } },
            ]),
        }];
        let chat = self.send(messages).await?;
        first_choice_text(chat)
    }
}

/// Extracts the trimmed content of the first choice.
/// Absent choices or empty content are the same recoverable failure.
fn first_choice_text(chat: ChatResponse) -> Result<String, LlmError> {
    let content = chat
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(LlmError::EmptyChoices);
    }
    Ok(content)
}

/// Exponential backoff with jitter: 1s, 2s, 4s plus up to 1s of noise.
fn backoff_delay(attempt: u32) -> Duration {
    let base = 1000u64 * (1 << (attempt - 1));
    let jitter = rand::thread_rng().gen_range(0..1000);
    Duration::from_millis(base + jitter)
}

/// Builds the data URL for a vision message from raw image bytes.
fn image_data_url(image: &[u8], filename: &str) -> String {
    let subtype = match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "jpeg",
        Some("webp") => "webp",
        Some("gif") => "gif",
        _ => "png",
    };
    format!("data:image/{subtype};base64,{}", BASE64.encode(image))
}
