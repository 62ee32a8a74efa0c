/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the vendor API directly.
/// Retries are deliberately absent: a failed call fails the attempt and the
/// job records the error.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::LlmSettings;

pub mod prompts;

const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENROUTER_API_KEY is not set")]
    MissingApiKey,

    #[error("LLM API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("No response received from LLM API")]
    NoResponse(#[source] reqwest::Error),

    #[error("Failed to call LLM API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    MalformedResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    /// A plain string or an array of `{ "text": ... }` fragments, depending on the vendor.
    pub content: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Normalizes the first choice's content into one trimmed string.
    pub fn text(&self) -> Result<String, LlmError> {
        let content = self
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_ref())
            .ok_or_else(|| {
                LlmError::MalformedResponse("LLM response did not include content".to_string())
            })?;
        extract_text(content)
    }
}

fn extract_text(content: &Value) -> Result<String, LlmError> {
    let text = match content {
        Value::String(s) => s.trim().to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<String>()
            .trim()
            .to_string(),
        Value::Null => String::new(),
        _ => {
            return Err(LlmError::MalformedResponse(
                "Unexpected LLM response shape".to_string(),
            ))
        }
    };

    if text.is_empty() {
        return Err(LlmError::MalformedResponse(
            "LLM response did not include content".to_string(),
        ));
    }
    Ok(text)
}

/// Thin wrapper over the OpenRouter-compatible chat completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends one system + user exchange requesting JSON output.
    /// The API key is checked before any network attempt.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.settings.site_url)
            .header("X-Title", &self.settings.app_name)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                detail: if detail.is_empty() {
                    "{}".to_string()
                } else {
                    detail
                },
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            LlmError::MalformedResponse(format!("LLM response envelope could not be decoded: {e}"))
        })?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

/// A request that never got an answer (timeout, refused connection) is
/// distinguished from other client-side failures.
fn classify_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        LlmError::NoResponse(e)
    } else {
        LlmError::Http(e)
    }
}
