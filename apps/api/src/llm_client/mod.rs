/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions MUST go through the `ChatModel` trait.
///
/// Model: gpt-3.5-turbo (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
pub mod testutil;

const COMPLETIONS_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all LLM calls. Intentionally hardcoded.
pub const MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Seam over the completion API so hooks and services can run against a
/// scripted model in tests. Carried in `AppState` as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends a system + user message pair and returns the raw completion text.
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP implementation of `ChatModel` against the chat-completions API.
///
/// There is deliberately no retry loop: every failure is terminal for the
/// single call, and each caller owns its own failure policy (hard error for
/// checklists, fail-open default for risk classification).
#[derive(Clone)]
pub struct HttpChatModel {
    client: Client,
    api_key: String,
}

impl HttpChatModel {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl ChatModel for HttpChatModel {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request_body = CompletionRequest {
            model: MODEL,
            temperature,
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
        };

        let response = self
            .client
            .post(COMPLETIONS_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse a structured error message
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyContent)?;

        debug!("LLM call succeeded ({} chars)", text.len());

        Ok(text)
    }
}

/// Parses a completion as JSON, tolerating markdown code fences.
/// Fenced and unfenced payloads with the same JSON parse identically.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[{\"description\": \"Set up laptop\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"description\": \"Set up laptop\"}]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n[{\"description\": \"Set up laptop\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"description\": \"Set up laptop\"}]");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "[{\"description\": \"Set up laptop\"}]";
        assert_eq!(strip_json_fences(input), "[{\"description\": \"Set up laptop\"}]");
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Item {
            description: String,
        }

        let bare = r#"[{"description": "Request ID badge"}]"#;
        let fenced = format!("```json\n{bare}\n```");

        let a: Vec<Item> = parse_json_reply(bare).unwrap();
        let b: Vec<Item> = parse_json_reply(&fenced).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = parse_json_reply::<Vec<String>>("not json at all").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
