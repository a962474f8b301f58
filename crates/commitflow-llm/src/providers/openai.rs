use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use commitflow_core::error::{FlowError, Result};
use commitflow_core::traits::MessageProvider;

use crate::prompt;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible provider. Works with OpenAI and any chat-completions
/// endpoint (Ollama, vLLM, Groq, OpenRouter) via `base_url`.
pub struct OpenAiProvider {
    http: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            url: base_url.unwrap_or_else(|| OPENAI_API_URL.to_string()),
        }
    }
}

// Request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

// Response types
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl MessageProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn generate(&self, diff: String) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: vec![ChatMessage {
                    role: "user".to_string(),
                    content: prompt::build_prompt(&diff),
                }],
                max_tokens: 256,
                temperature: 0.2,
            };

            debug!(model = %self.model, "requesting commit message");
            let response = self
                .http
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| FlowError::Provider {
                    provider: "openai".to_string(),
                    message: e.to_string(),
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(FlowError::Provider {
                    provider: "openai".to_string(),
                    message: format!("HTTP {status}: {body}"),
                });
            }

            let parsed: ChatResponse =
                response.json().await.map_err(|e| FlowError::Provider {
                    provider: "openai".to_string(),
                    message: format!("invalid response body: {e}"),
                })?;

            let content = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| FlowError::Provider {
                    provider: "openai".to_string(),
                    message: "response contains no choices".to_string(),
                })?;

            prompt::parse_message("openai", &content)
        })
    }
}
