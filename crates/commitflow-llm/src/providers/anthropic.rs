use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use commitflow_core::error::{FlowError, Result};
use commitflow_core::traits::MessageProvider;

use crate::prompt;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

pub struct AnthropicProvider {
    http: Client,
    api_key: String,
    model: String,
    url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            url: base_url.unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
        }
    }
}

// Anthropic API request types
#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

// Anthropic API response types
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessageProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn generate(&self, diff: String) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let request = MessagesRequest {
                model: self.model.clone(),
                max_tokens: 256,
                messages: vec![ApiMessage {
                    role: "user".to_string(),
                    content: prompt::build_prompt(&diff),
                }],
            };

            debug!(model = %self.model, "requesting commit message");
            let response = self
                .http
                .post(&self.url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request)
                .send()
                .await
                .map_err(|e| FlowError::Provider {
                    provider: "anthropic".to_string(),
                    message: e.to_string(),
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(FlowError::Provider {
                    provider: "anthropic".to_string(),
                    message: format!("HTTP {status}: {body}"),
                });
            }

            let parsed: MessagesResponse =
                response.json().await.map_err(|e| FlowError::Provider {
                    provider: "anthropic".to_string(),
                    message: format!("invalid response body: {e}"),
                })?;

            let text = parsed
                .content
                .into_iter()
                .find_map(|block| match block {
                    ContentBlock::Text { text } => Some(text),
                    ContentBlock::Other => None,
                })
                .ok_or_else(|| FlowError::Provider {
                    provider: "anthropic".to_string(),
                    message: "response contains no text block".to_string(),
                })?;

            prompt::parse_message("anthropic", &text)
        })
    }
}
