use serde::{Deserialize, Serialize};

/// A frame sent to the front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputFrame {
    InputRequest {
        key: String,
        prompt: String,
        options: Vec<String>,
    },
    Status {
        #[serde(skip_serializing_if = "Option::is_none")]
        node: Option<String>,
        message: String,
    },
    Error {
        message: String,
    },
}

impl OutputFrame {
    pub fn input_request(key: &str, prompt: &str, options: Vec<String>) -> Self {
        Self::InputRequest {
            key: key.to_string(),
            prompt: prompt.to_string(),
            options,
        }
    }

    /// Per-node lifecycle banner.
    pub fn node_status(node: &str, message: &str) -> Self {
        Self::Status {
            node: Some(node.to_string()),
            message: message.to_string(),
        }
    }

    /// Run-level status (completion banner).
    pub fn status(message: &str) -> Self {
        Self::Status {
            node: None,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}

/// The one line the front-end writes back per input request. A missing
/// `value` field reads as an empty selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputResponse {
    #[serde(default)]
    pub value: Vec<String>,
}
