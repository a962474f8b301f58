pub mod prompt;
pub mod providers;

use std::sync::Arc;

use commitflow_core::config::ProviderConfig;
use commitflow_core::error::{FlowError, Result};
use commitflow_core::traits::MessageProvider;

pub use providers::anthropic::AnthropicProvider;
pub use providers::openai::OpenAiProvider;

/// Credential probe order: first name whose environment variable is set
/// selects the provider.
const CREDENTIAL_SOURCES: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai"),
    ("ANTHROPIC_API_KEY", "anthropic"),
];

/// Create a message provider from config. A pinned `provider.name` wins;
/// otherwise the fixed credential list is probed in order and the first
/// present key decides. No usable credential is a config error, raised
/// before any workflow node runs.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn MessageProvider>> {
    let (name, api_key) = match &config.name {
        Some(name) => {
            let env_var = CREDENTIAL_SOURCES
                .iter()
                .find(|(_, n)| n == name)
                .map(|(var, _)| *var)
                .ok_or_else(|| FlowError::Config(format!("unknown provider: {name}")))?;
            let key = config
                .api_key
                .clone()
                .or_else(|| std::env::var(env_var).ok())
                .ok_or_else(|| {
                    FlowError::Config(format!("provider {name} pinned but {env_var} is not set"))
                })?;
            (name.as_str(), key)
        }
        None => probe(|var| std::env::var(var).ok()).ok_or_else(|| {
            FlowError::Config(
                "no provider credentials found (set OPENAI_API_KEY or ANTHROPIC_API_KEY)"
                    .to_string(),
            )
        })?,
    };

    match name {
        "openai" => Ok(Arc::new(OpenAiProvider::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
        ))),
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
        ))),
        other => Err(FlowError::Config(format!("unknown provider: {other}"))),
    }
}

/// Walk the fixed credential list in order; first present key wins.
fn probe<F>(lookup: F) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    CREDENTIAL_SOURCES
        .iter()
        .find_map(|(var, name)| lookup(var).map(|key| (*name, key)))
}
