use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FlowError, Result};

/// Top-level commitflow configuration, loaded from `commitflow.toml`.
/// Every section is optional; a missing file yields defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Repository to operate on. Defaults to the current directory.
    #[serde(default)]
    pub repo: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Pin a provider by name ("openai", "anthropic"). When unset the
    /// provider is selected by probing credentials in a fixed order.
    #[serde(default)]
    pub name: Option<String>,
    /// Model id; each provider has its own default.
    #[serde(default)]
    pub model: Option<String>,
    /// Raw key or `${ENV_VAR}` reference.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override the provider endpoint (Ollama, vLLM, proxies).
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Optional repository-discovery prologue: walk a root directory for git
/// repositories and let the front-end pick one before the commit workflow
/// starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Walk root; defaults to the home directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Directory names pruned from the walk.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: None,
            exclude: default_excludes(),
        }
    }
}

fn default_excludes() -> Vec<String> {
    [".cache", "node_modules", ".npm", ".venv", "Library", "Applications"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| FlowError::Config(format!("config file not found: {}", path.display())))?;
        Self::parse(&raw)
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        toml::from_str(&expand_env_vars(raw)).map_err(|e| FlowError::Config(e.to_string()))
    }

    /// Resolve the discovery walk root (config value, else $HOME).
    pub fn discovery_root(&self) -> Option<PathBuf> {
        self.discovery
            .root
            .clone()
            .or_else(|| std::env::var("HOME").ok().map(PathBuf::from))
    }
}

/// Substitute `${VAR}` references with their environment values. Unset
/// variables and unterminated references are left as written, so the
/// TOML parse error points at the offending value.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let reference = &rest[start..];
        let Some(end) = reference.find('}') else {
            out.push_str(reference);
            return out;
        };
        let name = &reference[2..end];
        match std::env::var(name) {
            Ok(value) => out.push_str(&value),
            Err(_) => {
                warn!(var = name, "config references unset environment variable");
                out.push_str(&reference[..=end]);
            }
        }
        rest = &reference[end + 1..];
    }
    out.push_str(rest);
    out
}
