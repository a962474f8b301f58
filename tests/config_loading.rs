use std::io::Write;
use std::path::Path;

use commitflow_core::AppConfig;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[workflow]
repo = "/srv/checkouts/widget"

[provider]
name = "openai"
model = "gpt-4o-mini"
api_key = "sk-test-key"
base_url = "http://localhost:11434/v1/chat/completions"

[discovery]
enabled = true
root = "/srv/checkouts"
exclude = ["node_modules", "target"]
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(
        config.workflow.repo.as_deref(),
        Some(Path::new("/srv/checkouts/widget"))
    );
    assert_eq!(config.provider.name.as_deref(), Some("openai"));
    assert_eq!(config.provider.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test-key"));
    assert!(config.discovery.enabled);
    assert_eq!(
        config.discovery.root.as_deref(),
        Some(Path::new("/srv/checkouts"))
    );
    assert_eq!(config.discovery.exclude, vec!["node_modules", "target"]);
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("COMMITFLOW_TEST_API_KEY", "expanded-key-value");

    let toml_content = r#"
[provider]
api_key = "${COMMITFLOW_TEST_API_KEY}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(
        config.provider.api_key.as_deref(),
        Some("expanded-key-value")
    );

    std::env::remove_var("COMMITFLOW_TEST_API_KEY");
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = AppConfig::load_or_default(Path::new("/nonexistent/commitflow.toml"))
        .expect("defaults");
    assert!(config.workflow.repo.is_none());
    assert!(config.provider.name.is_none());
    assert!(!config.discovery.enabled);
}

#[test]
fn test_load_missing_file_is_an_error() {
    let err = AppConfig::load(Path::new("/nonexistent/commitflow.toml")).unwrap_err();
    assert!(err.to_string().contains("config file not found"));
}
