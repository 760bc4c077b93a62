use std::io::Write;
use std::path::PathBuf;

use serial_test::serial;

use super::*;
use crate::vault::MockVaultProvider;

const ENV_KEYS: [&str; 12] = [
    "REDLINER_LLM_PROVIDER",
    "REDLINER_LLM_MODEL",
    "REDLINER_LLM_BASE_URL",
    "REDLINER_REVISION_THRESHOLD",
    "REDLINER_REVISION_MAX_CONCURRENCY",
    "REDLINER_GATEWAY_BIND",
    "REDLINER_GATEWAY_PORT",
    "REDLINER_PUBLISH_BACKEND",
    "REDLINER_PUBLISH_OUTPUT_DIR",
    "REDLINER_TIMEOUT_LLM",
    "REDLINER_TIMEOUT_PUBLISH",
    "REDLINER_GOOGLE_SERVICE_ACCOUNT_FILE",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn defaults_when_file_missing() {
    let config = Config::default();
    assert_eq!(config.llm.provider, ProviderKind::Gemini);
    assert_eq!(config.llm.model, "gemini-1.5-pro");
    assert!(config.llm.base_url.is_none());
    assert_eq!(config.revision.single_call_threshold, 2000);
    assert_eq!(config.revision.max_concurrency, 4);
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert_eq!(config.gateway.port, 8000);
    assert_eq!(config.publish.backend, PublishBackend::GoogleDocs);
    assert_eq!(config.timeouts.llm_secs, 120);
    assert_eq!(config.timeouts.publish_secs, 60);
    assert!(config.publish.service_account_file.is_none());
    assert_eq!(
        config.document.max_file_size,
        redliner_document::DEFAULT_MAX_FILE_SIZE
    );
}

#[test]
#[serial]
fn load_missing_file_uses_defaults() {
    clear_env();
    let config = Config::load(&PathBuf::from("/nonexistent/redliner.toml")).unwrap();
    assert_eq!(config.revision.max_concurrency, 4);
}

#[test]
#[serial]
fn load_partial_file_fills_defaults() {
    clear_env();
    let file = write_config(
        r#"
[llm]
provider = "claude"
model = "claude-sonnet-4-5"

[revision]
max_concurrency = 2

[publish]
backend = "local"
output_dir = "/tmp/redliner"
"#,
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.llm.provider, ProviderKind::Claude);
    assert_eq!(config.llm.model, "claude-sonnet-4-5");
    assert_eq!(config.llm.max_tokens, 8192);
    assert_eq!(config.revision.max_concurrency, 2);
    assert_eq!(config.revision.single_call_threshold, 2000);
    assert_eq!(config.publish.backend, PublishBackend::Local);
    assert_eq!(config.publish.output_dir, PathBuf::from("/tmp/redliner"));
    assert_eq!(config.gateway.port, 8000);
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    clear_env();
    let file = write_config("[revision\nmax_concurrency = ");
    assert!(Config::load(file.path()).is_err());
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let file = write_config("[gateway]\nport = 9000\n");
    unsafe {
        std::env::set_var("REDLINER_GATEWAY_PORT", "9100");
        std::env::set_var("REDLINER_LLM_PROVIDER", "claude");
        std::env::set_var("REDLINER_LLM_BASE_URL", "http://127.0.0.1:1234");
        std::env::set_var("REDLINER_REVISION_THRESHOLD", "500");
        std::env::set_var("REDLINER_PUBLISH_BACKEND", "local");
        std::env::set_var("REDLINER_TIMEOUT_LLM", "15");
    }
    let config = Config::load(file.path()).unwrap();
    clear_env();

    assert_eq!(config.gateway.port, 9100);
    assert_eq!(config.llm.provider, ProviderKind::Claude);
    assert_eq!(config.llm.base_url.as_deref(), Some("http://127.0.0.1:1234"));
    assert_eq!(config.revision.single_call_threshold, 500);
    assert_eq!(config.publish.backend, PublishBackend::Local);
    assert_eq!(config.timeouts.llm_secs, 15);
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("REDLINER_LLM_PROVIDER", "ollama");
        std::env::set_var("REDLINER_GATEWAY_PORT", "not-a-port");
        std::env::set_var("REDLINER_PUBLISH_BACKEND", "dropbox");
    }
    let config = Config::load(&PathBuf::from("/nonexistent/redliner.toml")).unwrap();
    clear_env();

    assert_eq!(config.llm.provider, ProviderKind::Gemini);
    assert_eq!(config.gateway.port, 8000);
    assert_eq!(config.publish.backend, PublishBackend::GoogleDocs);
}

#[test]
#[serial]
fn zero_concurrency_is_rejected() {
    clear_env();
    unsafe { std::env::set_var("REDLINER_REVISION_MAX_CONCURRENCY", "0") };
    let err = Config::load(&PathBuf::from("/nonexistent/redliner.toml")).unwrap_err();
    clear_env();
    assert!(err.to_string().contains("max_concurrency"));
}

#[test]
#[serial]
fn publish_settings_from_file_and_env() {
    clear_env();
    let file = write_config(
        "[publish]\nservice_account_file = \"/etc/redliner/sa.json\"\n\n[timeouts]\npublish_secs = 20\n",
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(
        config.publish.service_account_file.as_deref(),
        Some(std::path::Path::new("/etc/redliner/sa.json"))
    );
    assert_eq!(config.timeouts.publish_secs, 20);

    unsafe {
        std::env::set_var("REDLINER_TIMEOUT_PUBLISH", "5");
        std::env::set_var("REDLINER_GOOGLE_SERVICE_ACCOUNT_FILE", "/run/secrets/sa.json");
    }
    let config = Config::load(file.path()).unwrap();
    clear_env();
    assert_eq!(config.timeouts.publish_secs, 5);
    assert_eq!(
        config.publish.service_account_file,
        Some(PathBuf::from("/run/secrets/sa.json"))
    );
}

#[test]
fn zero_publish_timeout_is_rejected() {
    let mut config = Config::default();
    config.timeouts.publish_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("publish_secs"));
}

#[test]
fn zero_threshold_is_rejected() {
    let mut config = Config::default();
    config.revision.single_call_threshold = 0;
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn resolve_secrets_fills_all_keys() {
    let vault = MockVaultProvider::default()
        .with_secret("REDLINER_GEMINI_API_KEY", "gem")
        .with_secret("REDLINER_CLAUDE_API_KEY", "cla")
        .with_secret("REDLINER_GOOGLE_ACCESS_TOKEN", "ya29")
        .with_secret("REDLINER_GATEWAY_TOKEN", "gw");
    let mut config = Config::default();
    config.resolve_secrets(&vault).await.unwrap();

    assert_eq!(config.secrets.gemini_api_key.as_ref().unwrap().expose(), "gem");
    assert_eq!(config.secrets.claude_api_key.as_ref().unwrap().expose(), "cla");
    assert_eq!(
        config.secrets.google_access_token.as_ref().unwrap().expose(),
        "ya29"
    );
    assert_eq!(config.secrets.gateway_token.as_ref().unwrap().expose(), "gw");
}

#[tokio::test]
async fn llm_api_key_follows_provider() {
    let vault = MockVaultProvider::default().with_secret("REDLINER_CLAUDE_API_KEY", "cla");
    let mut config = Config::default();
    config.resolve_secrets(&vault).await.unwrap();

    let err = config.llm_api_key().unwrap_err();
    assert!(err.to_string().contains("REDLINER_GEMINI_API_KEY"));

    config.llm.provider = ProviderKind::Claude;
    assert_eq!(config.llm_api_key().unwrap().expose(), "cla");
}

#[test]
fn secrets_do_not_leak_through_debug() {
    let mut config = Config::default();
    config.secrets.gemini_api_key = Some(crate::vault::Secret::new("AIza-super-secret"));
    assert!(!format!("{config:?}").contains("AIza-super-secret"));
}
