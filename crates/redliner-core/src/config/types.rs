use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::{DEFAULT_MAX_CONCURRENCY, DEFAULT_SINGLE_CALL_THRESHOLD};
use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub revision: RevisionConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

/// LLM provider backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Claude,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Claude => "claude",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_model() -> String {
    "gemini-1.5-pro".into()
}

fn default_max_tokens() -> u32 {
    8192
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the provider's public API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            base_url: None,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_single_call_threshold() -> usize {
    DEFAULT_SINGLE_CALL_THRESHOLD
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RevisionConfig {
    /// Texts with fewer characters than this are revised in one call.
    #[serde(default = "default_single_call_threshold")]
    pub single_call_threshold: usize,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            single_call_threshold: default_single_call_threshold(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_rate_limit() -> u32 {
    30
}

fn default_max_body_size() -> usize {
    // 50 MiB upload plus multipart framing
    50 * 1024 * 1024 + 64 * 1024
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Requests per minute per client IP. Zero disables the limit.
    #[serde(default = "default_gateway_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            rate_limit: default_gateway_rate_limit(),
            max_body_size: default_max_body_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishBackend {
    #[default]
    GoogleDocs,
    Local,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("redliner-output")
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub backend: PublishBackend,
    /// Directory used by the local backend.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Service account JSON key for the Google Docs backend. When unset, a
    /// pre-issued `REDLINER_GOOGLE_ACCESS_TOKEN` is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_file: Option<PathBuf>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            backend: PublishBackend::default(),
            output_dir: default_output_dir(),
            service_account_file: None,
        }
    }
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_publish_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TimeoutConfig {
    /// Per-request transport timeout for model calls, in seconds.
    #[serde(default = "default_llm_timeout")]
    pub llm_secs: u64,
    /// Per-request transport timeout for Google Docs, Drive and token calls.
    #[serde(default = "default_publish_timeout")]
    pub publish_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_secs: default_llm_timeout(),
            publish_secs: default_publish_timeout(),
        }
    }
}

fn default_max_file_size() -> u64 {
    redliner_document::DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub gemini_api_key: Option<Secret>,
    pub claude_api_key: Option<Secret>,
    pub google_access_token: Option<Secret>,
    pub gateway_token: Option<Secret>,
}
