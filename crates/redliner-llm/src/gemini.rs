use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_output_tokens: u32,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_owned(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(&self, messages: &[Message]) -> reqwest::RequestBuilder {
        let (system, contents) = split_messages(messages);
        let body = RequestBody {
            contents,
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
            },
        };

        self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
    }

    async fn send_request(&self, messages: &[Message]) -> Result<String, LlmError> {
        let response = self.build_request(messages).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(model = %self.model, "Gemini rate limited");
            return Err(LlmError::RateLimited { provider: "gemini" });
        }

        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Gemini API error {status}: {text}");
            return Err(LlmError::Api {
                provider: "gemini",
                status: status.as_u16(),
            });
        }

        let resp: ApiResponse = serde_json::from_str(&text)?;
        if let Some(ref usage) = resp.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini API usage"
            );
        }
        Ok(response_text(resp))
    }
}

impl LlmProvider for GeminiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.send_request(messages).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Concatenate the text parts of the first candidate.
///
/// A blocked prompt or a candidate without text yields an empty string.
fn response_text(resp: ApiResponse) -> String {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        tracing::warn!(reason = %reason, "Gemini blocked the prompt");
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return String::new();
    };
    if let Some(ref reason) = candidate.finish_reason
        && reason != "STOP"
    {
        tracing::debug!(reason = %reason, "Gemini candidate finished early");
    }

    candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default()
}

fn split_messages(messages: &[Message]) -> (Option<&str>, Vec<Content<'_>>) {
    let mut system = None;
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            // Gemini accepts a single system instruction; the last one wins.
            Role::System => system = Some(msg.content.as_str()),
            Role::User => contents.push(Content {
                role: Some("user"),
                parts: vec![Part { text: &msg.content }],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model"),
                parts: vec![Part { text: &msg.content }],
            }),
        }
    }

    (system, contents)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new("test-key".into(), "gemini-1.5-pro".into()).with_base_url(server.uri())
    }

    #[test]
    fn debug_redacts_api_key() {
        let p = GeminiProvider::new("super-secret".into(), "gemini-1.5-pro".into());
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn endpoint_includes_model() {
        let p = GeminiProvider::new("k".into(), "gemini-1.5-pro".into())
            .with_base_url("http://localhost:9999/");
        assert_eq!(
            p.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn split_messages_maps_roles() {
        let messages = vec![
            Message::system("rules"),
            Message::user("hi"),
            Message {
                role: Role::Assistant,
                content: "hello".into(),
            },
        ];
        let (system, contents) = split_messages(&messages);
        assert_eq!(system, Some("rules"));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, Some("user"));
        assert_eq!(contents[1].role, Some("model"));
    }

    #[test]
    fn response_text_joins_parts() {
        let resp: ApiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello, "}, {"text": "world"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response_text(resp), "Hello, world");
    }

    #[test]
    fn response_text_without_candidates_is_empty() {
        let resp: ApiResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert_eq!(response_text(resp), "");
    }

    #[tokio::test]
    async fn chat_sends_api_key_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Review this"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Revised"}]}}],
                "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1}
            })))
            .mount(&server)
            .await;

        let out = provider(&server)
            .chat(&[Message::user("Review this")])
            .await
            .unwrap();
        assert_eq!(out, "Revised");
    }

    #[tokio::test]
    async fn chat_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider(&server)
            .chat(&[Message::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { provider: "gemini" }));
    }

    #[tokio::test]
    async fn chat_maps_server_error_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .chat(&[Message::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn chat_invalid_json_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .chat(&[Message::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Json(_)));
    }
}
