use super::Config;

fn parse_enum<T: serde::de::DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(value.to_owned())).ok()
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("REDLINER_LLM_PROVIDER") {
            if let Some(kind) = parse_enum(&v) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid REDLINER_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("REDLINER_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("REDLINER_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("REDLINER_REVISION_THRESHOLD")
            && let Ok(chars) = v.parse::<usize>()
        {
            self.revision.single_call_threshold = chars;
        }
        if let Ok(v) = std::env::var("REDLINER_REVISION_MAX_CONCURRENCY")
            && let Ok(n) = v.parse::<usize>()
        {
            self.revision.max_concurrency = n;
        }
        if let Ok(v) = std::env::var("REDLINER_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("REDLINER_GATEWAY_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("REDLINER_PUBLISH_BACKEND") {
            if let Some(backend) = parse_enum(&v) {
                self.publish.backend = backend;
            } else {
                tracing::warn!("ignoring invalid REDLINER_PUBLISH_BACKEND value: {v}");
            }
        }
        if let Ok(v) = std::env::var("REDLINER_PUBLISH_OUTPUT_DIR") {
            self.publish.output_dir = v.into();
        }
        if let Ok(v) = std::env::var("REDLINER_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_secs = secs;
        }
        if let Ok(v) = std::env::var("REDLINER_TIMEOUT_PUBLISH")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.publish_secs = secs;
        }
        if let Ok(v) = std::env::var("REDLINER_GOOGLE_SERVICE_ACCOUNT_FILE") {
            self.publish.service_account_file = Some(v.into());
        }
    }
}
