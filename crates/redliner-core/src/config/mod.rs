mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{Secret, VaultProvider};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting values are invalid.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error for a zero revision threshold, concurrency limit or timeout.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.revision.single_call_threshold == 0 {
            bail!("revision.single_call_threshold must be greater than zero");
        }
        if self.revision.max_concurrency == 0 {
            bail!("revision.max_concurrency must be greater than zero");
        }
        if self.timeouts.llm_secs == 0 {
            bail!("timeouts.llm_secs must be greater than zero");
        }
        if self.timeouts.publish_secs == 0 {
            bail!("timeouts.publish_secs must be greater than zero");
        }
        Ok(())
    }

    /// Resolve credentials through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        if let Some(val) = vault.get_secret("REDLINER_GEMINI_API_KEY").await? {
            self.secrets.gemini_api_key = Some(Secret::new(val));
        }
        if let Some(val) = vault.get_secret("REDLINER_CLAUDE_API_KEY").await? {
            self.secrets.claude_api_key = Some(Secret::new(val));
        }
        if let Some(val) = vault.get_secret("REDLINER_GOOGLE_ACCESS_TOKEN").await? {
            self.secrets.google_access_token = Some(Secret::new(val));
        }
        if let Some(val) = vault.get_secret("REDLINER_GATEWAY_TOKEN").await? {
            self.secrets.gateway_token = Some(Secret::new(val));
        }
        Ok(())
    }

    /// API key for the configured LLM provider.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing environment variable.
    pub fn llm_api_key(&self) -> anyhow::Result<&Secret> {
        let (key, var) = match self.llm.provider {
            ProviderKind::Gemini => (&self.secrets.gemini_api_key, "REDLINER_GEMINI_API_KEY"),
            ProviderKind::Claude => (&self.secrets.claude_api_key, "REDLINER_CLAUDE_API_KEY"),
        };
        key.as_ref()
            .with_context(|| format!("{var} is not set (required by the {} provider)", self.llm.provider))
    }
}
