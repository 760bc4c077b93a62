use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Credential string whose `Debug` and `Display` never show the value.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Source of credentials resolved at startup.
pub trait VaultProvider: Send + Sync {
    fn get_secret(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>>;
}

/// Reads credentials from process environment variables. Empty values count
/// as unset.
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>> {
        let value = std::env::var(key).ok().filter(|v| !v.is_empty());
        Box::pin(async move { Ok(value) })
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MockVaultProvider {
    secrets: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MockVaultProvider {
    #[must_use]
    pub fn with_secret(mut self, key: &str, value: &str) -> Self {
        self.secrets.insert(key.to_owned(), value.to_owned());
        self
    }
}

#[cfg(test)]
impl VaultProvider for MockVaultProvider {
    fn get_secret(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>> {
        let result = self.secrets.get(key).cloned();
        Box::pin(async move { Ok(result) })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn secret_is_redacted_in_formatting() {
        let secret = Secret::new("AIza-real-key");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose(), "AIza-real-key");
    }

    #[test]
    fn secret_deserializes_transparently() {
        let secret: Secret = serde_json::from_str("\"token\"").unwrap();
        assert_eq!(secret.expose(), "token");
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_reads_variable() {
        let key = "REDLINER_TEST_VAULT_SECRET";
        unsafe { std::env::set_var(key, "value-1") };
        let result = EnvVaultProvider.get_secret(key).await.unwrap();
        unsafe { std::env::remove_var(key) };
        assert_eq!(result.as_deref(), Some("value-1"));
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_treats_empty_as_unset() {
        let key = "REDLINER_TEST_VAULT_EMPTY";
        unsafe { std::env::set_var(key, "") };
        let result = EnvVaultProvider.get_secret(key).await.unwrap();
        unsafe { std::env::remove_var(key) };
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn mock_vault_returns_configured_secret() {
        let vault = MockVaultProvider::default().with_secret("K", "v");
        assert_eq!(vault.get_secret("K").await.unwrap().as_deref(), Some("v"));
        assert!(vault.get_secret("missing").await.unwrap().is_none());
    }
}
