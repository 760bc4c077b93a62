//! Google API credentials: a fixed OAuth access token or a service account
//! whose signed JWT assertion is exchanged for short-lived access tokens.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::PublishError;
use crate::google::check;

pub const SCOPES: &str =
    "https://www.googleapis.com/auth/documents https://www.googleapis.com/auth/drive";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

/// The fields of a service account JSON key file that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// # Errors
    ///
    /// Returns `PublishError::Credentials` if the JSON is not a service account key.
    pub fn from_json(json: &str) -> Result<Self, PublishError> {
        serde_json::from_str(json)
            .map_err(|e| PublishError::Credentials(format!("invalid service account key: {e}")))
    }

    /// # Errors
    ///
    /// Returns `PublishError::Io` if the file cannot be read and
    /// `PublishError::Credentials` if it is not a service account key.
    pub fn from_file(path: &Path) -> Result<Self, PublishError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn assertion(&self, now: u64) -> Result<String, PublishError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| PublishError::Credentials(format!("invalid private key: {e}")))?;
        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| PublishError::Credentials(format!("failed to sign assertion: {e}")))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Source of the bearer token sent with every Docs and Drive call.
pub struct GoogleAuth {
    source: Source,
}

enum Source {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl std::fmt::Debug for GoogleAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Static(_) => f.write_str("GoogleAuth::Static([REDACTED])"),
            Source::ServiceAccount { key, .. } => f
                .debug_struct("GoogleAuth::ServiceAccount")
                .field("client_email", &key.client_email)
                .finish_non_exhaustive(),
        }
    }
}

impl GoogleAuth {
    /// A pre-issued OAuth access token, used until it expires.
    #[must_use]
    pub fn access_token_only(token: String) -> Self {
        Self {
            source: Source::Static(token),
        }
    }

    #[must_use]
    pub fn service_account(key: ServiceAccountKey) -> Self {
        Self {
            source: Source::ServiceAccount {
                key,
                cached: Mutex::new(None),
            },
        }
    }

    #[must_use]
    pub fn is_service_account(&self) -> bool {
        matches!(self.source, Source::ServiceAccount { .. })
    }

    /// Current access token, exchanging a fresh assertion when the cached one
    /// is missing or about to expire.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if signing or the token exchange fails.
    pub async fn access_token(&self, client: &reqwest::Client) -> Result<String, PublishError> {
        let (key, cached) = match &self.source {
            Source::Static(token) => return Ok(token.clone()),
            Source::ServiceAccount { key, cached } => (key, cached),
        };

        let mut cached = cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let fresh = exchange(client, key).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

async fn exchange(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
) -> Result<CachedToken, PublishError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let assertion = key.assertion(now)?;
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", JWT_BEARER_GRANT)
        .append_pair("assertion", &assertion)
        .finish();

    let resp = client
        .post(&key.token_uri)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body)
        .send()
        .await?;
    let token: TokenResponse = check("oauth2.token", resp).await?.json().await?;

    let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
    tracing::info!(
        account = %key.client_email,
        expires_in = token.expires_in,
        "obtained Google access token"
    );
    Ok(CachedToken {
        value: token.access_token,
        refresh_at: Instant::now() + lifetime,
    })
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TEST_PEM: &str = include_str!("../testdata/service_account_key.pem");

    fn test_key(token_uri: &str) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "redliner@example.iam.gserviceaccount.com".into(),
            private_key: TEST_PEM.into(),
            private_key_id: Some("key-1".into()),
            token_uri: token_uri.into(),
        }
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    #[test]
    fn key_file_fields_are_parsed() {
        let key = ServiceAccountKey::from_json(
            r#"{"type":"service_account","client_email":"a@b.iam.gserviceaccount.com","private_key":"pem","private_key_id":"k1"}"#,
        )
        .unwrap();
        assert_eq!(key.client_email, "a@b.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(key.private_key_id.as_deref(), Some("k1"));
    }

    #[test]
    fn malformed_key_file_is_a_credentials_error() {
        let err = ServiceAccountKey::from_json(r#"{"client_email":"x"}"#).unwrap_err();
        assert!(matches!(err, PublishError::Credentials(_)));
    }

    #[test]
    fn debug_redacts_private_key() {
        let dbg = format!("{:?}", test_key(DEFAULT_TOKEN_URI));
        assert!(!dbg.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn assertion_carries_rs256_header_and_claims() {
        let jwt = test_key("https://oauth2.example/token")
            .assertion(1_700_000_000)
            .unwrap();
        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header = decode_segment(parts[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["kid"], "key-1");

        let claims = decode_segment(parts[1]);
        assert_eq!(claims["iss"], "redliner@example.iam.gserviceaccount.com");
        assert_eq!(claims["aud"], "https://oauth2.example/token");
        assert_eq!(claims["scope"], SCOPES);
        assert_eq!(claims["iat"], 1_700_000_000);
        assert_eq!(claims["exp"], 1_700_003_600);
    }

    #[test]
    fn bad_private_key_is_rejected() {
        let mut key = test_key(DEFAULT_TOKEN_URI);
        key.private_key = "not a pem".into();
        assert!(matches!(
            key.assertion(0),
            Err(PublishError::Credentials(_))
        ));
    }

    #[tokio::test]
    async fn static_token_is_returned_as_is() {
        let auth = GoogleAuth::access_token_only("ya29.fixed".into());
        let token = auth.access_token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "ya29.fixed");
    }

    #[tokio::test]
    async fn service_account_token_is_exchanged_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion=ey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = GoogleAuth::service_account(test_key(&format!("{}/token", server.uri())));
        let client = reqwest::Client::new();
        assert_eq!(auth.access_token(&client).await.unwrap(), "ya29.fresh");
        assert_eq!(auth.access_token(&client).await.unwrap(), "ya29.fresh");
    }

    #[tokio::test]
    async fn token_about_to_expire_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.short",
                "expires_in": 30
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = GoogleAuth::service_account(test_key(&format!("{}/token", server.uri())));
        let client = reqwest::Client::new();
        auth.access_token(&client).await.unwrap();
        auth.access_token(&client).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_assertion_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let auth = GoogleAuth::service_account(test_key(&format!("{}/token", server.uri())));
        let err = auth
            .access_token(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PublishError::Api {
                operation: "oauth2.token",
                status: 400,
                ..
            }
        ));
    }
}
