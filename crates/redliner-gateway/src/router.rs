use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{ApiError, analyze_handler, health_handler};
use super::server::AppState;

const MAX_TRACKED_CLIENTS: usize = 10_000;
const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Expected bearer token, kept only as a blake3 digest.
#[derive(Clone)]
struct UploadAuth {
    expected: Option<blake3::Hash>,
}

impl UploadAuth {
    fn new(token: Option<&str>) -> Self {
        Self {
            expected: token.map(|t| blake3::hash(t.as_bytes())),
        }
    }

    /// Digests have a fixed length, so the comparison time does not depend
    /// on the presented token.
    fn admits(&self, presented: Option<&str>) -> bool {
        let Some(expected) = &self.expected else {
            return true;
        };
        let presented = blake3::hash(presented.unwrap_or_default().as_bytes());
        presented.as_bytes().ct_eq(expected.as_bytes()).into()
    }
}

/// Per-client cap on review uploads within a fixed one-minute window.
#[derive(Clone)]
struct UploadQuota {
    per_window: u32,
    windows: Arc<Mutex<HashMap<IpAddr, (u32, Instant)>>>,
}

impl UploadQuota {
    fn new(per_window: u32) -> Self {
        Self {
            per_window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one upload from `client`. Returns the time until its window
    /// resets when the quota is exhausted.
    async fn take(&self, client: IpAddr, now: Instant) -> Result<(), Duration> {
        if self.per_window == 0 {
            return Ok(());
        }
        let mut windows = self.windows.lock().await;
        if windows.len() >= MAX_TRACKED_CLIENTS && !windows.contains_key(&client) {
            windows.retain(|_, (_, started)| now.duration_since(*started) < QUOTA_WINDOW);
        }

        let (used, started) = windows.entry(client).or_insert((0, now));
        let elapsed = now.duration_since(*started);
        if elapsed >= QUOTA_WINDOW {
            *used = 1;
            *started = now;
            return Ok(());
        }
        if *used >= self.per_window {
            return Err(QUOTA_WINDOW - elapsed);
        }
        *used += 1;
        Ok(())
    }
}

pub(crate) fn build_router(
    state: AppState,
    auth_token: Option<String>,
    rate_limit: u32,
    max_body_size: usize,
) -> Router {
    // Multipart has its own 2 MB default; the tower-http limit replaces it.
    let uploads = Router::new()
        .route("/analyze", post(analyze_handler))
        .layer(middleware::from_fn_with_state(
            UploadQuota::new(rate_limit),
            upload_quota,
        ))
        .layer(middleware::from_fn_with_state(
            UploadAuth::new(auth_token.as_deref()),
            require_bearer,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .merge(uploads)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_bearer(
    State(auth): State<UploadAuth>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if !auth.admits(presented) {
        tracing::warn!(
            route = %req.uri().path(),
            token_present = presented.is_some(),
            "rejected upload without a valid bearer token"
        );
        let mut resp =
            ApiError::new(StatusCode::UNAUTHORIZED, "Missing or invalid bearer token.")
                .into_response();
        resp.headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        return resp;
    }
    next.run(req).await
}

async fn upload_quota(
    State(quota): State<UploadQuota>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ci| ci.0.ip());

    if let Err(retry_after) = quota.take(client, Instant::now()).await {
        let retry_secs = retry_after.as_secs().max(1);
        tracing::warn!(
            route = %req.uri().path(),
            %client,
            limit = quota.per_window,
            retry_secs,
            "upload quota exhausted"
        );
        let mut resp = ApiError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many documents submitted. Try again later.",
        )
        .into_response();
        resp.headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));
        return resp;
    }
    next.run(req).await
}
