use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use redliner_core::{ReviewError, ReviewReport, Upload};
use redliner_document::{DocumentError, content_type_for_path};

use super::server::AppState;

pub(crate) const UNSUPPORTED_TYPE_DETAIL: &str = "Unsupported file type. Use PDF or TXT.";
const SUPPORTED_TYPES: [&str; 2] = ["application/pdf", "text/plain"];

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error response rendered as `{"detail": ...}`.
pub(crate) struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        let status = match &err {
            ReviewError::Extraction(_) => StatusCode::BAD_REQUEST,
            ReviewError::UpstreamModel(_)
            | ReviewError::EmptyModelResponse
            | ReviewError::Publish(_) => StatusCode::BAD_GATEWAY,
            ReviewError::Orchestration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(status = status.as_u16(), "review failed: {err}");

        if matches!(err, ReviewError::Extraction(DocumentError::UnsupportedFormat(_))) {
            return Self::new(status, UNSUPPORTED_TYPE_DETAIL);
        }
        Self::new(status, err.to_string())
    }
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Pull the `file` field out of a multipart body.
///
/// A missing or generic part content type is inferred from the file name.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_owned();
        let declared = field.content_type().map(essence);
        let content_type = match declared.as_deref() {
            Some(ct) if SUPPORTED_TYPES.contains(&ct) => ct.to_owned(),
            None | Some("application/octet-stream") => content_type_for_path(Path::new(&filename))
                .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, UNSUPPORTED_TYPE_DETAIL))?
                .to_owned(),
            Some(_) => {
                return Err(ApiError::new(StatusCode::BAD_REQUEST, UNSUPPORTED_TYPE_DETAIL));
            }
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        return Ok(Upload {
            bytes: bytes.to_vec(),
            content_type,
            filename,
        });
    }
    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        "multipart field 'file' is required",
    ))
}

pub(crate) async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReviewReport>, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let report = state.analyzer.analyze(upload).await?;
    Ok(Json(report))
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
