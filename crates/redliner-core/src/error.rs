use redliner_document::DocumentError;
use redliner_llm::LlmError;
use redliner_publish::PublishError;

/// Failure of a whole review request.
///
/// Per-chunk model failures never surface here; they fall back to the
/// original chunk text inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("document extraction failed: {0}")]
    Extraction(#[from] DocumentError),

    #[error("language model request failed: {0}")]
    UpstreamModel(#[from] LlmError),

    #[error("language model returned an empty response")]
    EmptyModelResponse,

    #[error("publishing failed: {0}")]
    Publish(#[from] PublishError),

    #[error("revision orchestration failed: {0}")]
    Orchestration(String),
}
