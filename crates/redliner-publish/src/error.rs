use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed (status {status}): {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Google credentials: {0}")]
    Credentials(String),

    #[error("create document response has no documentId")]
    MissingDocumentId,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot build a file URL for {0}")]
    InvalidPath(PathBuf),
}
