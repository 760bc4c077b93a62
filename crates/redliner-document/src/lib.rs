//! Text extraction from uploaded documents and paragraph chunking.

pub mod error;
pub mod loader;
pub mod splitter;
pub mod types;

use std::path::Path;

pub use error::DocumentError;
pub use loader::TextLoader;
pub use splitter::{PARAGRAPH_SEPARATOR, join_paragraphs, split_paragraphs};
pub use types::{Chunk, Document, DocumentMetadata};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum upload size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    /// Extract the text of an uploaded payload.
    ///
    /// `source` names the upload in logs and errors (usually the file name).
    fn load(
        &self,
        bytes: Vec<u8>,
        source: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>;

    fn content_type(&self) -> &'static str;
}

/// Pick the loader for a MIME type. Parameters such as `; charset=utf-8` are ignored.
///
/// # Errors
///
/// Returns `DocumentError::UnsupportedFormat` for anything but PDF and plain text.
pub fn loader_for(
    content_type: &str,
    max_file_size: u64,
) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "text/plain" => Ok(Box::new(TextLoader { max_file_size })),
        #[cfg(feature = "pdf")]
        "application/pdf" => Ok(Box::new(PdfLoader { max_file_size })),
        _ => Err(DocumentError::UnsupportedFormat(content_type.to_owned())),
    }
}

/// Guess the upload content type of a local file from its extension.
#[must_use]
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" | "text" | "md" => Some("text/plain"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_with_charset_is_supported() {
        let loader = loader_for("text/plain; charset=utf-8", DEFAULT_MAX_FILE_SIZE).unwrap();
        assert_eq!(loader.content_type(), "text/plain");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_is_supported() {
        let loader = loader_for("application/pdf", DEFAULT_MAX_FILE_SIZE).unwrap();
        assert_eq!(loader.content_type(), "application/pdf");
    }

    #[test]
    fn other_types_are_rejected() {
        let err = loader_for("image/png", DEFAULT_MAX_FILE_SIZE)
            .err()
            .unwrap();
        assert!(matches!(err, DocumentError::UnsupportedFormat(ref t) if t == "image/png"));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(
            content_type_for_path(Path::new("a/lease.PDF")),
            Some("application/pdf")
        );
        assert_eq!(
            content_type_for_path(Path::new("notes.txt")),
            Some("text/plain")
        );
        assert_eq!(content_type_for_path(Path::new("photo.jpg")), None);
        assert_eq!(content_type_for_path(Path::new("README")), None);
    }
}
