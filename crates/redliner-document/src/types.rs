use super::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
}

/// Extracted document text. Never empty or whitespace-only.
#[derive(Debug, Clone)]
pub struct Document {
    content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// # Errors
    ///
    /// Returns `DocumentError::NoText` if `content` has no non-whitespace characters.
    pub fn new(content: String, metadata: DocumentMetadata) -> Result<Self, DocumentError> {
        if content.trim().is_empty() {
            return Err(DocumentError::NoText(metadata.source));
        }
        Ok(Self { content, metadata })
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }
}

/// A paragraph-aligned slice of a document, tagged with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}
