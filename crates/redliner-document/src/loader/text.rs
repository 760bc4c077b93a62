use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader, DocumentMetadata,
};

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(
        &self,
        bytes: Vec<u8>,
        source: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>
    {
        let source = source.to_owned();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let len = bytes.len() as u64;
            if len > max_size {
                return Err(DocumentError::FileTooLarge(len));
            }

            let content = String::from_utf8(bytes)?;
            tracing::debug!(source = %source, chars = content.chars().count(), "loaded text upload");

            Document::new(
                content,
                DocumentMetadata {
                    source,
                    content_type: self.content_type().to_owned(),
                },
            )
        })
    }

    fn content_type(&self) -> &'static str {
        "text/plain"
    }
}
