use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader, DocumentMetadata,
};

pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PdfLoader {
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

            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            let total = pages.len();
            let mut content = String::new();
            for (i, page) in pages.iter().enumerate() {
                content.push_str(page);
                tracing::debug!(page = i + 1, total, "extracted PDF page");
            }

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
        "application/pdf"
    }
}
