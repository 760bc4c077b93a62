//! Request-scoped review: extract, analyze, revise, publish.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use redliner_document::{DEFAULT_MAX_FILE_SIZE, loader_for};
use redliner_llm::LlmProvider;
use redliner_publish::DocumentPublisher;
use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::issues::IssueExtractor;
use crate::pipeline::RevisionPipeline;

/// An uploaded file awaiting review.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub summary: String,
    pub issues_doc_url: String,
    pub modified_doc_url: String,
}

/// Object-safe entry point used by the HTTP layer.
pub trait DocumentAnalyzer: Send + Sync {
    fn analyze(
        &self,
        upload: Upload,
    ) -> Pin<Box<dyn Future<Output = Result<ReviewReport, ReviewError>> + Send + '_>>;
}

pub struct ReviewService<P, D> {
    extractor: IssueExtractor<P>,
    pipeline: RevisionPipeline<P>,
    publisher: Arc<D>,
    max_file_size: u64,
}

fn progress(percent: u8, stage: &str) {
    tracing::info!(progress = percent, "{stage}");
}

impl<P, D> ReviewService<P, D>
where
    P: LlmProvider + 'static,
    D: DocumentPublisher,
{
    #[must_use]
    pub fn new(provider: Arc<P>, publisher: Arc<D>) -> Self {
        Self {
            extractor: IssueExtractor::new(Arc::clone(&provider)),
            pipeline: RevisionPipeline::new(provider),
            publisher,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Replace the default pipeline, e.g. to apply configured limits.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: RevisionPipeline<P>) -> Self {
        self.pipeline = pipeline;
        self
    }

    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Run a full review of `upload`. Any stage failure fails the review.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError` from whichever stage failed.
    pub async fn review(&self, upload: Upload) -> Result<ReviewReport, ReviewError> {
        let Upload {
            bytes,
            content_type,
            filename,
        } = upload;
        tracing::info!(file = %filename, content_type = %content_type, bytes = bytes.len(), "received upload");
        progress(0, "starting review");

        let loader = loader_for(&content_type, self.max_file_size)?;
        progress(10, "extracting text");
        let document = loader.load(bytes, &filename).await?;
        progress(30, "text extracted");

        progress(40, "analyzing issues");
        let analysis = self.extractor.analyze(document.content()).await?;
        progress(60, "issues analyzed");

        progress(70, "revising document");
        let revised = self
            .pipeline
            .revise(document.content(), &analysis.issues)
            .await?;
        progress(80, "document revised");

        progress(85, "publishing issues document");
        let issues_doc_url = self.publisher.publish_issues(&analysis.issues).await?;
        progress(92, "issues document published");

        progress(95, "publishing revised document");
        let modified_doc_url = self
            .publisher
            .publish_revision(document.content(), &revised)
            .await?;
        progress(100, "revised document published");

        tracing::info!(publisher = self.publisher.name(), "review complete");
        Ok(ReviewReport {
            summary: analysis.summary,
            issues_doc_url,
            modified_doc_url,
        })
    }
}

impl<P, D> DocumentAnalyzer for ReviewService<P, D>
where
    P: LlmProvider + 'static,
    D: DocumentPublisher,
{
    fn analyze(
        &self,
        upload: Upload,
    ) -> Pin<Box<dyn Future<Output = Result<ReviewReport, ReviewError>> + Send + '_>> {
        Box::pin(self.review(upload))
    }
}
