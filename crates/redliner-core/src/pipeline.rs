//! Whole-document revision: single call for short texts, bounded concurrent
//! chunk revision for long ones.

use std::sync::Arc;

use redliner_document::{join_paragraphs, split_paragraphs};
use redliner_llm::{LlmProvider, Message};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::ReviewError;
use crate::prompt;
use crate::reviser::{ChunkResult, ChunkReviser};

/// Texts shorter than this many characters are revised in one call.
pub const DEFAULT_SINGLE_CALL_THRESHOLD: usize = 2000;
/// Upper bound on chunk revisions in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

pub struct RevisionPipeline<P> {
    provider: Arc<P>,
    single_call_threshold: usize,
    max_concurrency: usize,
}

impl<P: LlmProvider + 'static> RevisionPipeline<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            single_call_threshold: DEFAULT_SINGLE_CALL_THRESHOLD,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, chars: usize) -> Self {
        self.single_call_threshold = chars;
        self
    }

    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Revise `text` so that it addresses `issues`.
    ///
    /// Returns `text` unchanged when there is nothing to fix or when the model
    /// produced no usable output.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::UpstreamModel` if the single-call path fails and
    /// `ReviewError::Orchestration` if a chunk task cannot be run to completion.
    pub async fn revise(&self, text: &str, issues: &[String]) -> Result<String, ReviewError> {
        if issues.is_empty() {
            tracing::info!("no issues found, keeping original text");
            return Ok(text.to_owned());
        }

        let chars = text.chars().count();
        if chars < self.single_call_threshold {
            tracing::debug!(chars, "revising in a single call");
            self.revise_whole(text, issues).await
        } else {
            self.revise_chunks(text, issues).await
        }
    }

    async fn revise_whole(&self, text: &str, issues: &[String]) -> Result<String, ReviewError> {
        let response = self
            .provider
            .chat(&[Message::user(prompt::document_prompt(text, issues))])
            .await?;
        let revised = response.trim();
        if revised.is_empty() {
            tracing::warn!("empty response for single-call revision, keeping original text");
            return Ok(text.to_owned());
        }
        Ok(revised.to_owned())
    }

    async fn revise_chunks(&self, text: &str, issues: &[String]) -> Result<String, ReviewError> {
        let chunks = split_paragraphs(text);
        let total = chunks.len();
        let permits = self.max_concurrency.min(total);
        tracing::info!(chunks = total, workers = permits, "revising in chunks");

        let semaphore = Arc::new(Semaphore::new(permits));
        let reviser = ChunkReviser::new(Arc::clone(&self.provider), Arc::from(issues));
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ReviewError::Orchestration(e.to_string()))?;
            let reviser = reviser.clone();
            tasks.spawn(async move {
                let result = reviser.revise(chunk).await;
                drop(permit);
                result
            });
        }

        let mut results: Vec<ChunkResult> = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|e| ReviewError::Orchestration(format!("chunk revision task failed: {e}")))?;
            results.push(result);
        }
        results.sort_by_key(|r| r.index);

        let fallbacks = results.iter().filter(|r| r.is_fallback()).count();
        if fallbacks > 0 {
            tracing::warn!(fallbacks, total, "some chunks kept their original text");
        }

        let revised = join_paragraphs(results.iter().map(|r| r.text.as_str()));
        if revised.trim().is_empty() {
            return Ok(text.to_owned());
        }
        Ok(revised)
    }
}
