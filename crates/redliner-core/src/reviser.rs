use std::sync::Arc;
use std::time::Instant;

use redliner_document::Chunk;
use redliner_llm::{LlmProvider, Message};

use crate::prompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    EmptyResponse,
    ModelError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Revised,
    /// The original chunk text was kept.
    Fallback(FallbackReason),
}

/// Revised (or original) text of one chunk, tagged with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub text: String,
    pub outcome: ChunkOutcome,
}

impl ChunkResult {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Fallback(_))
    }
}

/// Revises chunks against a fixed issue list.
///
/// Cloning is cheap and clones share the provider and the issues, so one
/// reviser can be handed to every concurrent task.
pub struct ChunkReviser<P> {
    provider: Arc<P>,
    issues: Arc<[String]>,
}

impl<P> Clone for ChunkReviser<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            issues: Arc::clone(&self.issues),
        }
    }
}

impl<P: LlmProvider> ChunkReviser<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, issues: Arc<[String]>) -> Self {
        Self { provider, issues }
    }

    /// Revise one chunk. Never fails: a model error or an empty answer keeps
    /// the chunk as it was.
    pub async fn revise(&self, chunk: Chunk) -> ChunkResult {
        let started = Instant::now();
        let position = chunk.chunk_index + 1;
        let total = chunk.total_chunks;
        let prompt = prompt::chunk_prompt(&chunk.content, &self.issues);

        let (text, outcome) = match self.provider.chat(&[Message::user(prompt)]).await {
            Ok(response) => {
                let revised = response.trim();
                if revised.is_empty() {
                    tracing::warn!(chunk = position, total, "empty response, keeping original chunk");
                    (chunk.content, ChunkOutcome::Fallback(FallbackReason::EmptyResponse))
                } else {
                    (revised.to_owned(), ChunkOutcome::Revised)
                }
            }
            Err(e) => {
                tracing::error!(chunk = position, total, "chunk revision failed: {e}");
                (
                    chunk.content,
                    ChunkOutcome::Fallback(FallbackReason::ModelError(e.to_string())),
                )
            }
        };

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(chunk = position, total, elapsed_ms, "modified chunk");

        ChunkResult {
            index: chunk.chunk_index,
            text,
            outcome,
        }
    }
}
