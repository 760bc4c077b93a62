use std::sync::Arc;

use redliner_llm::{LlmProvider, Message};
use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::prompt;

/// Summary and issue list returned by the analysis call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub issues: Vec<String>,
}

pub struct IssueExtractor<P> {
    provider: Arc<P>,
}

impl<P: LlmProvider> IssueExtractor<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Ask the model for a summary and the problematic clauses of `text`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::UpstreamModel` if the call fails and
    /// `ReviewError::EmptyModelResponse` if the model answers with nothing.
    pub async fn analyze(&self, text: &str) -> Result<Analysis, ReviewError> {
        let response = self
            .provider
            .chat(&[Message::user(prompt::analysis_prompt(text))])
            .await?;
        if response.trim().is_empty() {
            tracing::error!(provider = self.provider.name(), "empty analysis response");
            return Err(ReviewError::EmptyModelResponse);
        }

        let analysis = parse_analysis(&response);
        if analysis.summary.is_empty() && analysis.issues.is_empty() {
            tracing::warn!("model response contained neither a summary nor issues");
        }
        tracing::info!(issues = analysis.issues.len(), "analysis complete");
        Ok(analysis)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Summary,
    Issues,
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Parse a `Summary:` / `Issues:` response.
///
/// Only the first non-empty line after `Summary:` is kept. Each non-empty line
/// after `Issues:` becomes one issue with its leading `-` bullet removed.
/// Text on the header line itself is ignored.
#[must_use]
pub fn parse_analysis(response: &str) -> Analysis {
    let mut section = Section::None;
    let mut analysis = Analysis::default();

    for line in response.lines().map(str::trim) {
        if starts_with_ignore_case(line, "summary:") {
            section = Section::Summary;
            continue;
        }
        if starts_with_ignore_case(line, "issues:") {
            section = Section::Issues;
            continue;
        }
        if line.is_empty() {
            continue;
        }
        match section {
            Section::Summary if analysis.summary.is_empty() => {
                analysis.summary = line.to_owned();
            }
            Section::Issues => {
                let issue = line.trim_start_matches(['-', ' ']).trim();
                if !issue.is_empty() {
                    analysis.issues.push(issue.to_owned());
                }
            }
            _ => {}
        }
    }
    analysis
}
