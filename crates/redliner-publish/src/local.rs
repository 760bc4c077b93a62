//! Filesystem publisher for offline runs and tests.
//!
//! Each call writes fresh files named with a random id, so concurrent reviews
//! never overwrite each other. The revision also gets a unified diff against
//! the original next to it.

use std::path::{Path, PathBuf};

use similar::TextDiff;
use url::Url;

use crate::{DocumentPublisher, ISSUES_HEADING, PublishError};

#[derive(Debug, Clone)]
pub struct LocalPublisher {
    output_dir: PathBuf,
}

impl LocalPublisher {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn write(&self, file_name: &str, contents: String) -> Result<PathBuf, PublishError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        Ok(tokio::fs::canonicalize(&path).await?)
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn file_url(path: PathBuf) -> Result<String, PublishError> {
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|()| PublishError::InvalidPath(path))
}

fn render_issues(issues: &[String]) -> String {
    let mut out = format!("# {ISSUES_HEADING}\n\n");
    for issue in issues {
        out.push_str("- ");
        out.push_str(issue);
        out.push('\n');
    }
    out
}

fn render_diff(original: &str, revised: &str) -> String {
    TextDiff::from_lines(original, revised)
        .unified_diff()
        .context_radius(3)
        .header("original", "revised")
        .to_string()
}

impl DocumentPublisher for LocalPublisher {
    async fn publish_issues(&self, issues: &[String]) -> Result<String, PublishError> {
        let path = self
            .write(&format!("issues-{}.md", new_id()), render_issues(issues))
            .await?;
        tracing::info!(path = %path.display(), count = issues.len(), "wrote issues document");
        file_url(path)
    }

    async fn publish_revision(&self, original: &str, revised: &str) -> Result<String, PublishError> {
        let id = new_id();
        let path = self
            .write(&format!("revised-{id}.txt"), format!("{revised}\n"))
            .await?;
        self.write(&format!("revised-{id}.diff"), render_diff(original, revised))
            .await?;
        tracing::info!(path = %path.display(), "wrote revised document");
        file_url(path)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(url: &str) -> PathBuf {
        Url::parse(url).unwrap().to_file_path().unwrap()
    }

    #[tokio::test]
    async fn issues_written_as_markdown_list() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = LocalPublisher::new(dir.path());

        let url = publisher
            .publish_issues(&["Clause 4 is vague".into(), "Penalty is one-sided".into()])
            .await
            .unwrap();
        assert!(url.starts_with("file://"));

        let body = std::fs::read_to_string(path_of(&url)).unwrap();
        assert_eq!(
            body,
            "# Ambiguous or Biased Clauses\n\n- Clause 4 is vague\n- Penalty is one-sided\n"
        );
    }

    #[tokio::test]
    async fn empty_issue_list_still_writes_heading() {
        let dir = tempfile::tempdir().unwrap();
        let url = LocalPublisher::new(dir.path())
            .publish_issues(&[])
            .await
            .unwrap();
        let body = std::fs::read_to_string(path_of(&url)).unwrap();
        assert_eq!(body, "# Ambiguous or Biased Clauses\n\n");
    }

    #[tokio::test]
    async fn revision_writes_text_and_diff() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = LocalPublisher::new(dir.path().join("out"));

        let url = publisher
            .publish_revision("The tenant may pay.\nEnd.", "The tenant shall pay.\nEnd.")
            .await
            .unwrap();
        let text_path = path_of(&url);
        assert_eq!(
            std::fs::read_to_string(&text_path).unwrap(),
            "The tenant shall pay.\nEnd.\n"
        );

        let diff_path = text_path.with_extension("diff");
        let diff = std::fs::read_to_string(diff_path).unwrap();
        assert!(diff.contains("-The tenant may pay."));
        assert!(diff.contains("+The tenant shall pay."));
    }

    #[tokio::test]
    async fn each_call_gets_a_distinct_file() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = LocalPublisher::new(dir.path());
        let a = publisher.publish_issues(&[]).await.unwrap();
        let b = publisher.publish_issues(&[]).await.unwrap();
        assert_ne!(a, b);
    }
}
