//! Test-only publisher that records what it was asked to publish.

use std::sync::{Arc, Mutex};

use crate::{DocumentPublisher, PublishError};

#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    issues: Arc<Mutex<Vec<Vec<String>>>>,
    revisions: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_publish: bool,
}

impl RecordingPublisher {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    /// Issue lists passed to `publish_issues`, in call order.
    #[must_use]
    pub fn published_issues(&self) -> Vec<Vec<String>> {
        self.issues.lock().unwrap().clone()
    }

    /// `(original, revised)` pairs passed to `publish_revision`, in call order.
    #[must_use]
    pub fn published_revisions(&self) -> Vec<(String, String)> {
        self.revisions.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), PublishError> {
        if self.fail_publish {
            return Err(PublishError::Api {
                operation: "mock",
                status: 503,
                body: "mock publish error".into(),
            });
        }
        Ok(())
    }
}

impl DocumentPublisher for RecordingPublisher {
    async fn publish_issues(&self, issues: &[String]) -> Result<String, PublishError> {
        self.check()?;
        let mut log = self.issues.lock().unwrap();
        log.push(issues.to_vec());
        Ok(format!("mock://issues/{}", log.len()))
    }

    async fn publish_revision(&self, original: &str, revised: &str) -> Result<String, PublishError> {
        self.check()?;
        let mut log = self.revisions.lock().unwrap();
        log.push((original.to_owned(), revised.to_owned()));
        Ok(format!("mock://revisions/{}", log.len()))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
