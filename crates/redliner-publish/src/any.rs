use crate::google::GoogleDocsPublisher;
use crate::local::LocalPublisher;
#[cfg(feature = "mock")]
use crate::mock::RecordingPublisher;
use crate::{DocumentPublisher, PublishError};

macro_rules! delegate_publisher {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyPublisher::GoogleDocs($p) => $expr,
            AnyPublisher::Local($p) => $expr,
            #[cfg(feature = "mock")]
            AnyPublisher::Recording($p) => $expr,
        }
    };
}

/// Publisher backend selected at startup from configuration.
#[derive(Debug)]
pub enum AnyPublisher {
    GoogleDocs(GoogleDocsPublisher),
    Local(LocalPublisher),
    #[cfg(feature = "mock")]
    Recording(RecordingPublisher),
}

impl DocumentPublisher for AnyPublisher {
    async fn publish_issues(&self, issues: &[String]) -> Result<String, PublishError> {
        delegate_publisher!(self, |p| p.publish_issues(issues).await)
    }

    async fn publish_revision(&self, original: &str, revised: &str) -> Result<String, PublishError> {
        delegate_publisher!(self, |p| p.publish_revision(original, revised).await)
    }

    fn name(&self) -> &'static str {
        delegate_publisher!(self, |p| p.name())
    }
}
