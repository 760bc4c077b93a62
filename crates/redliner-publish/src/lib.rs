//! Publishing of review results as shareable documents.

pub mod any;
pub mod auth;
pub mod error;
pub mod google;
pub mod local;
#[cfg(feature = "mock")]
pub mod mock;

pub use any::AnyPublisher;
pub use auth::{GoogleAuth, ServiceAccountKey};
pub use error::PublishError;
pub use google::GoogleDocsPublisher;
pub use local::LocalPublisher;

pub const ISSUES_TITLE: &str = "Legal Document Issues";
pub const ISSUES_HEADING: &str = "Ambiguous or Biased Clauses";
pub const REVISION_TITLE: &str = "Modified Legal Document";

/// Destination for the two documents a review produces.
///
/// Both operations return a URL the caller can open. Issue order is written
/// exactly as given.
pub trait DocumentPublisher: Send + Sync {
    /// # Errors
    ///
    /// Returns `PublishError` if the document cannot be created or shared.
    fn publish_issues(
        &self,
        issues: &[String],
    ) -> impl Future<Output = Result<String, PublishError>> + Send;

    /// # Errors
    ///
    /// Returns `PublishError` if the document cannot be created or shared.
    fn publish_revision(
        &self,
        original: &str,
        revised: &str,
    ) -> impl Future<Output = Result<String, PublishError>> + Send;

    fn name(&self) -> &'static str;
}
