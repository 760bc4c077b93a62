//! Issue extraction, chunked revision and review orchestration.

pub mod config;
pub mod error;
pub mod issues;
pub mod pipeline;
pub mod prompt;
pub mod review;
pub mod reviser;
pub mod vault;

pub use config::Config;
pub use error::ReviewError;
pub use issues::{Analysis, IssueExtractor};
pub use pipeline::RevisionPipeline;
pub use review::{DocumentAnalyzer, ReviewReport, ReviewService, Upload};
pub use reviser::{ChunkOutcome, ChunkResult, ChunkReviser, FallbackReason};
