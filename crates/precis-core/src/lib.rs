pub mod error;
pub mod limit;
pub mod models;
pub mod pipeline;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::AppError;
pub use limit::Limited;
pub use models::{Submission, UrlRecord, validate_url};
pub use pipeline::{ContentPolicy, IngestService, Pipeline};
pub use traits::{Fetcher, Summarizer, UrlStore};
