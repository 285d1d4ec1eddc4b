use std::future::Future;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::UrlRecord;

/// Fetches the raw body of a web page.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Produces a short natural-language summary of text content.
pub trait Summarizer: Send + Sync + Clone {
    /// Summarizes `content` as given. Implementations must not truncate it.
    fn summarize(&self, content: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Persists and retrieves URL submissions.
pub trait UrlStore: Send + Sync + Clone {
    /// Validate and persist a new record with a fresh id and the current time.
    fn create(&self, url: &str) -> impl Future<Output = Result<UrlRecord, AppError>> + Send;

    /// Load a record by id, failing with [`AppError::NotFound`] if absent.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = Result<UrlRecord, AppError>> + Send;

    /// Check connectivity to the backing storage.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}
