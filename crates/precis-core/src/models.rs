use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

/// A persisted URL submission.
///
/// Records are created once per submission and never mutated; resubmitting
/// the same URL creates a new record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UrlRecord {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful submission: the stored record plus a fresh summary.
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: UrlRecord,
    pub summary: String,
}

/// Reject missing, empty, or whitespace-only URLs.
///
/// Every [`UrlStore`](crate::traits::UrlStore) implementation calls this
/// before writing, so a rejected URL never produces a record.
pub fn validate_url(url: &str) -> Result<(), AppError> {
    if url.trim().is_empty() {
        return Err(AppError::ValidationError("URL is required".into()));
    }
    Ok(())
}
