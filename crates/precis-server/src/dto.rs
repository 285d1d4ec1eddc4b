use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use precis_core::models::UrlRecord;

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitUrlRequest {
    /// Website URL to store and summarize
    pub url: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecordResponse {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<UrlRecord> for UrlRecordResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            id: record.id,
            url: record.url,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubmitUrlResponse {
    pub message: String,
    pub data: UrlRecordResponse,
    pub summary: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SummaryResponse {
    pub message: String,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable description
    pub error: String,
    /// Machine-readable failure kind (e.g. `fetch_error`)
    pub code: String,
}
