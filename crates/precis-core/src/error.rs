use thiserror::Error;

/// Application-wide error types for Précis.
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller supplied invalid input (e.g. a missing or empty URL).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No record exists for the requested identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Fetching page content failed (network, non-2xx status, timeout, refused URL).
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// The completion provider failed or returned an unusable response.
    ///
    /// `status_code` is 0 when no HTTP response was received.
    #[error("Summarization error (HTTP {status_code}): {message}")]
    SummarizationError { message: String, status_code: u16 },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request did not finish within its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl AppError {
    /// Stable machine-readable code identifying the failure kind.
    ///
    /// Lets callers tell which pipeline stage failed even when the HTTP
    /// status is the same for all of them.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::FetchError(_) => "fetch_error",
            AppError::SummarizationError { .. } => "summarization_error",
            AppError::SerializationError(_) => "serialization_error",
            AppError::DatabaseError(_) => "database_error",
            AppError::ConfigError(_) => "config_error",
            AppError::Timeout(_) => "timeout",
        }
    }

    /// Returns true if the error was caused by the caller rather than a
    /// downstream service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::ValidationError(_) | AppError::NotFound(_))
    }

    /// Shorthand for [`AppError::SummarizationError`].
    pub fn summarization(message: impl Into<String>, status_code: u16) -> Self {
        AppError::SummarizationError {
            message: message.into(),
            status_code,
        }
    }
}
