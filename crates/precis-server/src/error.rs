use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use precis_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::ValidationError(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors carry their own message; server errors get a generic,
    /// stage-specific one so provider and database details stay in the logs.
    fn public_message(&self) -> String {
        match &self.0 {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::FetchError(_) => "Failed to fetch website content".into(),
            AppError::SummarizationError { .. } => "Failed to generate summary".into(),
            AppError::DatabaseError(_) => "Failed to access storage".into(),
            AppError::Timeout(_) => "Request timed out".into(),
            _ => "Internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(code = self.0.code(), error = %self.0, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: self.0.code().to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
