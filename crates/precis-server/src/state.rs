use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use precis_core::{AppError, Pipeline};

/// Deadline applied to a whole submit or get-summary call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub pipeline: Arc<dyn Pipeline>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: impl Pipeline + 'static) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Run a pipeline call under the request deadline.
    ///
    /// On expiry the call is dropped, cancelling any in-flight fetch or
    /// completion request, and [`AppError::Timeout`] is returned.
    pub async fn within_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Gave up after {:?} waiting for the pipeline",
                    self.request_timeout
                ))
            })?
    }
}
