//! Concurrency limiting for outbound calls.
//!
//! Wraps any [`Fetcher`] or [`Summarizer`] so that at most N calls are in
//! flight at once across all requests sharing the wrapper. Excess callers
//! wait for a permit before opening a connection.
//!
//! # Example
//!
//! ```rust,no_run
//! use precis_core::limit::Limited;
//! # use precis_core::traits::Fetcher;
//! # #[derive(Clone)] struct MyFetcher;
//! # impl Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &str) -> Result<String, precis_core::error::AppError> { todo!() }
//! # }
//! // Never more than 8 page fetches at the same time
//! let fetcher = Limited::new(MyFetcher, 8);
//! ```

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::AppError;
use crate::traits::{Fetcher, Summarizer};

/// A wrapper that bounds the number of concurrent calls to `inner`.
///
/// Clones share the same permit pool.
#[derive(Clone)]
pub struct Limited<T> {
    inner: T,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl<T> Limited<T> {
    /// Wrap `inner`, allowing at most `max_concurrent` calls at once.
    ///
    /// A limit of zero is treated as one.
    pub fn new(inner: T, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of calls that could start right now without waiting.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        let permit = match self.permits.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!(limit = self.max_concurrent, "Waiting for a free slot");
                self.permits.acquire().await.ok()?
            }
        };
        Some(permit)
    }
}

impl<F: Fetcher> Fetcher for Limited<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let _permit = self
            .acquire()
            .await
            .ok_or_else(|| AppError::FetchError("fetch limiter closed".into()))?;
        self.inner.fetch(url).await
    }
}

impl<Z: Summarizer> Summarizer for Limited<Z> {
    async fn summarize(&self, content: &str) -> Result<String, AppError> {
        let _permit = self
            .acquire()
            .await
            .ok_or_else(|| AppError::summarization("summarizer limiter closed", 0))?;
        self.inner.summarize(content).await
    }
}
