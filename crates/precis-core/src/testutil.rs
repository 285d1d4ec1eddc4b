//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit and integration tests.
//! All mocks share their state through `Arc`, so a clone handed to the
//! pipeline and the clone kept by the test observe the same calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{UrlRecord, validate_url};
use crate::traits::{Fetcher, Summarizer, UrlStore};

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory store, preserving insertion order for assertions.
#[derive(Clone, Default)]
pub struct MockStore {
    records: Arc<Mutex<Vec<UrlRecord>>>,
    write_error: Option<Arc<str>>,
    unhealthy: bool,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store whose writes fail with a database error.
    pub fn with_write_error(message: &str) -> Self {
        Self {
            write_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Store whose connectivity probe fails.
    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }

    /// Seed a record directly, bypassing validation.
    pub fn insert(&self, url: &str) -> UrlRecord {
        let record = UrlRecord {
            id: Uuid::new_v4(),
            url: url.to_string(),
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<UrlRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl UrlStore for MockStore {
    async fn create(&self, url: &str) -> Result<UrlRecord, AppError> {
        validate_url(url)?;
        if let Some(message) = &self.write_error {
            return Err(AppError::DatabaseError(message.to_string()));
        }
        Ok(self.insert(url))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<UrlRecord, AppError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("URL record {id}")))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        if self.unhealthy {
            return Err(AppError::DatabaseError("connection refused".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum FetchBehavior {
    Content(String),
    Fail(String),
}

/// Mock fetcher returning fixed content (or a fixed failure) on every call.
#[derive(Clone)]
pub struct MockFetcher {
    behavior: FetchBehavior,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(content: &str) -> Self {
        Self::with_behavior(FetchBehavior::Content(content.to_string()))
    }

    /// Fetcher that fails every call with a [`AppError::FetchError`].
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(FetchBehavior::Fail(message.to_string()))
    }

    /// Sleep before answering, to keep calls in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_behavior(behavior: FetchBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behavior {
            FetchBehavior::Content(content) => Ok(content.clone()),
            FetchBehavior::Fail(message) => Err(AppError::FetchError(message.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSummarizer
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum SummaryBehavior {
    Uppercase,
    Numbered,
    Fail { message: String, status_code: u16 },
}

/// Mock summarizer with a deterministic or call-dependent output.
#[derive(Clone)]
pub struct MockSummarizer {
    behavior: SummaryBehavior,
    calls: Arc<AtomicUsize>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockSummarizer {
    /// Echoes its input uppercased.
    pub fn uppercase() -> Self {
        Self::with_behavior(SummaryBehavior::Uppercase)
    }

    /// Returns `summary #N` where N is the call number, like a
    /// non-deterministic provider would.
    pub fn numbered() -> Self {
        Self::with_behavior(SummaryBehavior::Numbered)
    }

    pub fn failing(message: &str, status_code: u16) -> Self {
        Self::with_behavior(SummaryBehavior::Fail {
            message: message.to_string(),
            status_code,
        })
    }

    fn with_behavior(behavior: SummaryBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(&self, content: &str) -> Result<String, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.inputs.lock().unwrap().push(content.to_string());
        match &self.behavior {
            SummaryBehavior::Uppercase => Ok(content.to_uppercase()),
            SummaryBehavior::Numbered => Ok(format!("summary #{n}")),
            SummaryBehavior::Fail {
                message,
                status_code,
            } => Err(AppError::summarization(message.clone(), *status_code)),
        }
    }
}
