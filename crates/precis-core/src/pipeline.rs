use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Submission, UrlRecord};
use crate::traits::{Fetcher, Summarizer, UrlStore};

/// Default byte budget for content handed to the summarizer.
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 100_000;

/// How much fetched content is forwarded to the summarizer.
///
/// Oversized pages are cut at the last UTF-8 character boundary within the
/// budget. The summarizer itself never truncates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentPolicy {
    max_bytes: Option<usize>,
}

impl ContentPolicy {
    /// Forward content unchanged regardless of size.
    pub fn unlimited() -> Self {
        Self { max_bytes: None }
    }

    /// Truncate content to at most `max_bytes`. Zero means unlimited.
    pub fn truncate_to(max_bytes: usize) -> Self {
        Self {
            max_bytes: (max_bytes > 0).then_some(max_bytes),
        }
    }

    pub fn max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }

    /// Apply the policy, returning the (possibly shortened) content.
    pub fn apply<'a>(&self, content: &'a str) -> &'a str {
        match self.max_bytes {
            Some(max) if content.len() > max => {
                let mut end = max;
                while !content.is_char_boundary(end) {
                    end -= 1;
                }
                &content[..end]
            }
            _ => content,
        }
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::truncate_to(DEFAULT_MAX_CONTENT_BYTES)
    }
}

/// Orchestrates the ingestion pipeline: store → fetch → summarize.
///
/// Generic over all external dependencies via traits, so the pipeline can be
/// exercised without a database, network, or completion provider. Nothing is
/// cached: every call fetches and summarizes live.
#[derive(Clone)]
pub struct IngestService<S, F, Z>
where
    S: UrlStore,
    F: Fetcher,
    Z: Summarizer,
{
    store: S,
    fetcher: F,
    summarizer: Z,
    policy: ContentPolicy,
}

impl<S, F, Z> IngestService<S, F, Z>
where
    S: UrlStore,
    F: Fetcher,
    Z: Summarizer,
{
    /// Create a service with the default content policy.
    pub fn new(store: S, fetcher: F, summarizer: Z) -> Self {
        Self {
            store,
            fetcher,
            summarizer,
            policy: ContentPolicy::default(),
        }
    }

    pub fn with_content_policy(mut self, policy: ContentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a URL, then fetch and summarize it.
    ///
    /// 1. Validate and store the URL (aborts before any fetch on failure)
    /// 2. Fetch the page body (the record is kept if this fails)
    /// 3. Summarize the content
    pub async fn submit(&self, url: &str) -> Result<Submission, AppError> {
        // 1. Store
        let record = self
            .store
            .create(url)
            .await
            .inspect_err(|e| log_failure("store", None, url, e))?;
        tracing::info!(id = %record.id, url = %record.url, "Stored URL record");

        // 2 & 3. Fetch + Summarize
        let summary = self.fetch_and_summarize(&record).await?;

        Ok(Submission { record, summary })
    }

    /// Load a previously submitted record and summarize its URL again.
    pub async fn resummarize(&self, id: Uuid) -> Result<String, AppError> {
        let record = self
            .store
            .get_by_id(id)
            .await
            .inspect_err(|e| log_failure("load", Some(id), "", e))?;

        self.fetch_and_summarize(&record).await
    }

    async fn fetch_and_summarize(&self, record: &UrlRecord) -> Result<String, AppError> {
        let id = Some(record.id);

        tracing::info!(id = %record.id, url = %record.url, "Fetching");
        let content = self
            .fetcher
            .fetch(&record.url)
            .await
            .inspect_err(|e| log_failure("fetch", id, &record.url, e))?;

        let prompt_content = self.policy.apply(&content);
        if prompt_content.len() < content.len() {
            tracing::warn!(
                id = %record.id,
                bytes = content.len(),
                kept = prompt_content.len(),
                "Content exceeds budget, truncating before summarization"
            );
        } else {
            tracing::info!(id = %record.id, bytes = content.len(), "Fetched content");
        }

        let summary = self
            .summarizer
            .summarize(prompt_content)
            .await
            .inspect_err(|e| log_failure("summarize", id, &record.url, e))?;
        tracing::info!(id = %record.id, chars = summary.len(), "Summary generated");

        Ok(summary)
    }
}

fn log_failure(stage: &'static str, id: Option<Uuid>, url: &str, error: &AppError) {
    let id = id.map(|id| id.to_string()).unwrap_or_default();
    if error.is_client_error() {
        tracing::warn!(
            stage,
            id = %id,
            url,
            code = error.code(),
            %error,
            "Pipeline step rejected"
        );
    } else {
        tracing::error!(
            stage,
            id = %id,
            url,
            code = error.code(),
            %error,
            "Pipeline step failed"
        );
    }
}

/// Object-safe view of the pipeline, for holding behind `Arc<dyn Pipeline>`.
pub trait Pipeline: Send + Sync {
    fn submit<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Submission, AppError>>;

    fn resummarize(&self, id: Uuid) -> BoxFuture<'_, Result<String, AppError>>;

    fn health_check(&self) -> BoxFuture<'_, Result<(), AppError>>;
}

impl<S, F, Z> Pipeline for IngestService<S, F, Z>
where
    S: UrlStore + 'static,
    F: Fetcher + 'static,
    Z: Summarizer + 'static,
{
    fn submit<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Submission, AppError>> {
        Box::pin(IngestService::submit(self, url))
    }

    fn resummarize(&self, id: Uuid) -> BoxFuture<'_, Result<String, AppError>> {
        Box::pin(IngestService::resummarize(self, id))
    }

    fn health_check(&self) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(self.store.health_check())
    }
}
