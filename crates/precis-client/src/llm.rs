use std::time::Duration;

use precis_core::error::AppError;
use precis_core::traits::Summarizer;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);
const SUMMARY_INSTRUCTION: &str = "Summarize the following website content in a short paragraph. \
     Focus on what the site or page is about and its key points.";

/// OpenAI-compatible completion client that summarizes page content.
///
/// Works with any OpenAI-compatible `/chat/completions` API, including:
/// - OpenAI directly (`https://api.openai.com/v1`)
/// - Gemini via compatibility layer (`https://generativelanguage.googleapis.com/v1beta/openai`)
/// - OpenRouter (`https://openrouter.ai/api/v1`)
#[derive(Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiSummarizer {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        Self::build(api_key, model, base_url, DEFAULT_LLM_TIMEOUT)
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AppError> {
        Self::build(&self.api_key, &self.model, &self.base_url, timeout)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(
                "Summarization API key must not be empty".into(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

/// Build the fixed summarization prompt around the full page content.
pub fn build_prompt(content: &str) -> String {
    format!("{SUMMARY_INSTRUCTION}\n\n{content}")
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the trimmed text of the first choice out of a completion response.
fn first_choice_text(body: &str) -> Result<String, AppError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        AppError::summarization(format!("Malformed completion response: {e}"), 200)
    })?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(AppError::summarization(
            "Empty response from completion provider",
            200,
        ));
    }
    Ok(text)
}

/// Turn a non-2xx provider response into a summarization error.
fn provider_error(status_code: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {status_code}: {body}"));
    AppError::summarization(message, status_code)
}

impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, content: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: build_prompt(content),
            }],
        };

        tracing::debug!(model = %self.model, prompt_bytes = content.len(), "Requesting summary");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::summarization(
                        format!("Timed out after {} seconds", self.timeout_secs),
                        0,
                    )
                } else if e.is_connect() {
                    AppError::summarization(format!("Connection failed: {e}"), 0)
                } else {
                    AppError::summarization(e.to_string(), 0)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::summarization(
                format!("Failed to read completion response: {e}"),
                status.as_u16(),
            )
        })?;

        if !status.is_success() {
            return Err(provider_error(status.as_u16(), &body));
        }

        first_choice_text(&body)
    }
}
