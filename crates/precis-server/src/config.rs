use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use precis_core::{AppError, ContentPolicy};

/// Server settings. Every flag can also be set through its environment variable.
#[derive(Parser, Clone)]
#[command(name = "precis-server", version, about = "Website summarizer API")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// API key for the completion provider
    #[arg(long, env = "PRECIS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model used for summaries
    #[arg(long, env = "PRECIS_MODEL", default_value = precis_client::llm::DEFAULT_MODEL)]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "PRECIS_BASE_URL", default_value = precis_client::llm::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout for fetching a page, in seconds
    #[arg(long, env = "PRECIS_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Timeout for a completion request, in seconds
    #[arg(long, env = "PRECIS_LLM_TIMEOUT_SECS", default_value_t = 120)]
    pub llm_timeout_secs: u64,

    /// Upper bound on a whole HTTP request, in seconds
    #[arg(long, env = "PRECIS_REQUEST_TIMEOUT_SECS", default_value_t = 180)]
    pub request_timeout_secs: u64,

    /// Bytes of page content sent to the summarizer (0 = no limit)
    #[arg(long, env = "PRECIS_MAX_CONTENT_BYTES", default_value_t = precis_core::pipeline::DEFAULT_MAX_CONTENT_BYTES)]
    pub max_content_bytes: usize,

    /// Maximum page fetches in flight across all requests
    #[arg(long, env = "PRECIS_MAX_CONCURRENT_FETCHES", default_value_t = 16)]
    pub max_concurrent_fetches: usize,

    /// Maximum completion requests in flight across all requests
    #[arg(long, env = "PRECIS_MAX_CONCURRENT_SUMMARIES", default_value_t = 4)]
    pub max_concurrent_summaries: usize,

    /// Allow fetching URLs that resolve to private or loopback addresses
    #[arg(long, env = "PRECIS_ALLOW_PRIVATE_URLS")]
    pub allow_private_urls: bool,
}

impl ServerConfig {
    /// Reject settings that would only fail later, per request.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::ConfigError("PRECIS_API_KEY must not be empty".into()));
        }
        for (name, value) in [
            ("PRECIS_FETCH_TIMEOUT_SECS", self.fetch_timeout_secs),
            ("PRECIS_LLM_TIMEOUT_SECS", self.llm_timeout_secs),
            ("PRECIS_REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(AppError::ConfigError(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn content_policy(&self) -> ContentPolicy {
        ContentPolicy::truncate_to(self.max_content_bytes)
    }
}
