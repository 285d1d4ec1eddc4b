use std::net::IpAddr;
use std::time::Duration;

use precis_core::error::AppError;
use precis_core::traits::Fetcher;
use reqwest::header::LOCATION;
use reqwest::{Client, redirect};
use url::Url;

/// User-Agent sent with every page request. Many sites serve degraded or
/// blocked responses to non-browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 10;

/// HTTP fetcher using reqwest.
///
/// Downloads the raw page body with a desktop-browser User-Agent. The body
/// is returned untouched: no parsing, stripping, or size limit.
/// By default, SSRF protection is **enabled**: requests to private/reserved
/// IP ranges are blocked. Use [`allow_private_urls`](Self::allow_private_urls)
/// to disable this (e.g., for local development).
///
/// Redirects are followed by hand, up to 10 hops, and every hop goes through
/// the same URL checks as the original request.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
    ssrf_protection: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs,
            ssrf_protection: true,
        })
    }

    /// Disable SSRF protection, allowing requests to private/reserved IPs.
    pub fn allow_private_urls(mut self) -> Self {
        self.ssrf_protection = false;
        self
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let mut current = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let target = validate_url(&current, self.ssrf_protection).await?;

            let response = self.client.get(target.clone()).send().await.map_err(|e| {
                if e.is_timeout() {
                    AppError::FetchError(format!(
                        "Timed out after {} seconds fetching {current}",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    AppError::FetchError(format!("Connection failed: {e}"))
                } else {
                    AppError::FetchError(e.to_string())
                }
            })?;

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        AppError::FetchError(format!(
                            "HTTP {} without a Location header for {current}",
                            status.as_u16()
                        ))
                    })?;
                let next = target.join(location).map_err(|e| {
                    AppError::FetchError(format!("Invalid redirect target '{location}': {e}"))
                })?;
                tracing::debug!(from = %current, to = %next, "Following redirect");
                current = next.into();
                continue;
            }

            if !status.is_success() {
                return Err(AppError::FetchError(format!(
                    "HTTP {} for {}",
                    status.as_u16(),
                    current
                )));
            }

            return response
                .text()
                .await
                .map_err(|e| AppError::FetchError(format!("Failed to read response body: {e}")));
        }

        Err(AppError::FetchError(format!(
            "Too many redirects (more than {MAX_REDIRECTS}) starting from {url}"
        )))
    }
}

// ---------------------------------------------------------------------------
// URL checks
// ---------------------------------------------------------------------------

/// Validate a URL before fetching it, returning the parsed form.
///
/// 1. Only allow `http` and `https` schemes.
/// 2. If `block_private` is set, resolve the hostname via DNS and reject it
///    when any resolved IP is private/reserved (server-side request forgery).
async fn validate_url(url: &str, block_private: bool) -> Result<Url, AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::FetchError(format!("Invalid URL: {e}")))?;

    // 1. Scheme check
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::FetchError(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if !block_private {
        return Ok(parsed);
    }

    // 2. Extract host
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::FetchError("URL has no host".to_string()))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    // 3. If the host is already an IP literal, check it directly
    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(ip) {
            return Err(AppError::FetchError(format!(
                "SSRF blocked: {host} is a private/reserved IP"
            )));
        }
        return Ok(parsed);
    }

    // 4. DNS resolve and check all addresses
    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| AppError::FetchError(format!("DNS resolution failed for {host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(AppError::FetchError(format!(
            "DNS resolution returned no addresses for {host}"
        )));
    }

    if let Some(blocked) = addrs.iter().find(|a| is_private_ip(a.ip())) {
        return Err(AppError::FetchError(format!(
            "SSRF blocked: {host} resolves to private/reserved IP {}",
            blocked.ip()
        )));
    }

    Ok(parsed)
}

/// Check if an IP address is in a private/reserved/link-local range.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()           // 127.0.0.0/8
                || v4.is_private()     // 10/8, 172.16/12, 192.168/16
                || v4.is_link_local()  // 169.254.0.0/16 (cloud metadata)
                || v4.is_unspecified() // 0.0.0.0
                || v4.is_broadcast()   // 255.255.255.255
                || v4.is_documentation() // 192.0.2/24, 198.51.100/24, 203.0.113/24
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64 // 100.64.0.0/10 (CGN)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()       // ::1
                || v6.is_unspecified() // ::
                // fe80::/10 (link-local)
                || (v6.segments()[0] & 0xFFC0) == 0xFE80
                // fc00::/7 (unique local)
                || (v6.segments()[0] & 0xFE00) == 0xFC00
                || match v6.to_ipv4_mapped() {
                    Some(v4) => is_private_ip(IpAddr::V4(v4)),
                    None => false,
                }
        }
    }
}
