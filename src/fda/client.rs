// src/fda/client.rs
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;

use crate::batch::DocumentSource;
use crate::utils::error::{AppError, FetchError};

/// Browser identities rotated across requests.
pub const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/95.0.4638.69 Safari/537.36",
];

const SRLC_REFERER: &str = "https://www.accessdata.fda.gov/scripts/cder/safetylabelingchanges/";
const MAX_REDIRECTS: usize = 10;

/// Pacing, timeout and identity rotation for label page requests.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
    pub user_agents: Vec<String>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

impl FetchPolicy {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.min_delay > self.max_delay {
            return Err(AppError::Config(format!(
                "Minimum delay {:?} exceeds maximum delay {:?}",
                self.min_delay, self.max_delay
            )));
        }
        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(AppError::Config("User-Agent pool is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(AppError::Config("Request timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Uniform draw from `[min_delay, max_delay]`, millisecond resolution.
    pub fn pacing_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    pub fn pick_user_agent(&self) -> Option<&str> {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

/// Headers a browser sends when navigating the SrLC database.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::REFERER, HeaderValue::from_static(SRLC_REFERER));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Maps a response status onto the fetch error taxonomy.
fn check_status(status: StatusCode, url: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("Received {} - request rate or identity likely rejected.", status);
            Err(FetchError::RateLimited(status))
        }
        StatusCode::NOT_FOUND => Err(FetchError::NotFound(url.to_string())),
        _ => Err(FetchError::Http(status)),
    }
}

/// HTTP client for label pages. One connection pool is reused for the whole run.
pub struct LabelClient {
    http: reqwest::Client,
    policy: FetchPolicy,
}

impl LabelClient {
    pub fn new(policy: FetchPolicy) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(policy.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { http, policy })
    }

    /// Downloads one label page, rotating the User-Agent per request.
    pub async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut request = self.http.get(url);
        if let Some(user_agent) = self.policy.pick_user_agent() {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| FetchError::Client(format!("invalid User-Agent '{}': {}", user_agent, e)))?;
            tracing::debug!("Using User-Agent: {}", user_agent);
            request = request.header(header::USER_AGENT, value);
        }

        let response = request.send().await?;
        check_status(response.status(), url)?;

        let body = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DocumentSource for LabelClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_page(url).await
    }

    async fn pace(&self) {
        let delay = self.policy.pacing_delay();
        tracing::debug!("Pausing {:?} before the next request", delay);
        tokio::time::sleep(delay).await;
    }
}
