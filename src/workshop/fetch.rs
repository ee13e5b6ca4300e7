//! Fetch Steam Workshop collection pages.
//!
//! Accepts either a bare collection id or a pasted Workshop URL:
//! - `2875848298`
//! - `https://steamcommunity.com/sharedfiles/filedetails/?id=2875848298`

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info};

/// Default page for Workshop items and collections.
pub const DEFAULT_BASE_URL: &str = "https://steamcommunity.com/sharedfiles/filedetails/";

/// Browser-like User-Agent for steamcommunity.com
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Connection timeout: time to establish TCP connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall timeout for a single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from talking to Steam. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Build the blocking client used by both page and API sources.
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Downloads the HTML of a collection page.
pub struct Fetcher {
    client: Client,
    base_url: String,
}

impl Fetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    /// Page URL for a collection id.
    pub fn collection_url(&self, collection_id: &str) -> String {
        format!("{}?id={}", self.base_url, collection_id)
    }

    /// GET the collection page. One attempt only.
    pub fn fetch_page(&self, collection_id: &str) -> Result<String, FetchError> {
        let url = self.collection_url(collection_id);
        info!("Fetching collection page: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let html = response
            .text()
            .map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?;

        debug!("Received {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

/// Normalize user input to a collection id.
///
/// Returns `None` for anything that is neither a numeric id nor a URL with an
/// `id=` query parameter.
pub fn parse_collection_id(input: &str) -> Option<String> {
    static ID_RE: OnceLock<Regex> = OnceLock::new();

    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Some(input.to_string());
    }

    let re = ID_RE.get_or_init(|| Regex::new(r"[?&]id=(\d+)").expect("valid regex"));
    let caps = re.captures(input)?;
    Some(caps.get(1)?.as_str().to_string())
}
