//! Upstream page fetching and decoding.
//!
//! ### Raw fetch
//! - Single GET, no retries, client default headers (plus User-Agent if configured)
//! - Non-2xx answers fail with the upstream status attached
//! - Empty bodies fail with [`Error::PageNotFound`]
//! - Max redirects and max body bytes are configurable
//!
//! ### Decoding
//! [`FetchClient::fetch_text`] picks one of two branches:
//! - **declared**: a charset is resolved from headers or markup and the raw
//!   bytes are decoded with it
//! - **undeclared**: the page is requested a second time and the HTTP
//!   client's own text decoding (UTF-8 unless the response says otherwise)
//!   supplies the text

pub mod charset;
pub mod url;

use bytes::Bytes;
use ogtag_core::{AppConfig, Error};
use reqwest::Url;
use reqwest::{Client, Response, StatusCode, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, parse_target};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: none)
    pub user_agent: Option<String>,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: None, max_bytes: 5 * 1024 * 1024, timeout: Duration::from_millis(20000), max_redirects: 10 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// Raw response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body bytes, undecoded
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
}

/// Decoded page text.
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub text: String,
    /// Encoding used on the raw bytes; `None` when the text came from the second request.
    pub charset: Option<&'static str>,
}

/// HTTP fetch client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Upstream { status: None, message: format!("failed to build HTTP client: {}", e) })?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning the raw undecoded bytes and headers.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_target(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self.send(&url).await?;
        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Upstream { status: None, message: format!("failed to read response: {}", e) })?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        if bytes.is_empty() {
            return Err(Error::PageNotFound);
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url, status, bytes, headers })
    }

    /// Fetch a URL and decode it to text.
    ///
    /// Decodes the raw bytes when a charset can be resolved. Otherwise issues
    /// a second request and takes the client's default text decoding.
    pub async fn fetch_text(&self, url_str: &str) -> Result<DecodedPage, Error> {
        let response = self.fetch(url_str).await?;

        match charset::resolve(&response.headers, &response.bytes) {
            Some(encoding) => {
                tracing::debug!(url = %response.url, charset = encoding.name(), "decoding raw bytes");
                Ok(DecodedPage { text: charset::decode(encoding, &response.bytes), charset: Some(encoding.name()) })
            }
            None => {
                tracing::debug!(url = %response.url, "no charset declared, refetching as text");
                let text = self.fetch_decoded(&response.url).await?;
                Ok(DecodedPage { text, charset: None })
            }
        }
    }

    async fn fetch_decoded(&self, url: &Url) -> Result<String, Error> {
        let response = self.send(url).await?;

        response
            .text()
            .await
            .map_err(|e| Error::Upstream { status: None, message: format!("failed to read response: {}", e) })
    }

    /// Send a GET and reject non-2xx and oversized answers.
    async fn send(&self, url: &Url) -> Result<Response, Error> {
        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::Upstream { status: e.status().map(|s| s.as_u16()), message: e.to_string() })?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                message: format!("Response code {} ({})", status.as_u16(), status.canonical_reason().unwrap_or("Unknown")),
            });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        Ok(response)
    }
}
