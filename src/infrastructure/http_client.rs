//! HTTP client for storefront search pages
//!
//! One client per store adapter, each with its own cookie jar and timeout.
//! Requests are single-shot: a failed call is final for that search.

use std::time::Duration;

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, PRAGMA, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, info, warn};
use url::Url;

use super::parsing_error::{ScrapeError, ScrapeResult};

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Browser client hints sent with the full header set
const CLIENT_HINTS: &[(&str, &str)] = &[
    ("sec-ch-ua", r#""Chromium";v="112", "Google Chrome";v="112", "Not:A-Brand";v="99""#),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""Windows""#),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("dnt", "1"),
];

/// How much of a real browser's request a store gets to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// User agent, accept headers, client hints and cache directives
    FullBrowser,
    /// User agent, accept headers and referer only
    Basic,
}

/// Read-only header material shared by every adapter in a search.
#[derive(Debug, Clone)]
pub struct HeaderPool {
    user_agents: Vec<HeaderValue>,
    accept_language: HeaderValue,
}

impl HeaderPool {
    /// Blank agents are dropped; a pool left empty is a configuration error.
    pub fn new(user_agents: &[String], accept_language: &str) -> ScrapeResult<Self> {
        let user_agents = user_agents
            .iter()
            .map(|agent| agent.trim())
            .filter(|agent| !agent.is_empty())
            .map(|agent| {
                HeaderValue::from_str(agent)
                    .map_err(|e| ScrapeError::configuration(format!("invalid user agent '{agent}': {e}")))
            })
            .collect::<ScrapeResult<Vec<_>>>()?;
        if user_agents.is_empty() {
            return Err(ScrapeError::configuration("user agent pool is empty"));
        }

        let accept_language = HeaderValue::from_str(accept_language)
            .map_err(|e| ScrapeError::configuration(format!("invalid accept-language '{accept_language}': {e}")))?;

        Ok(Self {
            user_agents,
            accept_language,
        })
    }

    /// A user agent picked uniformly from the pool.
    pub fn random_user_agent(&self) -> HeaderValue {
        self.user_agents[fastrand::usize(..self.user_agents.len())].clone()
    }

    /// Header set for one request against `referer`.
    pub fn headers_for(&self, style: HeaderStyle, referer: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.random_user_agent());
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());
        if let Ok(value) = HeaderValue::from_str(referer.as_str()) {
            headers.insert(REFERER, value);
        }

        if style == HeaderStyle::FullBrowser {
            headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
            for (name, value) in CLIENT_HINTS {
                headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
            }
        }

        headers
    }
}

/// Configuration for one store's HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_redirects: 5,
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    /// Optional context label for provenance in logs (the store name)
    context_label: Option<String>,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig) -> ScrapeResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ScrapeError::configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            context_label: None,
        })
    }

    /// Set a human-readable context label for logging provenance (returns self for chaining)
    #[must_use]
    pub fn with_context_label(mut self, label: &str) -> Self {
        self.context_label = Some(label.to_string());
        self
    }

    /// Single GET returning the body as a string (Send-compatible, parse afterwards).
    pub async fn fetch_html_string(&self, url: &Url, headers: HeaderMap) -> ScrapeResult<String> {
        let label = self.context_label.as_deref().unwrap_or("-");
        info!("🌐 HTTP GET [{}]: {}", label, url);

        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.classify(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("❌ HTTP error {} [{}]: {}", status, label, url);
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(url, &e)
            } else {
                ScrapeError::BodyRead {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!("Received {} bytes [{}] from {}", body.len(), label, url);
        Ok(body)
    }

    fn classify(&self, url: &Url, err: &reqwest::Error) -> ScrapeError {
        if err.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
                seconds: self.config.timeout.as_secs(),
            }
        } else {
            ScrapeError::network(url.as_str(), err)
        }
    }
}
