//! Scraping error types
//!
//! Every failure a store adapter can hit, from the HTTP layer down to a single
//! listing card. None of these escape an adapter: they are logged and folded
//! into a `StoreStatus`, or cause one candidate to be skipped.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {message}")]
    BodyRead { url: String, message: String },

    #[error("No listings found; tried selectors: {}", tried_selectors.join(" | "))]
    NoListings { tried_selectors: Vec<String> },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Required field '{field}' not found in listing card")]
    RequiredFieldMissing { field: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolution { url: String, reason: String },

    #[error("Unusable price '{raw}'")]
    InvalidPrice { raw: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ScrapeError {
    pub fn network(url: &str, err: &reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn required_field_missing(field: &str) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn url_resolution(url: &str, reason: impl ToString) -> Self {
        Self::UrlResolution {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Failures that happened before any HTML was seen.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. } | Self::BodyRead { .. }
        )
    }

    /// Failures scoped to one listing card; the adapter skips the card and moves on.
    pub fn is_candidate_level(&self) -> bool {
        matches!(
            self,
            Self::RequiredFieldMissing { .. } | Self::UrlResolution { .. } | Self::InvalidPrice { .. }
        )
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
