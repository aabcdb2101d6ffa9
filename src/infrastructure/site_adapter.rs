//! Store adapters
//!
//! [`StoreAdapter`] is the seam the aggregator fans out over. [`SiteAdapter`]
//! is the one HTML implementation, driven by a [`StoreProfile`]: build the
//! search URL, fetch once, parse the listing page, enrich each card into a
//! [`ProductRecord`]. Every failure is folded into the returned
//! [`StoreOutcome`].

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{ProductRecord, Store, StoreOutcome};

use super::config::ScraperConfig;
use super::http_client::{HeaderPool, HttpClient, HttpClientConfig};
use super::parsing::{ListingParser, ScrapeError, ScrapeResult, extract_brand, extract_brand_with_own_line};
use super::stores::StoreProfile;

/// Read-only inputs shared by every adapter call of one search.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Captured once per search, stamped on every record
    pub query_date: DateTime<Utc>,
    pub headers: Arc<HeaderPool>,
    pub placeholder_image_url: String,
    pub courtesy_delay_enabled: bool,
}

impl SearchContext {
    pub fn with_headers(config: &ScraperConfig, headers: Arc<HeaderPool>, query_date: DateTime<Utc>) -> Self {
        Self {
            query_date,
            headers,
            placeholder_image_url: config.placeholder_image_url.clone(),
            courtesy_delay_enabled: config.courtesy_delay_enabled,
        }
    }

    pub fn from_config(config: &ScraperConfig, query_date: DateTime<Utc>) -> ScrapeResult<Self> {
        let headers = HeaderPool::new(&config.user_agents, &config.accept_language)?;
        Ok(Self::with_headers(config, Arc::new(headers), query_date))
    }
}

/// One storefront the aggregator can query.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    fn store(&self) -> Store;

    /// Longest a `search` call should take before the caller gives up on it.
    fn time_budget(&self, ctx: &SearchContext) -> Duration;

    /// Query the store. Never fails: errors become the outcome's status.
    async fn search(&self, query: &str, max_results: usize, ctx: &SearchContext) -> StoreOutcome;
}

pub struct SiteAdapter {
    profile: StoreProfile,
    origin: Url,
    client: HttpClient,
    parser: ListingParser,
}

impl SiteAdapter {
    pub fn new(profile: StoreProfile, config: &ScraperConfig) -> ScrapeResult<Self> {
        let origin = Url::parse(&profile.origin).map_err(|e| ScrapeError::url_resolution(&profile.origin, e))?;
        let client = HttpClient::with_config(HttpClientConfig {
            timeout: profile.timeout,
            max_redirects: config.max_redirects,
        })?
        .with_context_label(profile.store.display_name());
        let parser = ListingParser::new(&profile.selectors)?;

        Ok(Self {
            profile,
            origin,
            client,
            parser,
        })
    }

    /// Adapters for every known store, in dispatch order.
    pub fn all(config: &ScraperConfig) -> ScrapeResult<Vec<Self>> {
        StoreProfile::all()
            .into_iter()
            .map(|profile| Self::new(profile, config))
            .collect()
    }

    /// Point the adapter at another host, keeping paths and selectors.
    pub fn with_origin(mut self, origin: &str) -> ScrapeResult<Self> {
        self.origin = Url::parse(origin).map_err(|e| ScrapeError::url_resolution(origin, e))?;
        self.profile.origin = origin.to_string();
        Ok(self)
    }

    /// `origin + search_path ? query_param=<query> & extra params`
    pub fn search_url(&self, query: &str) -> ScrapeResult<Url> {
        let mut url = self
            .origin
            .join(self.profile.search_path)
            .map_err(|e| ScrapeError::url_resolution(self.profile.search_path, e))?;
        url.query_pairs_mut()
            .append_pair(self.profile.query_param, query.trim())
            .extend_pairs(self.profile.extra_params.iter().copied());
        Ok(url)
    }

    fn brand_for(&self, title: &str) -> String {
        match &self.profile.own_brand {
            Some(own) => extract_brand_with_own_line(title, own.keyword, own.brand),
            None => extract_brand(title),
        }
    }

    /// Parse a fetched page into records. Synchronous so the `!Send` document
    /// never lives across an await point.
    fn extract_records(&self, body: &str, max_results: usize, ctx: &SearchContext) -> ScrapeResult<(usize, Vec<ProductRecord>)> {
        let document = Html::parse_document(body);
        let page = self.parser.parse(&document, &self.origin, max_results)?;

        let records = page
            .listings
            .into_iter()
            .map(|listing| ProductRecord {
                brand: self.brand_for(&listing.title),
                title: listing.title,
                price: listing.price,
                image_url: listing
                    .image_url
                    .unwrap_or_else(|| ctx.placeholder_image_url.clone()),
                link: listing.link,
                store: self.profile.store,
                query_date: ctx.query_date,
            })
            .filter(ProductRecord::is_valid)
            .collect();

        Ok((page.candidates, records))
    }

    /// Network trouble and markup trouble fail the store alike; only the log differs.
    fn failure(&self, error: ScrapeError, started: Instant) -> StoreOutcome {
        let store = self.profile.store;
        if error.is_network() {
            warn!("❌ {} unreachable: {}", store, error);
        } else {
            warn!("❌ {} returned an unusable page: {}", store, error);
        }
        StoreOutcome::failed(store, error.to_string(), started.elapsed())
    }

    async fn courtesy_pause(&self, ctx: &SearchContext) {
        if !ctx.courtesy_delay_enabled {
            return;
        }
        if let Some(delay) = self.profile.courtesy_delay {
            let pause = delay.sample();
            debug!("Courtesy pause of {:?} after {}", pause, self.profile.store);
            tokio::time::sleep(pause).await;
        }
    }
}

#[async_trait]
impl StoreAdapter for SiteAdapter {
    fn store(&self) -> Store {
        self.profile.store
    }

    fn time_budget(&self, ctx: &SearchContext) -> Duration {
        self.profile.time_budget(ctx.courtesy_delay_enabled)
    }

    async fn search(&self, query: &str, max_results: usize, ctx: &SearchContext) -> StoreOutcome {
        let store = self.profile.store;
        let started = Instant::now();

        let url = match self.search_url(query) {
            Ok(url) => url,
            Err(e) => {
                warn!("❌ {}: could not build search URL: {}", store, e);
                return StoreOutcome::failed(store, e.to_string(), started.elapsed());
            }
        };

        let headers = ctx.headers.headers_for(self.profile.header_style, &self.origin);
        let fetched = self.client.fetch_html_string(&url, headers).await;
        self.courtesy_pause(ctx).await;

        let body = match fetched {
            Ok(body) => body,
            Err(e) => return self.failure(e, started),
        };

        match self.extract_records(&body, max_results, ctx) {
            Ok((candidates, records)) => {
                info!(
                    "✅ {}: {} products accepted from {} candidates",
                    store,
                    records.len(),
                    candidates
                );
                StoreOutcome::completed(store, records, candidates, started.elapsed())
            }
            Err(e @ ScrapeError::NoListings { .. }) => {
                warn!("⚠️ {}: {}", store, e);
                StoreOutcome::no_listings(store, started.elapsed())
            }
            Err(e) => self.failure(e, started),
        }
    }
}
