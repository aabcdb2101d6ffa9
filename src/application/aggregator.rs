//! Multi-store search
//!
//! Fans a query out to every enabled store adapter at once, bounded by a
//! semaphore, a per-store time budget and a search-wide deadline, then joins
//! the outcomes into one [`SearchReport`].

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::domain::{ProductRecord, SearchReport, Store, StoreOutcome};
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::http_client::HeaderPool;
use crate::infrastructure::site_adapter::{SearchContext, SiteAdapter, StoreAdapter};

use super::mock_catalog;

pub struct Aggregator {
    config: ScraperConfig,
    headers: Arc<HeaderPool>,
    adapters: Vec<Arc<dyn StoreAdapter>>,
}

impl Aggregator {
    /// Aggregator over the built-in HTML adapters, one per store.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let adapters = SiteAdapter::all(&config)
            .context("Failed to build store adapters")?
            .into_iter()
            .map(|adapter| Arc::new(adapter) as Arc<dyn StoreAdapter>)
            .collect();
        Self::with_adapters(config, adapters)
    }

    /// Aggregator over caller-supplied adapters, dispatched in the given order.
    pub fn with_adapters(config: ScraperConfig, adapters: Vec<Arc<dyn StoreAdapter>>) -> Result<Self> {
        config.validate().context("Invalid scraper configuration")?;
        let headers = HeaderPool::new(&config.user_agents, &config.accept_language)
            .context("Invalid request header configuration")?;

        Ok(Self {
            config,
            headers: Arc::new(headers),
            adapters,
        })
    }

    /// Combined records for `query`, at most `max_results` per store.
    ///
    /// An empty list is a normal outcome: nothing matched, or every store failed.
    pub async fn search_supplements(&self, query: &str, max_results: usize) -> Vec<ProductRecord> {
        let report = self.search(query, max_results).await;
        let mock = report.mock;
        let mut records = report.into_records();
        if mock {
            fastrand::shuffle(&mut records);
        }
        records
    }

    /// Per-store outcomes for `query`.
    pub async fn search(&self, query: &str, max_results: usize) -> SearchReport {
        let search_id = Uuid::new_v4();
        let span = info_span!("search", %search_id, query = %query.trim());
        self.run_search(search_id, query, max_results).instrument(span).await
    }

    async fn run_search(&self, search_id: Uuid, query: &str, max_results: usize) -> SearchReport {
        let query_date = Utc::now();
        let mut report = SearchReport {
            search_id,
            query: query.trim().to_string(),
            query_date,
            mock: false,
            outcomes: Vec::new(),
        };

        if mock_catalog::is_mock_query(query) {
            info!("Mock query - serving the sample catalog");
            report.mock = true;
            report.outcomes = mock_outcomes(mock_catalog::mock_records(&mut fastrand::Rng::new(), query_date));
            return report;
        }

        if report.query.is_empty() {
            warn!("Empty query - no store queried");
            return report;
        }

        info!("Searching {} stores, up to {} results each", self.adapters.len(), max_results);
        let started = Instant::now();
        let ctx = Arc::new(SearchContext::with_headers(&self.config, Arc::clone(&self.headers), query_date));
        report.outcomes = self.fan_out(&report.query, max_results, ctx).await;

        let failed = report.failed_stores();
        if failed.is_empty() {
            info!("Search finished in {:?}: {} products", started.elapsed(), report.total_records());
        } else {
            warn!(
                "Search finished in {:?}: {} products, {} stores failed ({})",
                started.elapsed(),
                report.total_records(),
                failed.len(),
                failed.iter().map(|store| store.display_name()).collect::<Vec<_>>().join(", ")
            );
        }
        if report.total_records() == 0 {
            warn!("No products found in any store");
        }

        report
    }

    async fn fan_out(&self, query: &str, max_results: usize, ctx: Arc<SearchContext>) -> Vec<StoreOutcome> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(self.config.search_timeout_seconds);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_stores));

        let mut outcomes = Vec::with_capacity(self.adapters.len());
        let mut tasks = Vec::new();
        let mut dispatched = Vec::new();

        for adapter in &self.adapters {
            let store = adapter.store();
            if !self.config.is_enabled(store) {
                outcomes.push(StoreOutcome::skipped(store));
                continue;
            }

            let adapter = Arc::clone(adapter);
            let semaphore = Arc::clone(&semaphore);
            let ctx = Arc::clone(&ctx);
            let query = query.to_string();
            let span = info_span!("store", store = %store);

            dispatched.push(store);
            tasks.push(tokio::spawn(
                async move {
                    let started = Instant::now();
                    let run = async {
                        // Held until the adapter call returns
                        let _permit = semaphore.acquire().await;
                        let budget = adapter.time_budget(&ctx);
                        match tokio::time::timeout(budget, adapter.search(&query, max_results, &ctx)).await {
                            Ok(outcome) => outcome,
                            Err(_) => {
                                warn!("⏱️ {} exceeded its {:?} budget", store, budget);
                                StoreOutcome::timed_out(store, started.elapsed())
                            }
                        }
                    };

                    tokio::time::timeout_at(deadline, run).await.unwrap_or_else(|_| {
                        warn!("⏱️ {} cut off by the search deadline", store);
                        StoreOutcome::timed_out(store, started.elapsed())
                    })
                }
                .instrument(span),
            ));
        }

        for (store, joined) in dispatched.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Store task for {} failed: {}", store, e);
                    outcomes.push(StoreOutcome::failed(store, format!("task failed: {}", e), Duration::ZERO));
                }
            }
        }

        outcomes
    }
}

/// Mock records grouped into one completed outcome per store.
fn mock_outcomes(records: Vec<ProductRecord>) -> Vec<StoreOutcome> {
    let mut grouped: Vec<(Store, Vec<ProductRecord>)> = Vec::new();
    for record in records {
        match grouped.iter_mut().find(|(store, _)| *store == record.store) {
            Some((_, group)) => group.push(record),
            None => grouped.push((record.store, vec![record])),
        }
    }

    grouped
        .into_iter()
        .map(|(store, records)| {
            let candidates = records.len();
            StoreOutcome::completed(store, records, candidates, Duration::ZERO)
        })
        .collect()
}
