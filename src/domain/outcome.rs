//! Typed results of one store call and of one aggregated search.
//!
//! Adapters never propagate errors to the aggregator; they fold them into a
//! [`StoreStatus`] so callers can still tell "nothing found" apart from
//! "request failed" when looking at a [`SearchReport`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use super::product::{ProductRecord, Store};

/// How a single store call ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreStatus {
    /// Listing page parsed; `candidates` item nodes were inspected.
    Completed { candidates: usize, accepted: usize },
    /// Page fetched but none of the container selectors matched.
    NoListings,
    /// Network, HTTP status or setup failure.
    Failed { reason: String },
    /// The call did not finish before its deadline.
    TimedOut,
    /// Store is disabled in configuration or bypassed (mock mode).
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreOutcome {
    pub store: Store,
    pub records: Vec<ProductRecord>,
    pub status: StoreStatus,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl StoreOutcome {
    pub fn completed(store: Store, records: Vec<ProductRecord>, candidates: usize, elapsed: Duration) -> Self {
        let accepted = records.len();
        Self {
            store,
            records,
            status: StoreStatus::Completed { candidates, accepted },
            elapsed,
        }
    }

    pub fn no_listings(store: Store, elapsed: Duration) -> Self {
        Self {
            store,
            records: Vec::new(),
            status: StoreStatus::NoListings,
            elapsed,
        }
    }

    pub fn failed(store: Store, reason: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            store,
            records: Vec::new(),
            status: StoreStatus::Failed { reason: reason.into() },
            elapsed,
        }
    }

    pub fn timed_out(store: Store, elapsed: Duration) -> Self {
        Self {
            store,
            records: Vec::new(),
            status: StoreStatus::TimedOut,
            elapsed,
        }
    }

    pub fn skipped(store: Store) -> Self {
        Self {
            store,
            records: Vec::new(),
            status: StoreStatus::Skipped,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, StoreStatus::Failed { .. } | StoreStatus::TimedOut)
    }
}

/// Everything one `search` call produced, per store.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub search_id: Uuid,
    pub query: String,
    pub query_date: DateTime<Utc>,
    pub mock: bool,
    pub outcomes: Vec<StoreOutcome>,
}

impl SearchReport {
    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|o| o.records.len()).sum()
    }

    pub fn failed_stores(&self) -> Vec<Store> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failure())
            .map(|o| o.store)
            .collect()
    }

    /// Flattens the per-store outcomes into the combined record list.
    pub fn into_records(self) -> Vec<ProductRecord> {
        self.outcomes.into_iter().flat_map(|o| o.records).collect()
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flattens_records_and_lists_failures() {
        let now = Utc::now();
        let record = ProductRecord {
            title: "Creatina".to_string(),
            price: 79.9,
            image_url: String::new(),
            link: "https://example.com/creatina".to_string(),
            store: Store::Netshoes,
            brand: "Marca Desconhecida".to_string(),
            query_date: now,
        };
        let report = SearchReport {
            search_id: Uuid::new_v4(),
            query: "creatina".to_string(),
            query_date: now,
            mock: false,
            outcomes: vec![
                StoreOutcome::completed(Store::Netshoes, vec![record], 3, Duration::from_millis(20)),
                StoreOutcome::failed(Store::Amazon, "HTTP 503", Duration::from_millis(5)),
                StoreOutcome::timed_out(Store::Panvel, Duration::from_secs(15)),
                StoreOutcome::no_listings(Store::Onofre, Duration::from_millis(8)),
            ],
        };

        assert_eq!(report.total_records(), 1);
        assert_eq!(report.failed_stores(), vec![Store::Amazon, Store::Panvel]);
        assert_eq!(report.into_records().len(), 1);
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let json = serde_json::to_value(StoreStatus::Completed { candidates: 4, accepted: 2 }).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["accepted"], 2);
    }
}
