//! Filtering, sorting and summarizing a combined result list
//!
//! Works on whatever the aggregator returned; arrival order is irrelevant.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::{ProductRecord, Store};

/// Inclusive price bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Cheapest first
    #[default]
    PriceAsc,
    PriceDesc,
    TitleAsc,
    /// Store name, then cheapest first
    Store,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" | "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "title" => Ok(SortKey::TitleAsc),
            "store" => Ok(SortKey::Store),
            other => Err(format!(
                "unknown sort key '{other}' (expected price-asc, price-desc, title or store)"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::TitleAsc => "title",
            SortKey::Store => "store",
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultQuery {
    /// `None` keeps every store
    pub stores: Option<HashSet<Store>>,
    pub price_range: PriceRange,
    pub sort: SortKey,
}

impl ResultQuery {
    pub fn apply(&self, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        let mut kept: Vec<ProductRecord> = records
            .into_iter()
            .filter(|r| self.stores.as_ref().is_none_or(|stores| stores.contains(&r.store)))
            .filter(|r| self.price_range.contains(r.price))
            .collect();

        kept.sort_by(|a, b| compare(self.sort, a, b));
        kept
    }
}

/// Positive prices in the requested direction, non-positive ones last.
fn compare_price(a: f64, b: f64, descending: bool) -> Ordering {
    match (a > 0.0, b > 0.0) {
        (true, true) if descending => b.total_cmp(&a),
        (true, true) => a.total_cmp(&b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

fn compare(key: SortKey, a: &ProductRecord, b: &ProductRecord) -> Ordering {
    match key {
        SortKey::PriceAsc => compare_price(a.price, b.price, false),
        SortKey::PriceDesc => compare_price(a.price, b.price, true),
        SortKey::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Store => a
            .store
            .display_name()
            .cmp(b.store.display_name())
            .then_with(|| compare_price(a.price, b.price, false)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub store: Store,
    pub count: usize,
    pub min_price: f64,
    pub max_price: f64,
    pub average_price: f64,
}

/// Per-store counts and price statistics, ordered by store name.
pub fn summarize(records: &[ProductRecord]) -> Vec<StoreSummary> {
    let mut by_store: BTreeMap<&'static str, Vec<&ProductRecord>> = BTreeMap::new();
    for record in records {
        by_store.entry(record.store.display_name()).or_default().push(record);
    }

    by_store
        .into_values()
        .map(|group| {
            let prices: Vec<f64> = group.iter().map(|r| r.price).collect();
            let total: f64 = prices.iter().sum();
            StoreSummary {
                store: group[0].store,
                count: group.len(),
                min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
                max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                average_price: total / prices.len() as f64,
            }
        })
        .collect()
}
