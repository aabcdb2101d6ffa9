//! Supplement Scout - multi-store product listing aggregator
//!
//! Searches Brazilian supplement, pharmacy and cosmetics storefronts
//! concurrently, normalizes every listing into a [`domain::ProductRecord`]
//! and returns one combined list for filtering and sorting.

// Module declarations
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use application::Aggregator;
pub use domain::{ProductRecord, SearchReport, Store, StoreOutcome, StoreStatus};
