//! Domain module - product records and search outcomes
//!
//! The twelve storefronts, the normalized record every adapter emits, and
//! the per-store outcome report a search produces.

pub mod outcome;
pub mod product;

pub use outcome::{SearchReport, StoreOutcome, StoreStatus};
pub use product::{ProductRecord, Store};
