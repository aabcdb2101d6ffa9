//! Application layer module
//!
//! Multi-store search orchestration and the result pipeline that consumes
//! its output.

pub mod aggregator;
pub mod mock_catalog;
pub mod result_pipeline;

pub use aggregator::Aggregator;
pub use result_pipeline::{PriceRange, ResultQuery, SortKey, StoreSummary, summarize};
