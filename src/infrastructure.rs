//! Infrastructure layer for HTTP access, HTML parsing and process setup
//!
//! Store adapters and their per-store profiles, the HTTP client and header
//! pool, the listing parser with its normalizers, configuration persistence
//! and logging.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod site_adapter;
pub mod stores;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, LoggingConfig, ScraperConfig};
pub use http_client::{HeaderPool, HeaderStyle, HttpClient};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{ListingParser, ListingSelectors, extract_brand, parse_price};
pub use parsing_error::{ScrapeError, ScrapeResult};
pub use site_adapter::{SearchContext, SiteAdapter, StoreAdapter};
pub use stores::StoreProfile;
