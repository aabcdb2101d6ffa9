//! HTML parsing and text normalization for storefront listing pages
//!
//! Selector configuration, the listing parser, and the price and brand
//! normalizers every store adapter feeds its cards through.

pub mod brand;
pub mod config;
pub mod listing_parser;
pub mod price;

// Re-export public types
pub use super::parsing_error::{ScrapeError, ScrapeResult};
pub use brand::{UNKNOWN_BRAND, extract_brand, extract_brand_with_own_line};
pub use config::{ListingSelectors, PriceSelector};
pub use listing_parser::{Listing, ListingPage, ListingParser};
pub use price::{parse_price, try_parse_price};
