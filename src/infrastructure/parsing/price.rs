//! Price text normalization
//!
//! Storefront prices arrive as Brazilian-formatted text (`R$ 1.234,56`,
//! `89,90`, `por R$ 59,90 no Pix`). Everything except digits and commas is
//! dropped before conversion, so currency symbols, thousands dots and labels
//! never reach the float parser.

use tracing::trace;

use super::{ScrapeError, ScrapeResult};

/// Parses a price, returning `0.0` for anything unusable.
///
/// Callers treat `0.0` as "invalid, discard"; this function never fails.
pub fn parse_price(text: &str) -> f64 {
    match try_parse_price(text) {
        Ok(price) => price,
        Err(e) => {
            trace!("{}", e);
            0.0
        }
    }
}

/// Strict variant of [`parse_price`] that reports why conversion failed.
pub fn try_parse_price(text: &str) -> ScrapeResult<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    // With several separators left, only the last one is decimal.
    let normalized = match cleaned.rsplit_once('.') {
        Some((head, tail)) if head.contains('.') => format!("{}.{}", head.replace('.', ""), tail),
        _ => cleaned,
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| ScrapeError::InvalidPrice {
            raw: text.to_string(),
        })
}

/// Joins Amazon-style split prices (`<span>1.234,</span><span>56</span>`).
pub fn join_split_price(whole: &str, fraction: &str) -> String {
    format!("{}{}", whole.trim(), fraction.trim())
}
