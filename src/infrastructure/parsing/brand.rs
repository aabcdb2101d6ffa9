//! Brand guessing from product titles

use once_cell::sync::Lazy;
use regex::Regex;

/// Returned when a title names no recognizable brand.
pub const UNKNOWN_BRAND: &str = "Marca Desconhecida";

/// Known brands in priority order; the first one found in a title wins.
pub const KNOWN_BRANDS: &[&str] = &[
    "Growth Supplements",
    "Integral Medica",
    "Max Titanium",
    "Dux Nutrition",
    "Optimum Nutrition",
    "Black Skull",
    "Probiotica",
    "Atlhetica Nutrition",
    "Vitafor",
    "Essential Nutrition",
];

/// Product words that look like brands when capitalized but never are.
pub const GENERIC_TERMS: &[&str] = &["whey", "creatina", "bcaa", "glutamina", "protein", "capsulas", "sabor"];

static KNOWN_BRANDS_LOWER: Lazy<Vec<(String, &'static str)>> =
    Lazy::new(|| KNOWN_BRANDS.iter().map(|b| (b.to_lowercase(), *b)).collect());

static CAPITALIZED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b").expect("static brand pattern"));

/// Best-effort brand for a listing title. Never fails.
pub fn extract_brand(title: &str) -> String {
    let title_lower = title.to_lowercase();
    if let Some((_, brand)) = KNOWN_BRANDS_LOWER
        .iter()
        .find(|(lower, _)| title_lower.contains(lower.as_str()))
    {
        return (*brand).to_string();
    }

    CAPITALIZED_RUN
        .captures_iter(title)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|run| !contains_generic_term(run))
        .map_or_else(|| UNKNOWN_BRAND.to_string(), |run| run.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Store-specific shortcut: if the title mentions `keyword`, the listing is
/// the store's own product line.
pub fn extract_brand_with_own_line(title: &str, keyword: &str, own_brand: &str) -> String {
    if title.to_lowercase().contains(&keyword.to_lowercase()) {
        own_brand.to_string()
    } else {
        extract_brand(title)
    }
}

fn contains_generic_term(run: &str) -> bool {
    run.split_whitespace()
        .any(|word| GENERIC_TERMS.contains(&word.to_lowercase().as_str()))
}
