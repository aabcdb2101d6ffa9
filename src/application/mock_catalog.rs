//! Offline sample data served for the `teste` query
//!
//! Lets the result pipeline and any UI be exercised without touching a
//! storefront.

use chrono::{DateTime, Utc};
use fastrand::Rng;

use crate::domain::{ProductRecord, Store};

/// Query that switches a search to the mock catalog.
pub const MOCK_QUERY: &str = "teste";

/// How many times the catalog is repeated in one mock result.
pub const REPLICAS: usize = 4;

/// Per-record price jitter, as a multiplier range.
pub const JITTER: (f64, f64) = (0.95, 1.05);

pub struct MockEntry {
    pub title: &'static str,
    pub price_range: (f64, f64),
    pub image_url: &'static str,
    pub link: &'static str,
    pub store: Store,
    pub brand: &'static str,
}

pub const CATALOG: &[MockEntry] = &[
    MockEntry {
        title: "Whey Protein Concentrado (1kg) - Growth Supplements",
        price_range: (80.0, 120.0),
        image_url: "https://via.placeholder.com/150?text=Growth+Whey",
        link: "https://www.gsuplementos.com.br/mock/whey-concentrado",
        store: Store::GrowthSuplementos,
        brand: "Growth Supplements",
    },
    MockEntry {
        title: "Creatina Monohidratada (250g) - Growth Supplements",
        price_range: (60.0, 90.0),
        image_url: "https://via.placeholder.com/150?text=Growth+Creatina",
        link: "https://www.gsuplementos.com.br/mock/creatina",
        store: Store::GrowthSuplementos,
        brand: "Growth Supplements",
    },
    MockEntry {
        title: "Iso Triple Zero (900g) - Integral Medica",
        price_range: (150.0, 220.0),
        image_url: "https://via.placeholder.com/150?text=Integral+Iso",
        link: "https://www.integralmedica.com.br/mock/iso-triple-zero",
        store: Store::IntegralMedica,
        brand: "Integral Medica",
    },
    MockEntry {
        title: "BCAA 2400 (100 Caps) - Integral Medica",
        price_range: (40.0, 70.0),
        image_url: "https://via.placeholder.com/150?text=Integral+BCAA",
        link: "https://www.integralmedica.com.br/mock/bcaa-2400",
        store: Store::IntegralMedica,
        brand: "Integral Medica",
    },
    MockEntry {
        title: "Gold Standard 100% Whey (907g) - Optimum Nutrition",
        price_range: (250.0, 350.0),
        image_url: "https://via.placeholder.com/150?text=Optimum+Whey",
        link: "https://www.amazon.com.br/mock/whey-gold-standard",
        store: Store::Amazon,
        brand: "Optimum Nutrition",
    },
    MockEntry {
        title: "Creatine Powder (300g) - Optimum Nutrition",
        price_range: (100.0, 150.0),
        image_url: "https://via.placeholder.com/150?text=Optimum+Creatine",
        link: "https://www.amazon.com.br/mock/creatine-powder",
        store: Store::Amazon,
        brand: "Optimum Nutrition",
    },
    MockEntry {
        title: "Whey Protein Isolado Dux Nutrition 900g",
        price_range: (180.0, 250.0),
        image_url: "https://via.placeholder.com/150?text=Dux+Whey",
        link: "https://www.netshoes.com.br/mock/dux-whey-isolado",
        store: Store::Netshoes,
        brand: "Dux Nutrition",
    },
    MockEntry {
        title: "Creatina Max Titanium 300g",
        price_range: (90.0, 130.0),
        image_url: "https://via.placeholder.com/150?text=Max+Creatina",
        link: "https://www.netshoes.com.br/mock/max-creatina",
        store: Store::Netshoes,
        brand: "Max Titanium",
    },
];

pub fn is_mock_query(query: &str) -> bool {
    query.trim().eq_ignore_ascii_case(MOCK_QUERY)
}

fn uniform(rng: &mut Rng, (low, high): (f64, f64)) -> f64 {
    low + (high - low) * rng.f64()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Catalog repeated [`REPLICAS`] times and shuffled. Each entry draws one
/// base price from its range; every copy then gets its own jitter.
pub fn mock_records(rng: &mut Rng, query_date: DateTime<Utc>) -> Vec<ProductRecord> {
    let base_prices: Vec<f64> = CATALOG.iter().map(|entry| uniform(rng, entry.price_range)).collect();

    let mut records: Vec<ProductRecord> = (0..REPLICAS)
        .flat_map(|_| CATALOG.iter().zip(&base_prices))
        .map(|(entry, base)| ProductRecord {
            title: entry.title.to_string(),
            price: *base,
            image_url: entry.image_url.to_string(),
            link: entry.link.to_string(),
            store: entry.store,
            brand: entry.brand.to_string(),
            query_date,
        })
        .collect();

    rng.shuffle(&mut records);
    for record in &mut records {
        record.price = round_cents(record.price * uniform(rng, JITTER));
    }

    records
}
