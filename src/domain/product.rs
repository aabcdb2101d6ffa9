use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storefronts the scraper knows how to query.
///
/// Declaration order is the dispatch order used by the aggregator and the
/// order stores are listed in the command line help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Store {
    #[serde(rename = "Amazon")]
    Amazon,
    #[serde(rename = "Growth Suplementos")]
    GrowthSuplementos,
    #[serde(rename = "Integral Medica")]
    IntegralMedica,
    #[serde(rename = "Netshoes")]
    Netshoes,
    #[serde(rename = "Max Titanium")]
    MaxTitanium,
    #[serde(rename = "Atlhetica Nutrition")]
    AtlheticaNutrition,
    #[serde(rename = "Probiótica")]
    Probiotica,
    #[serde(rename = "Beleza na Web")]
    BelezaNaWeb,
    #[serde(rename = "Época Cosméticos")]
    EpocaCosmeticos,
    #[serde(rename = "Onofre")]
    Onofre,
    #[serde(rename = "Droga Raia")]
    DrogaRaia,
    #[serde(rename = "Panvel")]
    Panvel,
}

impl Store {
    pub const ALL: [Store; 12] = [
        Store::Amazon,
        Store::GrowthSuplementos,
        Store::IntegralMedica,
        Store::Netshoes,
        Store::MaxTitanium,
        Store::AtlheticaNutrition,
        Store::Probiotica,
        Store::BelezaNaWeb,
        Store::EpocaCosmeticos,
        Store::Onofre,
        Store::DrogaRaia,
        Store::Panvel,
    ];

    /// Human readable store name, also used as the filter value.
    pub fn display_name(self) -> &'static str {
        match self {
            Store::Amazon => "Amazon",
            Store::GrowthSuplementos => "Growth Suplementos",
            Store::IntegralMedica => "Integral Medica",
            Store::Netshoes => "Netshoes",
            Store::MaxTitanium => "Max Titanium",
            Store::AtlheticaNutrition => "Atlhetica Nutrition",
            Store::Probiotica => "Probiótica",
            Store::BelezaNaWeb => "Beleza na Web",
            Store::EpocaCosmeticos => "Época Cosméticos",
            Store::Onofre => "Onofre",
            Store::DrogaRaia => "Droga Raia",
            Store::Panvel => "Panvel",
        }
    }

    /// Short ascii key used on the command line (`growth`, `droga-raia`, ...)
    pub fn slug(self) -> &'static str {
        match self {
            Store::Amazon => "amazon",
            Store::GrowthSuplementos => "growth",
            Store::IntegralMedica => "integral-medica",
            Store::Netshoes => "netshoes",
            Store::MaxTitanium => "max-titanium",
            Store::AtlheticaNutrition => "atlhetica",
            Store::Probiotica => "probiotica",
            Store::BelezaNaWeb => "beleza-na-web",
            Store::EpocaCosmeticos => "epoca-cosmeticos",
            Store::Onofre => "onofre",
            Store::DrogaRaia => "droga-raia",
            Store::Panvel => "panvel",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Store {
    type Err = String;

    /// Accepts either the display name (case-insensitive) or the slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Store::ALL
            .iter()
            .copied()
            .find(|store| store.slug() == needle || store.display_name().to_lowercase() == needle)
            .ok_or_else(|| format!("unknown store '{}'", s.trim()))
    }
}

/// One normalized product listing scraped from a storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub link: String,
    pub store: Store,
    pub brand: String,
    pub query_date: DateTime<Utc>,
}

impl ProductRecord {
    /// Required-field check applied before a record leaves an adapter.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.link.trim().is_empty() && self.price > 0.0
    }
}
