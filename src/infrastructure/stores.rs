//! Per-store adapter profiles
//!
//! Everything that differs between storefronts lives here as data: where the
//! search page is, how to ask for it, how its markup is shaped, and the
//! store-specific brand and politeness rules. `SiteAdapter` runs the same
//! fetch/parse/validate path for all of them.

use std::time::Duration;

use crate::domain::Store;

use super::http_client::HeaderStyle;
use super::parsing::ListingSelectors;

/// Brand attributed to a listing whose title mentions the store's own line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnBrand {
    /// Lowercase title keyword
    pub keyword: &'static str,
    pub brand: &'static str,
}

/// Random pause taken after the request completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtesyDelay {
    pub min: Duration,
    pub max: Duration,
}

impl CourtesyDelay {
    /// Uniform draw in `[min, max]`.
    pub fn sample(&self) -> Duration {
        let span = self.max.saturating_sub(self.min).as_millis();
        let jitter = u64::try_from(span).unwrap_or(u64::MAX);
        self.min + Duration::from_millis(fastrand::u64(0..=jitter))
    }
}

#[derive(Debug, Clone)]
pub struct StoreProfile {
    pub store: Store,
    /// Scheme and host, no trailing path
    pub origin: String,
    pub search_path: &'static str,
    pub query_param: &'static str,
    /// Fixed parameters appended after the query
    pub extra_params: Vec<(&'static str, &'static str)>,
    pub header_style: HeaderStyle,
    pub timeout: Duration,
    pub selectors: ListingSelectors,
    pub own_brand: Option<OwnBrand>,
    pub courtesy_delay: Option<CourtesyDelay>,
}

const POLITE_PAUSE: CourtesyDelay = CourtesyDelay {
    min: Duration::from_secs(3),
    max: Duration::from_secs(5),
};

impl StoreProfile {
    pub fn for_store(store: Store) -> Self {
        match store {
            Store::Amazon => Self {
                extra_params: vec![("i", "drugstore"), ("rh", "n:16210003011")],
                header_style: HeaderStyle::FullBrowser,
                timeout: Duration::from_secs(15),
                selectors: ListingSelectors::amazon(),
                search_path: "/s",
                query_param: "k",
                ..Self::card_store(store, "https://www.amazon.com.br")
            },
            Store::GrowthSuplementos => Self {
                header_style: HeaderStyle::FullBrowser,
                timeout: Duration::from_secs(15),
                selectors: ListingSelectors::storefront_grid(),
                own_brand: Some(OwnBrand {
                    keyword: "growth",
                    brand: "Growth Suplementos",
                }),
                ..Self::card_store(store, "https://www.gsuplementos.com.br")
            },
            Store::IntegralMedica => Self::card_store(store, "https://www.integralmedica.com.br"),
            Store::Netshoes => Self::card_store(store, "https://www.netshoes.com.br"),
            Store::MaxTitanium => Self {
                timeout: Duration::from_secs(10),
                ..Self::card_store(store, "https://www.maxtitanium.com.br")
            },
            Store::AtlheticaNutrition => Self {
                timeout: Duration::from_secs(15),
                selectors: ListingSelectors::storefront_grid(),
                own_brand: Some(OwnBrand {
                    keyword: "atlhetica",
                    brand: "Atlhetica",
                }),
                courtesy_delay: Some(POLITE_PAUSE),
                ..Self::card_store(store, "https://www.atlheticanutrition.com.br")
            },
            Store::Probiotica => Self {
                timeout: Duration::from_secs(15),
                selectors: ListingSelectors::storefront_grid(),
                own_brand: Some(OwnBrand {
                    keyword: "probiótica",
                    brand: "Probiótica",
                }),
                courtesy_delay: Some(POLITE_PAUSE),
                ..Self::card_store(store, "https://www.probiotica.com.br")
            },
            Store::BelezaNaWeb => Self::card_store(store, "https://www.belezanaweb.com.br"),
            Store::EpocaCosmeticos => Self::card_store(store, "https://www.epocacosmeticos.com.br"),
            Store::Onofre => Self::card_store(store, "https://www.onofre.com.br"),
            Store::DrogaRaia => Self::card_store(store, "https://www.drogaraia.com.br"),
            Store::Panvel => Self::card_store(store, "https://www.panvel.com"),
        }
    }

    /// Profiles for every store, in dispatch order.
    pub fn all() -> Vec<Self> {
        Store::ALL.iter().copied().map(Self::for_store).collect()
    }

    /// `/busca?q=` shops with the shared product-card markup
    fn card_store(store: Store, origin: &str) -> Self {
        Self {
            store,
            origin: origin.to_string(),
            search_path: "/busca",
            query_param: "q",
            extra_params: Vec::new(),
            header_style: HeaderStyle::Basic,
            timeout: Duration::from_secs(5),
            selectors: ListingSelectors::product_card(),
            own_brand: None,
            courtesy_delay: None,
        }
    }

    /// Longest a call can legitimately take, request plus courtesy pause.
    pub fn time_budget(&self, courtesy_delay_enabled: bool) -> Duration {
        match self.courtesy_delay {
            Some(delay) if courtesy_delay_enabled => self.timeout + delay.max,
            _ => self.timeout,
        }
    }
}
