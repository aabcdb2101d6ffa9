//! Search results page parser
//!
//! Extracts product cards from a storefront listing page with ordered
//! container fallbacks and per-field selector groups. Cards that miss a
//! required field or carry an unusable price are skipped, never reported.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};
use url::Url;

use super::config::{ListingSelectors, PriceSelector};
use super::price::{join_split_price, parse_price};
use super::{ScrapeError, ScrapeResult};

/// A validated product card, before store/brand enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub link: String,
}

/// What one listing page yielded.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Cards matched by the winning container selector
    pub candidates: usize,
    pub listings: Vec<Listing>,
}

enum CompiledPrice {
    Single(Selector),
    Split { whole: Selector, fraction: Selector },
}

/// Parser for one storefront's listing markup
pub struct ListingParser {
    /// (source text, compiled) pairs so failures can name the selector tried
    container_selectors: Vec<(String, Selector)>,
    title_selector: Selector,
    price_selector: CompiledPrice,
    image_selector: Selector,
    link_selector: Selector,
    item_id_attribute: Option<String>,
}

impl ListingParser {
    /// Compile a selector configuration.
    pub fn new(selectors: &ListingSelectors) -> ScrapeResult<Self> {
        let container_selectors = Self::compile_containers(&selectors.item_containers)?;

        let price_selector = match &selectors.price {
            PriceSelector::Single { selector } => CompiledPrice::Single(Self::compile(selector)?),
            PriceSelector::Split { whole, fraction } => CompiledPrice::Split {
                whole: Self::compile(whole)?,
                fraction: Self::compile(fraction)?,
            },
        };

        Ok(Self {
            container_selectors,
            title_selector: Self::compile(&selectors.title)?,
            price_selector,
            image_selector: Self::compile(&selectors.image)?,
            link_selector: Self::compile(&selectors.link)?,
            item_id_attribute: selectors.item_id_attribute.clone(),
        })
    }

    fn compile(selector: &str) -> ScrapeResult<Selector> {
        Selector::parse(selector).map_err(|e| ScrapeError::invalid_selector(selector, e))
    }

    /// Container fallbacks tolerate individual bad entries as long as one compiles.
    fn compile_containers(selector_strings: &[String]) -> ScrapeResult<Vec<(String, Selector)>> {
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push((selector_str.clone(), selector)),
                Err(e) => {
                    warn!("Failed to compile container selector '{}': {}", selector_str, e);
                    errors.push(format!("'{}': {}", selector_str, e));
                }
            }
        }

        if selectors.is_empty() {
            return Err(ScrapeError::invalid_selector(
                &selector_strings.join(" | "),
                format!("no container selector compiled ({})", errors.join(", ")),
            ));
        }

        Ok(selectors)
    }

    /// Parse a listing page, accepting at most `max_results` valid cards.
    ///
    /// Returns [`ScrapeError::NoListings`] when no container selector matches.
    pub fn parse(&self, document: &Html, origin: &Url, max_results: usize) -> ScrapeResult<ListingPage> {
        let mut tried_selectors = Vec::new();

        for (selector_str, selector) in &self.container_selectors {
            tried_selectors.push(selector_str.clone());

            let cards: Vec<ElementRef> = document.select(selector).collect();
            if cards.is_empty() {
                continue;
            }

            debug!("Found {} product cards using selector '{}'", cards.len(), selector_str);
            let listings = self.collect_listings(&cards, origin, max_results);
            return Ok(ListingPage {
                candidates: cards.len(),
                listings,
            });
        }

        Err(ScrapeError::NoListings { tried_selectors })
    }

    fn collect_listings(&self, cards: &[ElementRef], origin: &Url, max_results: usize) -> Vec<Listing> {
        let mut listings = Vec::new();
        let mut seen_ids = HashSet::new();

        for (index, card) in cards.iter().enumerate() {
            if listings.len() >= max_results {
                break;
            }

            let item_id = match &self.item_id_attribute {
                Some(attribute) => match card.value().attr(attribute).map(str::trim) {
                    Some(id) if !id.is_empty() && !seen_ids.contains(id) => Some(id.to_string()),
                    _ => {
                        trace!("Skipping card {}: missing or repeated {}", index, attribute);
                        continue;
                    }
                },
                None => None,
            };

            match self.extract_listing(card, origin) {
                Ok(listing) => {
                    if let Some(id) = item_id {
                        seen_ids.insert(id);
                    }
                    listings.push(listing);
                }
                Err(e) if e.is_candidate_level() => debug!("Skipping card {}: {}", index, e),
                Err(e) => warn!("Skipping card {}: {}", index, e),
            }
        }

        listings
    }

    /// Extract one card; any missing required field rejects the whole card.
    fn extract_listing(&self, card: &ElementRef, origin: &Url) -> ScrapeResult<Listing> {
        let title = Self::select_text(card, &self.title_selector)
            .ok_or_else(|| ScrapeError::required_field_missing("title"))?;

        let price_text = match &self.price_selector {
            CompiledPrice::Single(selector) => Self::select_text(card, selector),
            CompiledPrice::Split { whole, fraction } => {
                match (Self::select_text(card, whole), Self::select_text(card, fraction)) {
                    (Some(w), Some(f)) => Some(join_split_price(&w, &f)),
                    _ => None,
                }
            }
        }
        .ok_or_else(|| ScrapeError::required_field_missing("price"))?;

        let href = card
            .select(&self.link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or_else(|| ScrapeError::required_field_missing("link"))?;
        let link = resolve_url(origin, href)?;

        let price = parse_price(&price_text);
        if price <= 0.0 {
            return Err(ScrapeError::InvalidPrice { raw: price_text });
        }

        let image_url = card
            .select(&self.image_selector)
            .find_map(|img| image_source(&img))
            .map(|src| resolve_url(origin, &src).unwrap_or(src));

        Ok(Listing {
            title,
            price,
            image_url,
            link,
        })
    }

    /// Text of the first match, whitespace-collapsed; `None` when empty.
    fn select_text(card: &ElementRef, selector: &Selector) -> Option<String> {
        card.select(selector)
            .next()
            .map(|e| e.text().collect::<String>())
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| !text.is_empty())
    }
}

/// `src`, then `data-src`, skipping empty values.
fn image_source(img: &ElementRef) -> Option<String> {
    ["src", "data-src"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolve an href against the store origin.
pub fn resolve_url(origin: &Url, href: &str) -> ScrapeResult<String> {
    let resolved = origin
        .join(href)
        .map_err(|e| ScrapeError::url_resolution(href, format!("failed to join with {}: {}", origin, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved.to_string()),
        other => Err(ScrapeError::url_resolution(href, format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://www.gsuplementos.com.br").unwrap()
    }

    fn grid_page(cards: &str) -> Html {
        Html::parse_document(&format!("<html><body><div class=\"products-grid\">{}</div></body></html>", cards))
    }

    fn grid_card(title: &str, price: &str, href: &str) -> String {
        format!(
            r#"<div class="product-item">
                 <a class="product-item-link" href="{href}"><span class="product-name">{title}</span></a>
                 <span class="price">{price}</span>
                 <div class="product-image"><img data-src="/img/{title}.jpg"></div>
               </div>"#
        )
    }

    #[test]
    fn test_parser_creation() {
        assert!(ListingParser::new(&ListingSelectors::storefront_grid()).is_ok());
        assert!(ListingParser::new(&ListingSelectors::product_card()).is_ok());
        assert!(ListingParser::new(&ListingSelectors::amazon()).is_ok());
    }

    #[test]
    fn test_invalid_field_selector_is_rejected() {
        let mut selectors = ListingSelectors::product_card();
        selectors.title = "h2[".to_string();
        assert!(matches!(
            ListingParser::new(&selectors),
            Err(ScrapeError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_bad_container_fallback_is_tolerated() {
        let mut selectors = ListingSelectors::product_card();
        selectors.item_containers.insert(0, "div[".to_string());
        assert!(ListingParser::new(&selectors).is_ok());
    }

    #[test]
    fn test_url_resolution() {
        let origin = origin();
        assert_eq!(
            resolve_url(&origin, "/whey-protein").unwrap(),
            "https://www.gsuplementos.com.br/whey-protein"
        );
        assert_eq!(
            resolve_url(&origin, "https://other.com/test").unwrap(),
            "https://other.com/test"
        );
        assert_eq!(
            resolve_url(&origin, "relative/path").unwrap(),
            "https://www.gsuplementos.com.br/relative/path"
        );
        assert!(resolve_url(&origin, "javascript:void(0)").is_err());
    }

    #[test]
    fn test_extracts_and_resolves_cards() {
        let parser = ListingParser::new(&ListingSelectors::storefront_grid()).unwrap();
        let doc = grid_page(&grid_card("Whey Growth", "R$ 129,90", "/whey"));

        let page = parser.parse(&doc, &origin(), 5).unwrap();
        assert_eq!(page.listings.len(), 1);
        let listing = &page.listings[0];
        assert_eq!(listing.title, "Whey Growth");
        assert!((listing.price - 129.90).abs() < 1e-9);
        assert_eq!(listing.link, "https://www.gsuplementos.com.br/whey");
        assert_eq!(
            listing.image_url.as_deref(),
            Some("https://www.gsuplementos.com.br/img/Whey%20Growth.jpg")
        );
    }

    #[test]
    fn test_inline_markup_does_not_split_title_words() {
        let parser = ListingParser::new(&ListingSelectors::product_card()).unwrap();
        let doc = Html::parse_document(
            r#"<html><body><div class="product-card">
                 <h3 class="product-title">Creatina Max Ti<b>tanium</b>
                   300g</h3>
                 <span class="product-price">R$ <strong>89</strong>,90</span>
                 <a class="product-link" href="/creatina-max">ver</a>
               </div></body></html>"#,
        );

        let page = parser.parse(&doc, &origin(), 5).unwrap();
        let listing = &page.listings[0];
        assert_eq!(listing.title, "Creatina Max Titanium 300g");
        assert!((listing.price - 89.90).abs() < 1e-9);
        assert_eq!(crate::infrastructure::parsing::extract_brand(&listing.title), "Max Titanium");
    }

    #[test]
    fn test_invalid_cards_do_not_count_against_cap() {
        let parser = ListingParser::new(&ListingSelectors::storefront_grid()).unwrap();
        let cards = [
            grid_card("Gratis", "grátis", "/a"),
            grid_card("Sem link", "R$ 10,00", ""),
            grid_card("Creatina", "R$ 79,90", "/b"),
            grid_card("BCAA", "R$ 49,90", "/c"),
            grid_card("Glutamina", "R$ 59,90", "/d"),
        ]
        .concat();
        let doc = grid_page(&cards);

        let page = parser.parse(&doc, &origin(), 2).unwrap();
        assert_eq!(page.candidates, 5);
        let titles: Vec<_> = page.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Creatina", "BCAA"]);
        assert!(page.listings.iter().all(|l| l.price > 0.0 && !l.link.is_empty()));
    }

    #[test]
    fn test_no_matching_container_reports_tried_selectors() {
        let parser = ListingParser::new(&ListingSelectors::amazon()).unwrap();
        let doc = Html::parse_document("<html><body><p>Nenhum resultado</p></body></html>");
        let origin = Url::parse("https://www.amazon.com.br").unwrap();

        match parser.parse(&doc, &origin, 5) {
            Err(ScrapeError::NoListings { tried_selectors }) => assert_eq!(tried_selectors.len(), 3),
            other => panic!("expected NoListings, got {:?}", other),
        }
    }

    #[test]
    fn test_amazon_split_price_and_asin_dedup() {
        let card = |asin: &str, title: &str| {
            format!(
                r#"<div data-asin="{asin}" data-component-type="s-search-result">
                     <h2><span class="a-text-normal">{title}</span></h2>
                     <span class="a-price-whole">1.299,</span><span class="a-price-fraction">90</span>
                     <img class="s-image" src="https://m.media-amazon.com/{asin}.jpg">
                     <a class="a-link-normal" href="/dp/{asin}">ver</a>
                   </div>"#
            )
        };
        let html = format!(
            "<html><body>{}{}{}{}</body></html>",
            card("B01", "Gold Standard Whey"),
            card("B01", "Gold Standard Whey (repetido)"),
            card("", "Patrocinado"),
            card("B02", "Creatina Dux Nutrition"),
        );
        let doc = Html::parse_document(&html);
        let parser = ListingParser::new(&ListingSelectors::amazon()).unwrap();
        let origin = Url::parse("https://www.amazon.com.br").unwrap();

        let page = parser.parse(&doc, &origin, 10).unwrap();
        let links: Vec<_> = page.listings.iter().map(|l| l.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://www.amazon.com.br/dp/B01", "https://www.amazon.com.br/dp/B02"]
        );
        assert!((page.listings[0].price - 1299.90).abs() < 1e-9);
    }
}
