//! Selector configuration for storefront listing pages
//!
//! Each field holds a CSS selector group (comma separated alternatives are
//! allowed, matching the first element in document order).

use serde::{Deserialize, Serialize};

/// CSS selectors for one storefront's search results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Product card containers - ordered fallbacks, the first that matches anything wins
    pub item_containers: Vec<String>,

    /// Product title inside a card
    pub title: String,

    /// Where the price lives inside a card
    pub price: PriceSelector,

    /// Product image inside a card (optional field)
    pub image: String,

    /// Link to the product page
    pub link: String,

    /// Container attribute holding a site item id, used to drop repeated cards
    #[serde(default)]
    pub item_id_attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum PriceSelector {
    /// Whole price text in one element
    Single { selector: String },
    /// Integer and cents rendered in separate elements (Amazon)
    Split { whole: String, fraction: String },
}

impl ListingSelectors {
    /// Generic storefront layout shared by the VTEX/Magento style shops
    /// (Growth, Atlhetica, Probiótica).
    pub fn storefront_grid() -> Self {
        Self {
            item_containers: vec![
                ".product-item, .item.product, .product, .products-grid .item, .product-list .item".to_string(),
            ],
            title: ".product-name, .product-item-name, .name, .product-title".to_string(),
            price: PriceSelector::Single {
                selector: ".price, .product-price, .price-box, .price-value".to_string(),
            },
            image: ".product-image img, .product-image-photo, img.product-image, .product-image".to_string(),
            link: "a.product-item-link, a.product-item__link, a.product, a.product-link".to_string(),
            item_id_attribute: None,
        }
    }

    /// Card layout shared by the pharmacy and cosmetics shops and the
    /// remaining supplement brands.
    pub fn product_card() -> Self {
        Self {
            item_containers: vec!["div.product-item, div.item-product, div.product-card".to_string()],
            title: "h2.product-name, h3.product-title, a.product-name".to_string(),
            price: PriceSelector::Single {
                selector: "span.price, div.price-box, span.product-price".to_string(),
            },
            image: "img.product-image, img.product-img, img.lazy".to_string(),
            link: "a.product-link, a.product-item-link".to_string(),
            item_id_attribute: None,
        }
    }

    /// Amazon search results
    pub fn amazon() -> Self {
        Self {
            item_containers: vec![
                r#"div[data-asin]:not([data-asin=""])"#.to_string(),
                ".s-result-item".to_string(),
                r#"div[data-component-type="s-search-result"]"#.to_string(),
            ],
            title: "h2 span.a-text-normal, h2.a-size-medium, .a-text-normal".to_string(),
            price: PriceSelector::Split {
                whole: "span.a-price-whole, .a-price-whole".to_string(),
                fraction: "span.a-price-fraction, .a-price-fraction".to_string(),
            },
            image: "img.s-image, .s-image".to_string(),
            link: r#"a.a-link-normal[href*="/dp/"], a[href*="/dp/"]"#.to_string(),
            item_id_attribute: Some("data-asin".to_string()),
        }
    }
}
