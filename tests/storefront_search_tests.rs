//! End-to-end searches against canned storefront pages served by mockito
use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use supplement_scout_lib::application::{Aggregator, ResultQuery, SortKey};
use supplement_scout_lib::domain::{Store, StoreStatus};
use supplement_scout_lib::infrastructure::config::ScraperConfig;
use supplement_scout_lib::infrastructure::site_adapter::{SiteAdapter, StoreAdapter};
use supplement_scout_lib::infrastructure::stores::StoreProfile;

fn config() -> ScraperConfig {
    ScraperConfig {
        courtesy_delay_enabled: false,
        ..ScraperConfig::default()
    }
}

fn adapter(store: Store, server: &ServerGuard) -> Arc<dyn StoreAdapter> {
    let adapter = SiteAdapter::new(StoreProfile::for_store(store), &config())
        .unwrap()
        .with_origin(&server.url())
        .unwrap();
    Arc::new(adapter)
}

fn amazon_page() -> String {
    let card = |asin: &str, title: &str, whole: &str, fraction: &str| {
        format!(
            r#"<div data-asin="{asin}" class="s-result-item">
                 <h2><a class="a-link-normal" href="/dp/{asin}"><span class="a-text-normal">{title}</span></a></h2>
                 <span class="a-price"><span class="a-price-whole">{whole},</span><span class="a-price-fraction">{fraction}</span></span>
                 <img class="s-image" src="https://m.media-amazon.com/images/{asin}.jpg">
               </div>"#
        )
    };
    format!(
        "<html><body>{}{}{}{}{}{}</body></html>",
        card("B0A", "Gold Standard 100% Whey Optimum Nutrition", "349", "90"),
        card("B0A", "Gold Standard 100% Whey Optimum Nutrition", "349", "90"),
        card("B0B", "Creatina Monohidratada Black Skull", "89", "90"),
        card("B0C", "Whey Protein Sabor Baunilha", "0", "00"),
        card("B0D", "Iso Triple Zero Integral Medica", "1.199", "90"),
        card("B0E", "Pasta de Amendoim", "29", "90"),
    )
}

fn card_page(items: &[(&str, &str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(title, price, href)| {
            format!(
                r#"<div class="product-item">
                     <h2 class="product-name">{title}</h2>
                     <span class="price">{price}</span>
                     <img class="product-image" src="/media/{href}.png">
                     <a class="product-link" href="{href}">comprar</a>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

#[tokio::test]
async fn aggregates_valid_records_from_every_responding_store() {
    let mut amazon = Server::new_async().await;
    let _amazon = amazon
        .mock("GET", "/s")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("k".into(), "whey".into()),
            Matcher::UrlEncoded("i".into(), "drugstore".into()),
        ]))
        .with_body(amazon_page())
        .create_async()
        .await;

    let mut netshoes = Server::new_async().await;
    let _netshoes = netshoes
        .mock("GET", "/busca")
        .match_query(Matcher::UrlEncoded("q".into(), "whey".into()))
        .with_body(card_page(&[
            ("Whey Protein Isolado Dux Nutrition 900g", "R$ 219,90", "/dux-isolado"),
            ("Coqueteleira", "Indisponível", "/coqueteleira"),
            ("Whey 100% Pure Vitafor", "R$ 1.049,00", ""),
        ]))
        .create_async()
        .await;

    let mut panvel = Server::new_async().await;
    let _panvel = panvel
        .mock("GET", "/busca")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let aggregator = Aggregator::with_adapters(
        config(),
        vec![
            adapter(Store::Amazon, &amazon),
            adapter(Store::Netshoes, &netshoes),
            adapter(Store::Panvel, &panvel),
        ],
    )
    .unwrap();

    let report = aggregator.search("whey", 3).await;

    let amazon_outcome = report.outcomes.iter().find(|o| o.store == Store::Amazon).unwrap();
    assert_eq!(amazon_outcome.records.len(), 3);
    let amazon_links: Vec<_> = amazon_outcome.records.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(
        amazon_links,
        vec![
            format!("{}/dp/B0A", amazon.url()),
            format!("{}/dp/B0B", amazon.url()),
            format!("{}/dp/B0D", amazon.url()),
        ]
    );
    assert_eq!(amazon_outcome.records[0].brand, "Optimum Nutrition");
    assert!((amazon_outcome.records[2].price - 1199.90).abs() < 1e-9);

    let netshoes_outcome = report.outcomes.iter().find(|o| o.store == Store::Netshoes).unwrap();
    assert_eq!(
        netshoes_outcome.status,
        StoreStatus::Completed {
            candidates: 3,
            accepted: 1
        }
    );
    assert_eq!(netshoes_outcome.records[0].brand, "Dux Nutrition");

    assert_eq!(report.failed_stores(), vec![Store::Panvel]);

    let records = report.clone().into_records();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.price > 0.0 && !r.link.is_empty()));
    assert!(records.iter().all(|r| r.query_date == report.query_date));

    let cheapest_first = ResultQuery {
        sort: SortKey::PriceAsc,
        ..ResultQuery::default()
    }
    .apply(records);
    assert_eq!(cheapest_first[0].title, "Creatina Monohidratada Black Skull");
}

#[tokio::test]
async fn empty_result_when_no_store_has_listings() {
    let mut onofre = Server::new_async().await;
    let _onofre = onofre
        .mock("GET", "/busca")
        .match_query(Matcher::Any)
        .with_body("<html><body><h1>Sua busca não encontrou resultados</h1></body></html>")
        .create_async()
        .await;

    let mut raia = Server::new_async().await;
    let _raia = raia
        .mock("GET", "/busca")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let aggregator = Aggregator::with_adapters(
        config(),
        vec![adapter(Store::Onofre, &onofre), adapter(Store::DrogaRaia, &raia)],
    )
    .unwrap();

    assert!(aggregator.search_supplements("ômega 3", 5).await.is_empty());

    let report = aggregator.search("ômega 3", 5).await;
    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status.clone()).collect();
    assert_eq!(statuses[0], StoreStatus::NoListings);
    assert!(matches!(statuses[1], StoreStatus::Failed { .. }));
}
