//! The `teste` query never leaves the process
use std::collections::HashSet;

use supplement_scout_lib::application::mock_catalog::{CATALOG, REPLICAS};
use supplement_scout_lib::application::{Aggregator, PriceRange, ResultQuery, SortKey, summarize};
use supplement_scout_lib::domain::{Store, StoreStatus};
use supplement_scout_lib::infrastructure::config::ScraperConfig;

fn offline_config() -> ScraperConfig {
    // Short deadline: a real fan-out would show up as timed-out stores
    ScraperConfig {
        search_timeout_seconds: 1,
        ..ScraperConfig::default()
    }
}

#[tokio::test]
async fn mock_query_returns_catalog_in_any_case() {
    let aggregator = Aggregator::new(offline_config()).unwrap();

    for query in ["teste", "TESTE", " Teste "] {
        let records = aggregator.search_supplements(query, 5).await;
        assert_eq!(records.len(), CATALOG.len() * REPLICAS);

        let titles: HashSet<&str> = records.iter().map(|r| r.title.as_str()).collect();
        let catalog_titles: HashSet<&str> = CATALOG.iter().map(|e| e.title).collect();
        assert_eq!(titles, catalog_titles);
        assert!(records.iter().all(|r| r.is_valid()));
    }
}

#[tokio::test]
async fn mock_report_groups_by_store() {
    let aggregator = Aggregator::new(offline_config()).unwrap();
    let report = aggregator.search("teste", 5).await;

    assert!(report.mock);
    assert!(report.failed_stores().is_empty());
    for outcome in &report.outcomes {
        assert!(matches!(outcome.status, StoreStatus::Completed { .. }));
        assert!(outcome.records.iter().all(|r| r.store == outcome.store));
        assert!(outcome.records.iter().all(|r| r.query_date == report.query_date));
    }
}

#[tokio::test]
async fn pipeline_over_mock_results() {
    let aggregator = Aggregator::new(offline_config()).unwrap();
    let records = aggregator.search_supplements("teste", 5).await;

    let query = ResultQuery {
        stores: Some([Store::Netshoes].into_iter().collect()),
        price_range: PriceRange {
            min: Some(0.0),
            max: Some(200.0),
        },
        sort: SortKey::PriceDesc,
    };
    let filtered = query.apply(records);

    assert!(!filtered.is_empty());
    assert!(filtered.iter().all(|r| r.store == Store::Netshoes && r.price <= 200.0));
    assert!(filtered.windows(2).all(|w| w[0].price >= w[1].price));

    let summary = summarize(&filtered);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].count, filtered.len());
}
