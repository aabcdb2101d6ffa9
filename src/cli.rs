//! Command line host
//!
//! Runs one search and prints the filtered, sorted result list as a text
//! table or JSON on stdout. Logs go to stderr.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use crate::application::{Aggregator, PriceRange, ResultQuery, SortKey, StoreSummary, summarize};
use crate::domain::{ProductRecord, SearchReport, Store};
use crate::infrastructure::config::{AppConfig, ConfigManager};

#[derive(Parser, Debug)]
#[command(name = "supplement-scout")]
#[command(about = "Search Brazilian supplement stores and compare listings")]
#[command(version)]
pub struct Cli {
    /// Search term; `teste` serves offline sample data
    pub query: String,

    #[arg(short = 'n', long, help = "Maximum results per store [default: from config]")]
    pub max_results: Option<usize>,

    #[arg(short, long = "store", value_name = "NAME", help = "Only keep these stores (slug or name, repeatable)")]
    pub stores: Vec<Store>,

    #[arg(long, help = "Lowest price to keep, inclusive")]
    pub min_price: Option<f64>,

    #[arg(long, help = "Highest price to keep, inclusive")]
    pub max_price: Option<f64>,

    #[arg(long, default_value_t = SortKey::PriceAsc, help = "price-asc, price-desc, title or store")]
    pub sort: SortKey,

    #[arg(long, help = "Print JSON instead of a table")]
    pub json: bool,

    #[arg(long, value_name = "PATH", help = "Configuration file [default: user config directory]")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn result_query(&self) -> Result<ResultQuery> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                bail!("--min-price ({}) is greater than --max-price ({})", min, max);
            }
        }

        Ok(ResultQuery {
            stores: (!self.stores.is_empty()).then(|| self.stores.iter().copied().collect::<HashSet<_>>()),
            price_range: PriceRange {
                min: self.min_price,
                max: self.max_price,
            },
            sort: self.sort,
        })
    }

    pub async fn load_config(&self) -> Result<AppConfig> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new()?,
        };
        manager.load_config().await
    }
}

/// JSON document printed with `--json`
#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub report: &'a SearchReport,
    pub results: &'a [ProductRecord],
    pub summary: Vec<StoreSummary>,
}

/// Search, filter and render. Returns the text written to stdout.
pub async fn run(cli: &Cli, config: &AppConfig) -> Result<String> {
    let query = cli.result_query()?;
    let max_results = cli.max_results.unwrap_or(config.scraper.max_results_per_store);

    let aggregator = Aggregator::new(config.scraper.clone())?;
    let report = aggregator.search(&cli.query, max_results).await;
    let records = query.apply(report.clone().into_records());

    if cli.json {
        let output = SearchOutput {
            report: &report,
            results: &records,
            summary: summarize(&records),
        };
        return serde_json::to_string_pretty(&output).context("Failed to serialize results");
    }

    Ok(render_table(&report, &records))
}

pub fn render_table(report: &SearchReport, records: &[ProductRecord]) -> String {
    let mut out = String::new();

    if records.is_empty() {
        let _ = writeln!(out, "Nenhum produto encontrado para \"{}\"", report.query);
    } else {
        let _ = writeln!(out, "{} produtos para \"{}\"", records.len(), report.query);
        for record in records {
            let _ = writeln!(
                out,
                "R$ {:>9.2}  {:<20}  {:<22}  {}",
                record.price,
                record.store.display_name(),
                truncate(&record.brand, 22),
                record.title
            );
            let _ = writeln!(out, "{:>14}{}", "", record.link);
        }

        let _ = writeln!(out);
        for s in summarize(records) {
            let _ = writeln!(
                out,
                "{:<20} {:>3} itens  min R$ {:.2}  max R$ {:.2}  média R$ {:.2}",
                s.store.display_name(),
                s.count,
                s.min_price,
                s.max_price,
                s.average_price
            );
        }
    }

    let failed = report.failed_stores();
    if !failed.is_empty() {
        let names: Vec<_> = failed.iter().map(|s| s.display_name()).collect();
        let _ = writeln!(out, "Lojas sem resposta: {}", names.join(", "));
    }

    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
