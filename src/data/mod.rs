//! Core data layer for the DEX dashboard
//!
//! This module contains the upstream API client, the pagination aggregator,
//! JSON flattening and the dashboard views built on top of them.

pub mod client;
pub mod dashboard;
pub mod flatten;
pub mod markets;
pub mod pagination;

pub use client::{ApiConfig, ApiError, CovalentClient, RetryPolicy};
pub use dashboard::{DashboardError, EcosystemSummary};
pub use flatten::{FlatRecord, Table};
pub use markets::{Chain, Exchange, Market};
pub use pagination::{Page, PageSource, Pagination};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the dashboard shows for one market, fetched together
///
/// This is the value cached per market key (e.g. `sushiswap-1`).
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    /// The market this data is for
    pub market: Market,
    /// Ecosystem KPIs and charts
    pub summary: EcosystemSummary,
    /// All pools, flattened
    pub pools: Table,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
}

/// Fetches the ecosystem summary and every pool of `market` concurrently
pub async fn load_snapshot(
    client: &CovalentClient,
    market: Market,
) -> Result<MarketSnapshot, DashboardError> {
    let (summary, pools) = futures::try_join!(
        dashboard::load_summary(client, market),
        dashboard::load_pools(client, market)
    )?;

    Ok(MarketSnapshot {
        market,
        summary,
        pools,
        fetched_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_serializes_for_json_output() {
        let summary = EcosystemSummary::from_page(&Page {
            items: vec![json!({"total_swaps_24h": 10})],
            pagination: None,
        })
        .unwrap();
        let snapshot = MarketSnapshot {
            market: Market::default(),
            summary,
            pools: Table::from_items(&[json!({"exchange": "0xabc"})]),
            fetched_at: Utc::now(),
        };

        let value = serde_json::to_value(&snapshot).expect("Failed to serialize snapshot");

        assert_eq!(value["market"]["exchange"], "SushiSwap");
        assert_eq!(value["pools"]["rows"][0]["exchange"], "0xabc");
        assert_eq!(value["summary"]["total_swaps_24h"], 10.0);
    }
}
