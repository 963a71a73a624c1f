//! UI rendering module for dexdash
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod dashboard;
pub mod help_overlay;
pub mod transactions;
pub mod widgets;

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;
pub use transactions::render as render_transactions;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use dexdash::data::dashboard::format_thousands;
use dexdash::data::Table;

/// Columns holding money amounts or counts, shown with separators
fn is_numeric_column(column: &str) -> bool {
    column.ends_with("_quote") || column.ends_with("_count_24h")
}

/// Display text for one table cell
///
/// Numeric columns get thousands separators; everything else is shown as-is.
pub fn format_cell(table: &Table, row: usize, column: &str) -> String {
    let text = table.cell_text(row, column);
    if !is_numeric_column(column) {
        return text;
    }
    match text.parse::<f64>() {
        Ok(value) => format_thousands(value, 0),
        Err(_) => text,
    }
}

/// Shortens `0x1234...abcd` style hashes to fit narrow columns
pub fn shorten_hash(hash: &str) -> String {
    if hash.len() <= 14 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..8], &hash[hash.len() - 4..])
}

/// Renders the footer line: the status message if any, otherwise key hints
pub(crate) fn render_footer(frame: &mut Frame, area: Rect, status: Option<&str>, hints: &str) {
    let line = match status {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            hints.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Apps with canned data for rendering tests
#[cfg(test)]
pub(crate) mod tests_support {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{Local, Utc};
    use serde_json::json;

    use dexdash::data::client::{ApiConfig, RetryPolicy};
    use dexdash::data::dashboard::pools_table;
    use dexdash::data::{CovalentClient, EcosystemSummary, Market, MarketSnapshot, Page};

    use crate::app::{App, AppState, SnapshotCache};

    pub fn empty_app() -> App {
        let mut config = ApiConfig::new("test-key");
        config.base_url = "http://127.0.0.1:9/v1".to_string();
        config.retry = RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        };
        let client = CovalentClient::new(config).expect("client should build");
        let cache = Arc::new(SnapshotCache::new(Duration::from_secs(60)));
        App::with_client(client, cache, Market::default())
    }

    pub fn dashboard_app() -> App {
        let summary = EcosystemSummary::from_page(&Page {
            items: vec![json!({
                "total_active_pairs_7d": 2500,
                "total_swaps_24h": 1200,
                "total_fees_24h": 35000.5,
                "gas_token_price_quote": 3120.1234,
                "volume_chart_7d": [
                    {"dt": "2021-10-26T00:00:00Z", "volume_quote": 100.0},
                    {"dt": "2021-10-27T00:00:00Z", "volume_quote": 250.0}
                ],
                "liquidity_chart_7d": [
                    {"dt": "2021-10-26T00:00:00Z", "liquidity_quote": 9000.0},
                    {"dt": "2021-10-27T00:00:00Z", "liquidity_quote": 9500.0}
                ]
            })],
            pagination: None,
        })
        .expect("summary should parse");
        let pools = pools_table(&Page {
            items: vec![
                json!({
                    "exchange": "0x397ff1542f962076d0bfe58ea045ffa2d347aca0",
                    "token_0": {"contract_ticker_symbol": "WETH"},
                    "token_1": {"contract_ticker_symbol": "USDC"},
                    "total_liquidity_quote": 152000000.0,
                    "volume_24h_quote": 23000000.0,
                    "fee_24h_quote": 69000.0,
                    "swap_count_24h": 4100
                }),
                json!({
                    "exchange": "0xc3d03e4f041fd4cd388c549ee2a29a9e5075882f",
                    "token_0": {"contract_ticker_symbol": "DAI"},
                    "token_1": {"contract_ticker_symbol": "USDT"},
                    "total_liquidity_quote": 5000000.0,
                    "volume_24h_quote": 120000.0,
                    "fee_24h_quote": 360.0,
                    "swap_count_24h": 90
                }),
            ],
            pagination: None,
        });
        let snapshot = Arc::new(MarketSnapshot {
            market: Market::default(),
            summary,
            pools,
            fetched_at: Utc::now(),
        });

        let mut app = empty_app();
        app.visible_pools = snapshot.pools.clone();
        app.snapshot = Some(snapshot);
        app.last_refresh = Some(Local::now());
        app.state = AppState::Dashboard;
        app
    }
}
