//! Dashboard views built from upstream pages
//!
//! Turns raw `ecosystem`, `pools` and `transactions` pages into what the
//! dashboard shows: KPI figures, 7-day charts and flattened tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::client::{ApiError, CovalentClient};
use super::flatten::{value_text, FlatRecord, Table};
use super::markets::Market;
use super::pagination::Page;

const ETHERSCAN_URL: &str = "https://etherscan.io";

/// Pool columns shown by the dashboard, with their headers
pub const POOL_COLUMNS: [(&str, &str); 6] = [
    ("pair", "Pair"),
    ("total_liquidity_quote", "Liquidity"),
    ("volume_24h_quote", "Volume 24h"),
    ("fee_24h_quote", "Fees 24h"),
    ("swap_count_24h", "Swaps 24h"),
    ("exchange", "Pool Address"),
];

/// Transaction columns shown by the dashboard, with their headers
pub const TRANSACTION_COLUMNS: [(&str, &str); 5] = [
    ("block_signed_at", "Time"),
    ("act", "Action"),
    ("total_quote", "Value"),
    ("sender_address", "Sender"),
    ("tx_hash", "Tx Hash"),
];

/// Errors that can occur while building dashboard views
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The upstream request failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The ecosystem endpoint returned no items
    #[error("Ecosystem response contains no items")]
    EmptyEcosystem,

    /// An item did not have the expected shape
    #[error("Unexpected item shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// A chart point carried an unparseable date
    #[error("Invalid chart date: {0}")]
    InvalidDate(String),
}

/// One day of a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ecosystem KPIs and 7-day charts for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemSummary {
    pub total_active_pairs_7d: f64,
    pub total_swaps_24h: f64,
    pub total_fees_24h: f64,
    pub gas_token_price_quote: f64,
    /// Daily swap volume, oldest first
    pub volume_chart_7d: Vec<ChartPoint>,
    /// Daily liquidity, oldest first
    pub liquidity_chart_7d: Vec<ChartPoint>,
}

/// Ecosystem item as returned by the API
#[derive(Debug, Deserialize)]
struct EcosystemItem {
    total_active_pairs_7d: Option<f64>,
    total_swaps_24h: Option<f64>,
    total_fees_24h: Option<f64>,
    gas_token_price_quote: Option<f64>,
    #[serde(default)]
    volume_chart_7d: Vec<RawChartPoint>,
    #[serde(default)]
    liquidity_chart_7d: Vec<RawChartPoint>,
}

/// Chart entry; volume and liquidity charts name their value differently
#[derive(Debug, Deserialize)]
struct RawChartPoint {
    dt: String,
    #[serde(default, alias = "volume_quote", alias = "liquidity_quote")]
    quote: Option<f64>,
}

impl EcosystemSummary {
    /// Builds the summary from the first item of an `ecosystem` page
    pub fn from_page(page: &Page) -> Result<Self, DashboardError> {
        let first = page.items.first().ok_or(DashboardError::EmptyEcosystem)?;
        let item: EcosystemItem = serde_json::from_value(first.clone())?;

        Ok(Self {
            total_active_pairs_7d: item.total_active_pairs_7d.unwrap_or_default(),
            total_swaps_24h: item.total_swaps_24h.unwrap_or_default(),
            total_fees_24h: item.total_fees_24h.unwrap_or_default(),
            gas_token_price_quote: item.gas_token_price_quote.unwrap_or_default(),
            volume_chart_7d: parse_chart(&item.volume_chart_7d)?,
            liquidity_chart_7d: parse_chart(&item.liquidity_chart_7d)?,
        })
    }

    /// KPI labels with their formatted values
    pub fn kpis(&self) -> [(&'static str, String); 4] {
        [
            ("Active Pairs", format_thousands(self.total_active_pairs_7d, 0)),
            ("Total Swaps", format_thousands(self.total_swaps_24h, 0)),
            ("Total Fees", format_thousands(self.total_fees_24h, 0)),
            ("Gas Price Quote", format_thousands(self.gas_token_price_quote, 4)),
        ]
    }
}

/// Parses chart points and sorts them oldest first
fn parse_chart(raw: &[RawChartPoint]) -> Result<Vec<ChartPoint>, DashboardError> {
    let mut points = raw
        .iter()
        .map(|point| -> Result<ChartPoint, DashboardError> {
            Ok(ChartPoint {
                date: parse_chart_date(&point.dt)?,
                value: point.quote.unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    points.sort_by_key(|point| point.date);
    Ok(points)
}

/// Parses the date part of `2021-10-27T00:00:00Z` or `2021-10-27`
fn parse_chart_date(dt: &str) -> Result<NaiveDate, DashboardError> {
    let date_part = dt.get(..10).unwrap_or(dt);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| DashboardError::InvalidDate(dt.to_string()))
}

/// Formats a number with thousands separators and fixed decimals
///
/// `format_thousands(1234567.891, 0)` gives `1,234,568`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Flattens a pools page and adds a `pair` column (`WETH - USDC`)
pub fn pools_table(page: &Page) -> Table {
    let mut table = Table::from_items(&page.items);
    table.add_column("pair", |row| Value::String(pair_label(row)));
    table
}

fn pair_label(row: &FlatRecord) -> String {
    let ticker = |column: &str| row.get(column).map(value_text).unwrap_or_default();
    format!(
        "{} - {}",
        ticker("token_0.contract_ticker_symbol"),
        ticker("token_1.contract_ticker_symbol")
    )
}

/// Keeps pools where either token ticker contains `query` (case-insensitive)
///
/// An empty query keeps every row.
pub fn filter_by_token(table: &Table, query: &str) -> Table {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return table.clone();
    }

    table.filter_rows(|row| {
        ["token_0.contract_ticker_symbol", "token_1.contract_ticker_symbol"]
            .iter()
            .filter_map(|column| row.get(*column))
            .any(|ticker| value_text(ticker).to_lowercase().contains(&query))
    })
}

/// Flattens a transactions page
pub fn transactions_table(page: &Page) -> Table {
    Table::from_items(&page.items)
}

/// Explorer link for a contract or wallet address
pub fn address_url(address: &str) -> String {
    format!("{}/address/{}", ETHERSCAN_URL, address)
}

/// Explorer link for a transaction
pub fn tx_url(tx_hash: &str) -> String {
    format!("{}/tx/{}", ETHERSCAN_URL, tx_hash)
}

/// Fetches and summarizes the ecosystem endpoint of `market`
pub async fn load_summary(
    client: &CovalentClient,
    market: Market,
) -> Result<EcosystemSummary, DashboardError> {
    let page = client.dex_ecosystem(market).await?;
    EcosystemSummary::from_page(&page)
}

/// Fetches every pool of `market` as a table
pub async fn load_pools(client: &CovalentClient, market: Market) -> Result<Table, DashboardError> {
    let page = client.dex_pools(market).await?;
    Ok(pools_table(&page))
}

/// Fetches the latest transactions of the pool at `address`
pub async fn load_transactions(
    client: &CovalentClient,
    market: Market,
    address: &str,
) -> Result<Table, DashboardError> {
    let page = client.pool_transactions(market, address).await?;
    Ok(transactions_table(&page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ecosystem_page() -> Page {
        Page {
            items: vec![json!({
                "dex_name": "sushiswap",
                "chain_id": 1,
                "total_active_pairs_7d": 1843,
                "total_swaps_24h": 98123,
                "total_fees_24h": 412345.67,
                "gas_token_price_quote": 4321.123456,
                "volume_chart_7d": [
                    {"dt": "2021-10-28T00:00:00Z", "volume_quote": 250.0},
                    {"dt": "2021-10-27T00:00:00Z", "volume_quote": 100.0}
                ],
                "liquidity_chart_7d": [
                    {"dt": "2021-10-27T00:00:00Z", "liquidity_quote": 5000.0},
                    {"dt": "2021-10-28T00:00:00Z", "liquidity_quote": 5100.0}
                ]
            })],
            pagination: None,
        }
    }

    fn pools_page() -> Page {
        Page {
            items: vec![
                json!({
                    "exchange": "0x397ff1542f962076d0bfe58ea045ffa2d347aca0",
                    "total_liquidity_quote": 150000000.0,
                    "token_0": {"contract_ticker_symbol": "USDC"},
                    "token_1": {"contract_ticker_symbol": "WETH"}
                }),
                json!({
                    "exchange": "0xceff51756c56ceffca006cd410b03ffc46dd3a58",
                    "total_liquidity_quote": 91000000.0,
                    "token_0": {"contract_ticker_symbol": "WBTC"},
                    "token_1": {"contract_ticker_symbol": "WETH"}
                }),
                json!({
                    "exchange": "0x06da0fd433c1a5d7a4faa01111c044910a184553",
                    "total_liquidity_quote": 80000000.0,
                    "token_0": {"contract_ticker_symbol": "WETH"},
                    "token_1": {"contract_ticker_symbol": "USDT"}
                }),
            ],
            pagination: None,
        }
    }

    #[test]
    fn test_summary_from_ecosystem_page() {
        let summary = EcosystemSummary::from_page(&ecosystem_page()).expect("Failed to parse");

        assert!((summary.total_active_pairs_7d - 1843.0).abs() < 0.01);
        assert!((summary.total_swaps_24h - 98123.0).abs() < 0.01);
        assert_eq!(summary.volume_chart_7d.len(), 2);
        assert_eq!(summary.liquidity_chart_7d.len(), 2);
    }

    #[test]
    fn test_summary_charts_are_sorted_oldest_first() {
        let summary = EcosystemSummary::from_page(&ecosystem_page()).unwrap();

        let first = summary.volume_chart_7d[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2021, 10, 27).unwrap());
        assert!((first.value - 100.0).abs() < 0.01);
        assert!((summary.liquidity_chart_7d[1].value - 5100.0).abs() < 0.01);
    }

    #[test]
    fn test_summary_kpis_formatting() {
        let summary = EcosystemSummary::from_page(&ecosystem_page()).unwrap();
        let kpis = summary.kpis();

        assert_eq!(kpis[0], ("Active Pairs", "1,843".to_string()));
        assert_eq!(kpis[1], ("Total Swaps", "98,123".to_string()));
        assert_eq!(kpis[2], ("Total Fees", "412,346".to_string()));
        assert_eq!(kpis[3], ("Gas Price Quote", "4,321.1235".to_string()));
    }

    #[test]
    fn test_summary_from_empty_page_is_error() {
        let result = EcosystemSummary::from_page(&Page::default());
        assert!(matches!(result, Err(DashboardError::EmptyEcosystem)));
    }

    #[test]
    fn test_summary_with_invalid_chart_date() {
        let page = Page {
            items: vec![json!({"volume_chart_7d": [{"dt": "yesterday", "volume_quote": 1.0}]})],
            pagination: None,
        };

        match EcosystemSummary::from_page(&page) {
            Err(DashboardError::InvalidDate(dt)) => assert_eq!(dt, "yesterday"),
            other => panic!("Expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_missing_kpis_default_to_zero() {
        let page = Page {
            items: vec![json!({"chain_id": 250})],
            pagination: None,
        };

        let summary = EcosystemSummary::from_page(&page).unwrap();

        assert_eq!(summary.total_fees_24h, 0.0);
        assert!(summary.volume_chart_7d.is_empty());
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1234567.891, 0), "1,234,568");
        assert_eq!(format_thousands(0.04213, 4), "0.0421");
        assert_eq!(format_thousands(-12345.5, 1), "-12,345.5");
        assert_eq!(format_thousands(-0.00001, 2), "0.00");
    }

    #[test]
    fn test_pools_table_adds_pair_column_first() {
        let table = pools_table(&pools_page());

        assert_eq!(table.columns[0], "pair");
        assert_eq!(table.cell_text(0, "pair"), "USDC - WETH");
        assert_eq!(table.cell_text(1, "token_0.contract_ticker_symbol"), "WBTC");
    }

    #[test]
    fn test_filter_by_token_matches_either_side_case_insensitive() {
        let table = pools_table(&pools_page());

        let weth = filter_by_token(&table, "weth");
        assert_eq!(weth.len(), 3);

        let usd = filter_by_token(&table, "USD");
        assert_eq!(usd.len(), 2);
        assert_eq!(usd.cell_text(0, "pair"), "USDC - WETH");
        assert_eq!(usd.cell_text(1, "pair"), "WETH - USDT");

        let none = filter_by_token(&table, "doge");
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_by_empty_token_keeps_everything() {
        let table = pools_table(&pools_page());
        assert_eq!(filter_by_token(&table, "  "), table);
    }

    #[test]
    fn test_explorer_links() {
        assert_eq!(address_url("0xabc"), "https://etherscan.io/address/0xabc");
        assert_eq!(tx_url("0xdef"), "https://etherscan.io/tx/0xdef");
    }
}
