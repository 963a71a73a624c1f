//! Command-line interface parsing for dexdash
//!
//! Flags pick the market opened at startup, override the cache lifetime and
//! log location, and switch to a one-shot JSON mode that skips the TUI.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::config::Config;
use crate::data::{Chain, Exchange, Market};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The chain is neither a known name nor a known chain id
    #[error("Invalid chain: '{0}'. Valid chains: ethereum, bsc, polygon, avalanche, fantom, arbitrum, rsk, palm, klaytn, heco, moonriver (or a chain id)")]
    InvalidChain(String),

    /// The exchange slug is not recognized
    #[error("Invalid exchange: '{0}'. Valid exchanges: sushiswap, quickswap, pangolin, spiritswap, spookyswap")]
    InvalidExchange(String),

    /// `--ttl 0` would make every read a miss
    #[error("Invalid ttl: must be at least one second")]
    ZeroTtl,
}

/// dexdash - DEX liquidity, volume and pool activity in the terminal
#[derive(Parser, Debug)]
#[command(name = "dexdash")]
#[command(about = "DEX liquidity, volume and pool transactions in the terminal")]
#[command(version)]
pub struct Cli {
    /// Chain to open, by name or chain id
    ///
    /// Examples:
    ///   dexdash --chain polygon
    ///   dexdash --chain 250 --exchange spookyswap
    #[arg(long, value_name = "CHAIN")]
    pub chain: Option<String>,

    /// Exchange to open: sushiswap, quickswap, pangolin, spiritswap, spookyswap
    #[arg(long, value_name = "EXCHANGE")]
    pub exchange: Option<String>,

    /// Seconds a fetched market stays cached (overrides DEXDASH_CACHE_TTL_SECS)
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u64>,

    /// Write logs here instead of the cache directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Fetch the market once, print it as JSON and exit
    #[arg(long)]
    pub once: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Market to open first
    pub market: Market,
    /// Cache lifetime override
    pub ttl: Option<Duration>,
    /// Log file override
    pub log_file: Option<PathBuf>,
    /// Print JSON and exit instead of starting the TUI
    pub once: bool,
}

/// Parses a chain argument into a Chain
pub fn parse_chain_arg(s: &str) -> Result<Chain, CliError> {
    Chain::from_str(s).ok_or_else(|| CliError::InvalidChain(s.to_string()))
}

/// Parses an exchange argument into an Exchange
pub fn parse_exchange_arg(s: &str) -> Result<Exchange, CliError> {
    Exchange::from_str(s).ok_or_else(|| CliError::InvalidExchange(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with unset flags left at their defaults
    /// * `Err(CliError)` if a chain, exchange or ttl is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let defaults = Market::default();
        let chain = match &cli.chain {
            Some(s) => parse_chain_arg(s)?,
            None => defaults.chain,
        };
        let exchange = match &cli.exchange {
            Some(s) => parse_exchange_arg(s)?,
            None => defaults.exchange,
        };
        let ttl = match cli.ttl {
            Some(0) => return Err(CliError::ZeroTtl),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(StartupConfig {
            market: Market::new(chain, exchange),
            ttl,
            log_file: cli.log_file.clone(),
            once: cli.once,
        })
    }

    /// Applies the flags on top of environment configuration
    pub fn apply_to(&self, config: &mut Config) {
        config.market = self.market;
        if let Some(ttl) = self.ttl {
            config.cache_ttl = ttl;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_arg_names_and_aliases() {
        assert_eq!(parse_chain_arg("ethereum").unwrap(), Chain::Ethereum);
        assert_eq!(parse_chain_arg("bsc").unwrap(), Chain::BinanceSmartChain);
        assert_eq!(parse_chain_arg("Polygon").unwrap(), Chain::Polygon);
    }

    #[test]
    fn test_parse_chain_arg_by_id() {
        assert_eq!(parse_chain_arg("250").unwrap(), Chain::Fantom);
        assert_eq!(parse_chain_arg("43114").unwrap(), Chain::Avalanche);
    }

    #[test]
    fn test_parse_chain_arg_invalid() {
        let err = parse_chain_arg("solana").unwrap_err();
        assert!(err.to_string().contains("Invalid chain"));
        assert!(err.to_string().contains("solana"));

        assert!(parse_chain_arg("999999").is_err());
    }

    #[test]
    fn test_parse_exchange_arg() {
        assert_eq!(parse_exchange_arg("quickswap").unwrap(), Exchange::QuickSwap);
        assert_eq!(parse_exchange_arg("SpookySwap").unwrap(), Exchange::SpookySwap);

        let err = parse_exchange_arg("uniswap").unwrap_err();
        assert!(err.to_string().contains("Invalid exchange"));
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["dexdash"]);
        assert!(cli.chain.is_none());
        assert!(cli.exchange.is_none());
        assert!(cli.ttl.is_none());
        assert!(!cli.once);
    }

    #[test]
    fn test_startup_config_from_cli_defaults() {
        let cli = Cli::parse_from(["dexdash"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.market, Market::default());
        assert!(config.ttl.is_none());
        assert!(config.log_file.is_none());
        assert!(!config.once);
    }

    #[test]
    fn test_startup_config_from_cli_all_flags() {
        let cli = Cli::parse_from([
            "dexdash",
            "--chain",
            "fantom",
            "--exchange",
            "spiritswap",
            "--ttl",
            "90",
            "--log-file",
            "/tmp/dexdash.log",
            "--once",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.market, Market::new(Chain::Fantom, Exchange::SpiritSwap));
        assert_eq!(config.ttl, Some(Duration::from_secs(90)));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/dexdash.log")));
        assert!(config.once);
    }

    #[test]
    fn test_startup_config_rejects_zero_ttl() {
        let cli = Cli::parse_from(["dexdash", "--ttl", "0"]);
        assert!(matches!(StartupConfig::from_cli(&cli), Err(CliError::ZeroTtl)));
    }

    #[test]
    fn test_startup_config_rejects_invalid_exchange() {
        let cli = Cli::parse_from(["dexdash", "--exchange", "curve"]);
        assert!(StartupConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn test_apply_to_overrides_market_and_ttl() {
        let mut config = Config::from_lookup(|name| {
            (name == "API_KEY").then(|| "k".to_string())
        })
        .unwrap();
        let startup = StartupConfig {
            market: Market::new(Chain::Polygon, Exchange::QuickSwap),
            ttl: Some(Duration::from_secs(42)),
            ..Default::default()
        };

        startup.apply_to(&mut config);

        assert_eq!(config.market, Market::new(Chain::Polygon, Exchange::QuickSwap));
        assert_eq!(config.cache_ttl, Duration::from_secs(42));
    }
}
