//! Supported chains and exchanges
//!
//! Chains carry their Covalent chain id; exchanges carry the slug used in
//! `xy=k` endpoint paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Blockchains with a Covalent `xy=k` deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    Polygon,
    Avalanche,
    BinanceSmartChain,
    Fantom,
    Rsk,
    Arbitrum,
    Palm,
    Klaytn,
    Heco,
    Moonriver,
}

impl Chain {
    /// Every supported chain
    pub const ALL: [Chain; 11] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Avalanche,
        Chain::BinanceSmartChain,
        Chain::Fantom,
        Chain::Rsk,
        Chain::Arbitrum,
        Chain::Palm,
        Chain::Klaytn,
        Chain::Heco,
        Chain::Moonriver,
    ];

    /// Chains offered by the dashboard selector, in display order
    pub const DASHBOARD: [Chain; 5] = [
        Chain::Ethereum,
        Chain::BinanceSmartChain,
        Chain::Polygon,
        Chain::Avalanche,
        Chain::Fantom,
    ];

    /// Covalent chain id
    pub fn id(self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Polygon => 137,
            Chain::Avalanche => 43114,
            Chain::BinanceSmartChain => 56,
            Chain::Fantom => 250,
            Chain::Rsk => 30,
            Chain::Arbitrum => 42161,
            Chain::Palm => 11297108109,
            Chain::Klaytn => 8217,
            Chain::Heco => 128,
            Chain::Moonriver => 1285,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Polygon => "Polygon / Matic",
            Chain::Avalanche => "Avalanche C-Chain",
            Chain::BinanceSmartChain => "Binance Smart Chain",
            Chain::Fantom => "Fantom Opera",
            Chain::Rsk => "RSK",
            Chain::Arbitrum => "Arbitrum",
            Chain::Palm => "Palm",
            Chain::Klaytn => "Klaytn",
            Chain::Heco => "HECO",
            Chain::Moonriver => "Moonriver",
        }
    }

    /// Looks up a chain by its Covalent id
    pub fn from_id(id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|chain| chain.id() == id)
    }

    /// Parses a chain from its numeric id or a case-insensitive name alias
    ///
    /// # Arguments
    /// * `s` - e.g. "1", "ethereum", "eth", "matic", "bsc"
    ///
    /// # Returns
    /// * `Some(Chain)` if the string matches a supported chain
    /// * `None` otherwise
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if let Ok(id) = s.parse::<u64>() {
            return Self::from_id(id);
        }
        match s.as_str() {
            "ethereum" | "eth" => Some(Chain::Ethereum),
            "polygon" | "matic" => Some(Chain::Polygon),
            "avalanche" | "avax" => Some(Chain::Avalanche),
            "binance" | "bsc" | "bnb" => Some(Chain::BinanceSmartChain),
            "fantom" | "ftm" => Some(Chain::Fantom),
            "rsk" => Some(Chain::Rsk),
            "arbitrum" => Some(Chain::Arbitrum),
            "palm" => Some(Chain::Palm),
            "klaytn" => Some(Chain::Klaytn),
            "heco" => Some(Chain::Heco),
            "moonriver" => Some(Chain::Moonriver),
            _ => None,
        }
    }

    /// Next chain in the dashboard selector, wrapping around
    ///
    /// Chains outside the selector jump back to the first entry.
    pub fn next_on_dashboard(self) -> Self {
        let position = Self::DASHBOARD.iter().position(|c| *c == self);
        match position {
            Some(i) => Self::DASHBOARD[(i + 1) % Self::DASHBOARD.len()],
            None => Self::DASHBOARD[0],
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniswap-clone exchanges indexed by Covalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    SushiSwap,
    QuickSwap,
    Pangolin,
    SpiritSwap,
    SpookySwap,
}

impl Exchange {
    pub const ALL: [Exchange; 5] = [
        Exchange::SushiSwap,
        Exchange::QuickSwap,
        Exchange::Pangolin,
        Exchange::SpiritSwap,
        Exchange::SpookySwap,
    ];

    /// Path segment used by the API
    pub fn slug(self) -> &'static str {
        match self {
            Exchange::SushiSwap => "sushiswap",
            Exchange::QuickSwap => "quickswap",
            Exchange::Pangolin => "pangolin",
            Exchange::SpiritSwap => "spiritswap",
            Exchange::SpookySwap => "spookyswap",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Exchange::SushiSwap => "SushiSwap",
            Exchange::QuickSwap => "QuickSwap",
            Exchange::Pangolin => "Pangolin",
            Exchange::SpiritSwap => "SpiritSwap",
            Exchange::SpookySwap => "SpookySwap",
        }
    }

    /// Parses an exchange from its slug or display name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|exchange| exchange.slug() == s || exchange.name().to_lowercase() == s)
    }

    /// Next exchange in selector order, wrapping around
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A (chain, exchange) pair: the unit of every dashboard query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Market {
    pub chain: Chain,
    pub exchange: Exchange,
}

impl Default for Market {
    fn default() -> Self {
        Self {
            chain: Chain::Ethereum,
            exchange: Exchange::SushiSwap,
        }
    }
}

impl Market {
    pub fn new(chain: Chain, exchange: Exchange) -> Self {
        Self { chain, exchange }
    }

    /// Cache key for queries on this market, e.g. `sushiswap-1`
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.exchange.slug(), self.chain.id())
    }

    /// Endpoint path prefix, e.g. `1/xy=k/sushiswap`
    pub fn path_prefix(&self) -> String {
        format!("{}/xy=k/{}", self.chain.id(), self.exchange.slug())
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.exchange, self.chain)
    }
}
