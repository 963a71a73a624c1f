//! dexdash library
//!
//! Data layer, cache, configuration and CLI parsing. The binary adds the
//! terminal UI on top; integration tests use these modules directly.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod refresh;
