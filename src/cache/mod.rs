//! Cache module for expensive upstream queries
//!
//! This module provides an in-process cache keyed by query (for example
//! `sushiswap-1`) with a fixed TTL (time-to-live). Reads of stale or missing
//! keys recompute the value through a caller-supplied update function, with at
//! most one recompute in flight per key. Nothing is persisted across restarts.

mod manager;

pub use manager::CacheManager;
