//! Cycle metadata: caching, regional lookup and epoch arithmetic
//!
//! # Module Organization
//!
//! - [`config`] - Cache configuration and defaults
//! - [`source`] - Metadata fetch seam
//! - [`cache`] - Per-family snapshot cache with fetch-then-swap refresh
//! - [`regional`] - (region, period, type) lookup tables for per-region families
//! - [`epoch`] - Cycle numbers derived from a fixed start date

pub mod cache;
pub mod config;
pub mod epoch;
pub mod regional;
pub mod source;

#[cfg(test)]
pub mod tests;

// Re-export main public API
pub use cache::{CacheStats, CycleCache};
pub use config::CycleCacheConfig;
pub use epoch::{cycle_number, EpochSchedule};
pub use regional::{RegionalCycleTable, RegionalCycles, RegionalKey};
pub use source::CycleSource;
