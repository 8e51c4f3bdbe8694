//! Core application logic for Chart Cycles
//!
//! This module contains the cycle metadata cache, the declarative naming
//! rules, the HTTP clients and the release assembler tying them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chart_cycles::app::{
//!     ClientConfig, CycleCache, CycleCacheConfig, Edition, HttpProber, MetadataClient,
//!     PathResolver, ProductFamily, ProductFormat, ProductSettings, ReleaseAssembler, Series,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client_config = ClientConfig::default();
//! let cache = Arc::new(CycleCache::new(
//!     Arc::new(MetadataClient::new(&client_config)?),
//!     CycleCacheConfig::default(),
//! ));
//! let assembler = ReleaseAssembler::new(
//!     cache,
//!     PathResolver::builtin()?,
//!     Arc::new(HttpProber::new(&client_config)?),
//!     ProductSettings::new(url::Url::parse("https://aeronav.faa.gov/")?),
//! );
//!
//! let result = assembler
//!     .resolve_release(
//!         ProductFamily::IfrEnroute,
//!         Edition::Current,
//!         "US",
//!         ProductFormat::GeoTiff,
//!         Some(Series::Low),
//!     )
//!     .await;
//! for url in &result.urls {
//!     println!("{}", url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cycles;
pub mod models;
pub mod naming;
pub mod release;

// Re-export main public API
pub use client::{ClientConfig, HttpProber, MetadataClient, ProxyConfig};
pub use cycles::{
    cycle_number, CacheStats, CycleCache, CycleCacheConfig, CycleSource, EpochSchedule,
    RegionalCycleTable, RegionalCycles, RegionalKey,
};
pub use models::{
    CycleRecord, CycleSnapshot, Edition, Period, ProductFamily, ProductFormat, Series,
};
pub use naming::{CandidatePath, Catalog, FamilyDescriptor, NamingRule, PathQuery, PathResolver};
pub use release::{
    AvailabilityProbe, ProductSettings, ReleaseAssembler, ResolutionOutcome, ResolutionResult,
    ResolutionStatus,
};
