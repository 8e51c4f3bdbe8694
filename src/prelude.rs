//! Prelude module for Chart Cycles Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use chart_cycles::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chart_cycles::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client_config = ClientConfig::default();
//!     let cache = Arc::new(CycleCache::new(
//!         Arc::new(MetadataClient::new(&client_config)?),
//!         CycleCacheConfig::default(),
//!     ));
//!     let defaults = ProductSettings::new(
//!         url::Url::parse(PRODUCT_BASE_URL).map_err(|e| AppError::generic(e.to_string()))?,
//!     );
//!     let assembler = ReleaseAssembler::new(
//!         cache,
//!         PathResolver::builtin()?,
//!         Arc::new(HttpProber::new(&client_config)?),
//!         defaults,
//!     );
//!
//!     let record = assembler
//!         .resolve_edition_only(ProductFamily::Sectional, Edition::Next, None)
//!         .await;
//!     println!("{:?}", record);
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    AvailabilityProbe,
    // Metadata and caching
    CycleCache,
    CycleCacheConfig,
    CycleRecord,
    CycleSnapshot,
    CycleSource,

    // Data types
    Edition,
    Period,
    ProductFamily,
    ProductFormat,
    Series,

    // HTTP clients
    ClientConfig,
    HttpProber,
    MetadataClient,

    // Naming and assembly
    PathResolver,
    ProductSettings,
    ReleaseAssembler,
    ResolutionResult,
    ResolutionStatus,
};

// Commonly used constants
pub use crate::constants::{DEFAULT_PROBE_RATE_LIMIT_RPS, PRODUCT_BASE_URL, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::sync::Arc;

pub use tokio;
