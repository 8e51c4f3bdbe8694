//! HTTP clients for cycle metadata and availability probes
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `metadata`: Cycle metadata service client (`CycleSource`)
//! - `prober`: `HEAD`-based availability prober (`AvailabilityProbe`)

// Module declarations
pub mod config;
pub mod metadata;
pub mod prober;

#[cfg(test)]
mod tests;

// Re-export public types
pub use config::{ClientConfig, ProxyConfig};
pub use metadata::MetadataClient;
pub use prober::{is_available_status, HttpProber};
