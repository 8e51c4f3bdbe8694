//! Chart Cycles Library
//!
//! A Rust library for resolving the publication cycles of aeronautical chart
//! products and building the download paths of each release. Cycle metadata is
//! cached per product family and candidate files are checked with rate-limited
//! HEAD probes.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
