//! Release resolution
//!
//! # Module Organization
//!
//! - [`probe`] - Availability check seam
//! - [`result`] - Status, outcome and result types
//! - [`assembler`] - Cycle lookup, path building and probing for one request

pub mod assembler;
pub mod probe;
pub mod result;


// Re-export main public API
pub use assembler::{ProductSettings, ReleaseAssembler};
pub use probe::AvailabilityProbe;
pub use result::{ResolutionOutcome, ResolutionResult, ResolutionStatus};
