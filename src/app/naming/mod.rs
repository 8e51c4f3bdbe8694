//! Naming rules and path resolution
//!
//! # Module Organization
//!
//! - [`template`] - Placeholder templates for directory and file names
//! - [`path`] - Candidate paths built from directory and file segments
//! - [`rules`] - Declarative per-family naming rules
//! - [`catalog`] - Built-in rules for every product family
//! - [`resolver`] - Enumerates candidate paths for a request

pub mod catalog;
pub mod path;
pub mod resolver;
pub mod rules;
pub mod template;

// Re-export main public API
pub use catalog::Catalog;
pub use path::{CandidatePath, PathBuilder, PathSegment, SegmentKind};
pub use resolver::{PathQuery, PathResolver};
pub use rules::{
    normalize_geography, title_case, FamilyDescriptor, GeographyMatch, IndexException, NamingRule,
};
pub use template::{Field, RenderContext, Template};
