//! Command-line interface components
//!
//! This module contains CLI-specific code for the Chart Cycles application:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, ConfigAction, ConfigArgs, EditionArgs, FamiliesArgs, GlobalArgs, ReleaseArgs,
};
pub use commands::{build_assembler, handle_config, handle_edition, handle_families, handle_release};
