//! Command-line argument parsing for Chart Cycles
//!
//! This module defines the CLI structure using clap derive macros: release
//! resolution, edition lookup, catalog listing and configuration management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::{Edition, ProductFamily, ProductFormat, Series};

/// Chart Cycles - resolve aeronautical chart releases
#[derive(Parser, Debug)]
#[command(
    name = "chart_cycles",
    version,
    about = "Resolve publication cycles and download paths for aeronautical chart products",
    long_about = "Looks up the current or next publication cycle of a chart product family,
builds the expected download paths and optionally checks that each file exists."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the download paths of one release
    Release(ReleaseArgs),

    /// Show the cycle record backing an edition
    Edition(EditionArgs),

    /// List product families and their naming rules
    Families(FamiliesArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the release command
#[derive(Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Product family (e.g. "sectional", "ifr_enroute", "dtpp")
    #[arg(short, long)]
    pub family: ProductFamily,

    /// Edition: current, next or changeset
    #[arg(short, long, default_value = "current")]
    pub edition: Edition,

    /// Geography, city or region code (e.g. "US", "Seattle", "NE")
    #[arg(short, long)]
    pub geography: String,

    /// Format: PDF, GEOTIFF or ZIP
    #[arg(long, default_value = "PDF")]
    pub format: ProductFormat,

    /// Series for IFR enroute charts: LOW, HIGH or AREA
    #[arg(short, long)]
    pub series: Option<Series>,

    /// Skip availability probes regardless of configuration
    #[arg(long)]
    pub no_verify: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the edition command
#[derive(Args, Debug, Clone)]
pub struct EditionArgs {
    /// Product family
    #[arg(short, long)]
    pub family: ProductFamily,

    /// Edition: current, next or changeset
    #[arg(short, long, default_value = "current")]
    pub edition: Edition,

    /// City or region, required for per-region families
    #[arg(short, long)]
    pub geography: Option<String>,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the families command
#[derive(Args, Debug, Clone)]
pub struct FamiliesArgs {
    /// Show only this family
    #[arg(short, long)]
    pub family: Option<ProductFamily>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file if none exists
    Init {
        /// Target path (defaults to the user config directory)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },

    /// Show the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level requested by the verbosity flags, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl ReleaseArgs {
    /// Reject series on families that do not have one
    pub fn validate(&self) -> Result<(), String> {
        if self.series.is_some() && self.family != ProductFamily::IfrEnroute {
            return Err(format!("--series only applies to ifr_enroute, not {}", self.family));
        }
        if self.geography.trim().is_empty() {
            return Err("--geography must not be empty".to_string());
        }
        Ok(())
    }
}
