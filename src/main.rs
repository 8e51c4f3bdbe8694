//! Chart Cycles CLI application
//!
//! Command-line interface for resolving chart publication cycles, building
//! download paths and checking that the files exist.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use chart_cycles::cli::{
    handle_config, handle_edition, handle_families, handle_release, Cli, Commands,
};
use chart_cycles::config::AppConfig;
use chart_cycles::constants::logging;
use chart_cycles::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Flags win over the configured level
    let configured = AppConfig::load(cli.global.config.clone())
        .await
        .ok()
        .map(|config| config.logging.level);
    init_logging(&cli, configured);

    info!("Chart Cycles v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = cli.global.config.clone();
    match cli.command {
        Commands::Release(args) => {
            info!("Executing release command");
            handle_release(args, config_path).await
        }
        Commands::Edition(args) => {
            info!("Executing edition command");
            handle_edition(args, config_path).await
        }
        Commands::Families(args) => handle_families(args, config_path).await,
        Commands::Config(args) => handle_config(args, config_path).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, configured: Option<String>) {
    let log_level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .or(configured)
        .unwrap_or_else(|| logging::DEFAULT_LOG_LEVEL.to_string());

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("chart_cycles={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
