//! Command handlers for Chart Cycles CLI
//!
//! This module implements the command handlers that coordinate between
//! CLI arguments and the core application functionality.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::app::{
    CycleCache, CycleRecord, FamilyDescriptor, HttpProber, MetadataClient, PathResolver,
    ReleaseAssembler, ResolutionResult,
};
use crate::cli::{ConfigAction, ConfigArgs, EditionArgs, FamiliesArgs, ReleaseArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Wire the metadata client, cache, naming catalog and prober together
pub fn build_assembler(config: &AppConfig) -> Result<ReleaseAssembler> {
    let client_config = config.client_config();

    let metadata = MetadataClient::with_base_url(&client_config, &config.metadata.base_url)?;
    let cache = Arc::new(CycleCache::new(Arc::new(metadata), config.cache_config()));
    let resolver = PathResolver::new(Arc::new(config.catalog()?));
    let prober = HttpProber::new(&client_config)?;
    let (defaults, overrides) = config.product_settings()?;

    let assembler = overrides.into_iter().fold(
        ReleaseAssembler::new(cache, resolver, Arc::new(prober), defaults),
        |assembler, (family, settings)| assembler.with_product_settings(family, settings),
    );
    debug!("Built release assembler: {:?}", assembler);
    Ok(assembler)
}

/// Handle the release command
pub async fn handle_release(args: ReleaseArgs, config_path: Option<PathBuf>) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let config = AppConfig::load(config_path).await?;
    let mut assembler = build_assembler(&config)?;
    if args.no_verify {
        let settings = assembler
            .settings(args.family)
            .clone()
            .with_verification(false);
        assembler = assembler.with_product_settings(args.family, settings);
    }

    info!(
        "Resolving {} {} {} {}",
        args.family, args.edition, args.geography, args.format
    );
    let result = assembler
        .resolve_release(
            args.family,
            args.edition,
            &args.geography,
            args.format,
            args.series,
        )
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_release(&result);
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(AppError::generic(format!(
            "No release found (status {})",
            result.status
        )))
    }
}

fn print_release(result: &ResolutionResult) {
    println!("Status:  {} ({:?})", result.status, result.outcome);
    if let Some(cycle) = &result.cycle {
        print_cycle(cycle);
    }

    for url in &result.urls {
        println!("  {}", url);
    }

    let missing: Vec<&String> = result
        .availability
        .iter()
        .filter(|(_, available)| !**available)
        .map(|(path, _)| path)
        .collect();
    if !missing.is_empty() {
        println!("Unavailable:");
        for path in missing {
            println!("  {}", path);
        }
    }
}

fn print_cycle(record: &CycleRecord) {
    println!("Cycle:   {} {}", record.period, record.type_code);
    println!("Date:    {}", record.effective_date.format("%Y-%m-%d"));
    if let Some(number) = &record.cycle_number {
        println!("Number:  {}", number);
    }
    if let Some(region) = &record.region {
        println!("Region:  {}", region);
    }
}

/// Handle the edition command
pub async fn handle_edition(args: EditionArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path).await?;
    let assembler = build_assembler(&config)?;

    let record = assembler
        .resolve_edition_only(args.family, args.edition, args.geography.as_deref())
        .await;

    match record {
        Some(record) if args.json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Some(record) => {
            print_cycle(&record);
            Ok(())
        }
        None => Err(AppError::generic(format!(
            "No {} edition published for {}",
            args.edition, args.family
        ))),
    }
}

/// Handle the families command
pub async fn handle_families(args: FamiliesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path).await?;
    let catalog = config.catalog()?;

    let descriptors: Vec<&FamilyDescriptor> = catalog
        .iter()
        .filter(|d| args.family.map_or(true, |f| f == d.family))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for descriptor in descriptors {
        print_family(descriptor);
    }
    Ok(())
}

fn print_family(descriptor: &FamilyDescriptor) {
    let family = descriptor.family;
    println!(
        "{} ({} / {})",
        family,
        family.metadata_code(),
        family.cycle_type()
    );
    if let Some(epoch) = descriptor.epoch {
        println!(
            "  epoch {} every {} days",
            epoch.epoch, epoch.cycle_length_days
        );
    }
    if !descriptor.geographies.is_empty() {
        println!("  {} geographies", descriptor.geographies.len());
    }
    for rule in &descriptor.rules {
        let series = rule.series.map(|s| s.to_string()).unwrap_or_default();
        println!(
            "  {:?} {} {}{} x{} step {}: {}/{}",
            rule.geography,
            series,
            rule.format,
            if rule.changes_only { " changes" } else { "" },
            rule.set_count,
            rule.step,
            rule.directory,
            rule.file
        );
    }
    println!();
}

/// Handle configuration commands
pub async fn handle_config(args: ConfigArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.action {
        ConfigAction::Init { path } => {
            let target = match path.or(config_path) {
                Some(path) => path,
                None => AppConfig::get_default_config_path()?,
            };
            if AppConfig::initialize_at(&target).await? {
                println!("Created default configuration file:");
                println!("   {}", target.display());
            } else {
                println!("Configuration file already exists: {}", target.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = AppConfig::load(config_path).await?;
            let content = toml::to_string_pretty(&config)
                .map_err(|e| AppError::generic(format!("Failed to render configuration: {}", e)))?;
            println!("{}", content);
            Ok(())
        }
    }
}
