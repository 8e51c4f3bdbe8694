//! Configuration management for Chart Cycles
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.
//!
//! Precedence, lowest first: built-in defaults, the config file, then
//! environment variables (a `.env` file is honoured by the binary).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::{
    Catalog, ClientConfig, CycleCacheConfig, EpochSchedule, ProductFamily, ProductFormat,
    ProductSettings, ProxyConfig, Series,
};
use crate::constants::{cache, env as env_constants, http, limits, logging, services};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Cycle cache settings
    pub cache: CacheConfigToml,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Metadata service settings
    pub metadata: MetadataConfigToml,
    /// Defaults for every product family
    pub download: DownloadConfigToml,
    /// Per-family overrides keyed by family name
    pub products: BTreeMap<String, ProductConfigToml>,
    /// Set-count overrides
    pub set_counts: Vec<SetCountToml>,
    /// Directory and file-name template overrides
    pub templates: Vec<TemplateToml>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfigToml {
    /// Snapshot age after which a family is refetched
    #[serde(with = "humantime_serde")]
    pub age_limit: Duration,
    /// Upper bound on a single metadata fetch
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for CacheConfigToml {
    fn default() -> Self {
        Self {
            age_limit: cache::DEFAULT_AGE_LIMIT,
            fetch_timeout: cache::DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_per_host: usize,
    /// Request timeout for fetches and probes
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Probe rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Forward proxy host for probes; empty means direct
    pub proxy_host: String,
    /// Forward proxy port
    pub proxy_port: u16,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_PROBE_RATE_LIMIT_RPS,
            proxy_host: String::new(),
            proxy_port: http::DEFAULT_PROXY_PORT,
        }
    }
}

/// Metadata service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfigToml {
    /// Base URL of the cycle metadata service
    pub base_url: String,
}

impl Default for MetadataConfigToml {
    fn default() -> Self {
        Self {
            base_url: services::METADATA_BASE_URL.to_string(),
        }
    }
}

/// Download defaults shared by all families
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfigToml {
    /// Base URL candidate paths are resolved against
    pub base_url: String,
    /// Probe candidates before returning them
    pub verify_availability: bool,
}

impl Default for DownloadConfigToml {
    fn default() -> Self {
        Self {
            base_url: services::PRODUCT_BASE_URL.to_string(),
            verify_availability: true,
        }
    }
}

/// Per-family overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProductConfigToml {
    pub base_url: Option<String>,
    pub verify_availability: Option<bool>,
    /// Effective date of cycle 1 (YYYY-MM-DD)
    pub epoch_date: Option<NaiveDate>,
    pub cycle_length_days: Option<u32>,
}

/// Set-count override for one (family, geography, series, format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCountToml {
    pub family: String,
    pub geography: String,
    #[serde(default)]
    pub series: Option<String>,
    pub format: String,
    pub count: u32,
}

/// Directory and/or file-name template override for one
/// (family, geography, series, format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateToml {
    pub family: String,
    pub geography: String,
    #[serde(default)]
    pub series: Option<String>,
    pub format: String,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file(),
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path });
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(env_constants::PROXY_HOST) {
            debug!("Proxy host overridden from environment");
            self.client.proxy_host = host.trim().to_string();
        }
        if let Some(port) = lookup(env_constants::PROXY_PORT).and_then(|p| p.trim().parse().ok()) {
            self.client.proxy_port = port;
        }
        if let Some(url) = lookup(env_constants::METADATA_URL) {
            debug!("Metadata URL overridden from environment");
            self.metadata.base_url = url.trim().to_string();
        }
    }

    /// Check values that cannot be caught by deserialization
    pub fn validate(&self) -> ConfigResult<()> {
        if self.client.rate_limit_rps == 0 {
            return Err(invalid("client.rate_limit_rps", "0", "must be at least 1"));
        }
        parse_url("metadata.base_url", &self.metadata.base_url)?;
        parse_base_url("download.base_url", &self.download.base_url)?;
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(
                "logging.level",
                &self.logging.level,
                "expected error, warn, info, debug or trace",
            ));
        }

        for (name, product) in &self.products {
            parse_family(name)?;
            if let Some(url) = &product.base_url {
                parse_base_url(&format!("products.{}.base_url", name), url)?;
            }
            if product.cycle_length_days == Some(0) {
                return Err(invalid(
                    &format!("products.{}.cycle_length_days", name),
                    "0",
                    "must be at least 1",
                ));
            }
        }

        // Overrides must match a rule and templates must parse
        self.catalog()?;
        Ok(())
    }

    /// Cycle cache settings
    pub fn cache_config(&self) -> CycleCacheConfig {
        CycleCacheConfig::default()
            .with_age_limit(self.cache.age_limit)
            .with_fetch_timeout(self.cache.fetch_timeout)
    }

    /// HTTP client settings
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            tcp_nodelay: self.client.tcp_nodelay,
            pool_idle_timeout: self.client.pool_idle_timeout,
            pool_max_per_host: self.client.pool_max_per_host,
            request_timeout: self.client.request_timeout,
            connect_timeout: self.client.connect_timeout,
            rate_limit_rps: self.client.rate_limit_rps,
            proxy: ProxyConfig::new(self.client.proxy_host.as_str(), self.client.proxy_port),
            ..ClientConfig::default()
        }
    }

    /// Naming catalog with epoch and set-count overrides applied
    pub fn catalog(&self) -> ConfigResult<Catalog> {
        let mut catalog = Catalog::builtin()?;

        for (name, product) in &self.products {
            let family = parse_family(name)?;
            if product.epoch_date.is_none() && product.cycle_length_days.is_none() {
                continue;
            }
            if let Some(descriptor) = catalog.descriptor_mut(family) {
                let current = descriptor.epoch;
                let epoch = product
                    .epoch_date
                    .or(current.map(|e| e.epoch))
                    .ok_or_else(|| {
                        invalid(
                            &format!("products.{}.epoch_date", name),
                            "",
                            "required when the family has no built-in epoch",
                        )
                    })?;
                let length = product
                    .cycle_length_days
                    .or(current.map(|e| e.cycle_length_days))
                    .unwrap_or(crate::constants::cycles::AIRAC_CYCLE_DAYS);
                descriptor.epoch = Some(EpochSchedule::new(epoch, length));
            }
        }

        for entry in &self.set_counts {
            let family = parse_family(&entry.family)?;
            let series = entry
                .series
                .as_deref()
                .map(Series::from_str)
                .transpose()?;
            let format = ProductFormat::from_str(&entry.format)?;
            catalog.override_set_count(family, &entry.geography, series, format, entry.count)?;
        }

        for entry in &self.templates {
            let family = parse_family(&entry.family)?;
            let series = entry
                .series
                .as_deref()
                .map(Series::from_str)
                .transpose()?;
            let format = ProductFormat::from_str(&entry.format)?;
            catalog.override_templates(
                family,
                &entry.geography,
                series,
                format,
                entry.directory.as_deref(),
                entry.file.as_deref(),
            )?;
        }

        Ok(catalog)
    }

    /// Default download settings and per-family overrides
    pub fn product_settings(
        &self,
    ) -> ConfigResult<(ProductSettings, HashMap<ProductFamily, ProductSettings>)> {
        let defaults = ProductSettings::new(parse_base_url("download.base_url", &self.download.base_url)?)
            .with_verification(self.download.verify_availability);

        let mut overrides = HashMap::new();
        for (name, product) in &self.products {
            if product.base_url.is_none() && product.verify_availability.is_none() {
                continue;
            }
            let family = parse_family(name)?;
            let base_url = match &product.base_url {
                Some(url) => parse_base_url(&format!("products.{}.base_url", name), url)?,
                None => defaults.base_url.clone(),
            };
            let settings = ProductSettings::new(base_url).with_verification(
                product
                    .verify_availability
                    .unwrap_or(defaults.verify_availability),
            );
            overrides.insert(family, settings);
        }

        Ok((defaults, overrides))
    }

    /// Write the default config file at `config_path` unless one exists
    ///
    /// Returns `true` when a file was created.
    pub async fn initialize_at(config_path: &Path) -> ConfigResult<bool> {
        if config_path.exists() {
            return Ok(false);
        }

        info!("Creating default configuration file...");

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(config_path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            })?;

        info!("Created default configuration file: {}", config_path.display());
        Ok(true)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from("./chart-cycles.toml")];
        if let Ok(user) = Self::get_default_config_path() {
            search_paths.push(user);
        }
        #[cfg(unix)]
        search_paths.push(PathBuf::from("/etc/chart-cycles/config.toml"));

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            invalid("config_dir", "", "could not determine user config directory")
        })?;

        Ok(config_dir.join("chart-cycles").join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# Chart Cycles Configuration
# This file was automatically generated on first run.
# You can customize any of these settings to suit your needs.

[cache]
# Refetch cycle metadata once a snapshot is this old
age_limit = "{}"
# Give up on a metadata fetch after this long
fetch_timeout = "{}"

[client]
tcp_nodelay = true
pool_idle_timeout = "90s"
pool_max_per_host = {}
request_timeout = "{}"
connect_timeout = "{}"
# Availability probes per second
rate_limit_rps = {}
# Forward proxy for availability probes (empty = direct)
proxy_host = ""
proxy_port = {}

[metadata]
base_url = "{}"

[download]
base_url = "{}"
# Probe candidate files before returning them
verify_availability = true

# Per-family overrides
# [products.terminal_procedures]
# verify_availability = false
# epoch_date = "2020-01-02"
# cycle_length_days = 28

# Set-count overrides
# [[set_counts]]
# family = "ifr_enroute"
# geography = "US"
# series = "HIGH"
# format = "GEOTIFF"
# count = 12

# Directory and file-name template overrides
# Placeholders: {{mm-dd-yyyy}} {{yyyymmdd}} {{yymmdd}} {{cycle}} {{index}} {{index2}} {{letter}} {{name}} {{region}}
# [[templates]]
# family = "chart_supplement"
# geography = "NE"
# format = "PDF"
# file = "CS_{{region}}_{{yyyymmdd}}.zip"

[logging]
level = "{}"  # error, warn, info, debug, trace
"#,
            seconds(cache::DEFAULT_AGE_LIMIT),
            seconds(cache::DEFAULT_FETCH_TIMEOUT),
            http::POOL_MAX_PER_HOST,
            seconds(http::DEFAULT_TIMEOUT),
            seconds(http::CONNECT_TIMEOUT),
            limits::DEFAULT_PROBE_RATE_LIMIT_RPS,
            http::DEFAULT_PROXY_PORT,
            services::METADATA_BASE_URL,
            services::PRODUCT_BASE_URL,
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}

/// Duration as whole seconds, e.g. `3600s`
fn seconds(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_url(field: &str, value: &str) -> ConfigResult<Url> {
    Url::parse(value).map_err(|e| invalid(field, value, &e.to_string()))
}

/// Product base URL that relative candidate paths can be joined onto
///
/// The trailing slash is added by `ProductSettings::new`.
fn parse_base_url(field: &str, value: &str) -> ConfigResult<Url> {
    let url = parse_url(field, value)?;
    if url.cannot_be_a_base() {
        return Err(invalid(field, value, "must be a hierarchical URL such as https://host/path/"));
    }
    Ok(url)
}

fn parse_family(name: &str) -> ConfigResult<ProductFamily> {
    Ok(ProductFamily::from_str(name)?)
}
