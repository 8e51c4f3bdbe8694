//! Cycle metadata service client
//!
//! `GET {base}/cycles?product=CODE&asOf=YYYY-MM-DD` returns
//!
//! ```json
//! {"product": "IFR_ENROUTE",
//!  "editions": [{"period": "CURRENT", "type": "56 DAY",
//!                "effectiveDate": "2023-10-05", "cycleNumber": "2310"}]}
//! ```
//!
//! Rows that cannot be interpreted are skipped rather than failing the
//! whole document.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::app::cycles::CycleSource;
use crate::app::models::{CycleRecord, CycleSnapshot, Period};
use crate::constants::services;
use crate::errors::{ClientError, ClientResult, FetchError, FetchResult};

use super::config::ClientConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CyclesDocument {
    #[serde(default)]
    product: Option<String>,
    #[serde(default)]
    editions: Vec<EditionRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditionRow {
    period: Option<String>,
    #[serde(rename = "type")]
    type_code: Option<String>,
    effective_date: Option<String>,
    #[serde(default)]
    cycle_number: Option<serde_json::Value>,
    #[serde(default)]
    region: Option<String>,
}

impl EditionRow {
    fn into_record(self) -> Option<CycleRecord> {
        let period = Period::from_code(self.period.as_deref()?)?;
        let type_code = self.type_code.filter(|t| !t.trim().is_empty())?;
        let effective_date = parse_date(self.effective_date.as_deref()?)?;

        let mut record = CycleRecord::new(period, type_code.trim(), effective_date);
        record.cycle_number = self.cycle_number.and_then(|value| match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        record.region = self
            .region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Some(record)
    }
}

/// Accepts ISO dates and US `MM/DD/YYYY` dates
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

/// HTTP client for the cycle metadata service
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: Client,
    base_url: Url,
}

impl MetadataClient {
    /// Client against the default metadata service
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_base_url(config, services::METADATA_BASE_URL)
    }

    /// Client against a specific base URL
    pub fn with_base_url(config: &ClientConfig, base_url: &str) -> ClientResult<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            client: config.build_http_client()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn cycles_url(&self, type_code: &str, as_of: NaiveDate) -> FetchResult<Url> {
        let mut url = self
            .base_url
            .join(services::CYCLES_ENDPOINT)
            .map_err(|e| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                error: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("product", type_code)
            .append_pair("asOf", &as_of.format("%Y-%m-%d").to_string());
        Ok(url)
    }
}

/// Parse a base URL, making sure relative joins land beneath it
fn parse_base_url(base_url: &str) -> ClientResult<Url> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).map_err(|e| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        error: e.to_string(),
    })
}

#[async_trait]
impl CycleSource for MetadataClient {
    async fn fetch_cycles(&self, type_code: &str, as_of: NaiveDate) -> FetchResult<CycleSnapshot> {
        let url = self.cycles_url(type_code, as_of)?;
        tracing::debug!("Fetching cycle metadata: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let document: CyclesDocument = serde_json::from_slice(&body)?;
        if let Some(product) = document.product.as_deref() {
            if !product.eq_ignore_ascii_case(type_code) {
                tracing::warn!("Asked for {} cycles but received {}", type_code, product);
            }
        }

        let total = document.editions.len();
        let records: Vec<CycleRecord> = document
            .editions
            .into_iter()
            .filter_map(EditionRow::into_record)
            .collect();
        if records.len() < total {
            tracing::debug!(
                "Skipped {} unusable {} metadata rows",
                total - records.len(),
                type_code
            );
        }

        Ok(CycleSnapshot::new(type_code, records))
    }
}
