//! Data models for Chart Cycles
//!
//! This module defines the core data structures used throughout the
//! application: product families, editions, formats, and the cycle records
//! delivered by the metadata service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::cycles;
use crate::errors::NamingError;

/// A publication product line with its own naming and cycle conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    /// VFR sectional aeronautical charts
    Sectional,
    /// VFR terminal area charts
    TerminalArea,
    /// Helicopter route charts, published per city
    Helicopter,
    /// IFR enroute low, high and area charts
    IfrEnroute,
    /// Chart supplements, published per region
    ChartSupplement,
    /// Digital terminal procedures publication
    TerminalProcedures,
    /// Coded instrument flight procedures
    Cifp,
}

impl ProductFamily {
    /// Every family, in catalog order
    pub const ALL: [ProductFamily; 7] = [
        ProductFamily::Sectional,
        ProductFamily::TerminalArea,
        ProductFamily::Helicopter,
        ProductFamily::IfrEnroute,
        ProductFamily::ChartSupplement,
        ProductFamily::TerminalProcedures,
        ProductFamily::Cifp,
    ];

    /// Type code sent to the metadata service for this family
    pub fn metadata_code(&self) -> &'static str {
        match self {
            Self::Sectional => "SECTIONAL",
            Self::TerminalArea => "TAC",
            Self::Helicopter => "HELICOPTER",
            Self::IfrEnroute => "IFR_ENROUTE",
            Self::ChartSupplement => "CHART_SUPPLEMENT",
            Self::TerminalProcedures => "DTPP",
            Self::Cifp => "CIFP",
        }
    }

    /// Record type code selected from this family's snapshot
    pub fn cycle_type(&self) -> &'static str {
        match self {
            Self::Helicopter => cycles::TYPE_HELICOPTER,
            Self::TerminalProcedures | Self::Cifp => cycles::TYPE_28_DAY,
            _ => cycles::TYPE_56_DAY,
        }
    }

    /// Whether cycle records for this family are looked up per region
    pub fn is_regional(&self) -> bool {
        matches!(self, Self::Helicopter | Self::ChartSupplement)
    }

    /// Identifier used in configuration files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sectional => "sectional",
            Self::TerminalArea => "terminal_area",
            Self::Helicopter => "helicopter",
            Self::IfrEnroute => "ifr_enroute",
            Self::ChartSupplement => "chart_supplement",
            Self::TerminalProcedures => "terminal_procedures",
            Self::Cifp => "cifp",
        }
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductFamily {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "sectional" => Ok(Self::Sectional),
            "terminal_area" | "tac" => Ok(Self::TerminalArea),
            "helicopter" => Ok(Self::Helicopter),
            "ifr_enroute" | "enroute" => Ok(Self::IfrEnroute),
            "chart_supplement" | "supplement" => Ok(Self::ChartSupplement),
            "terminal_procedures" | "dtpp" | "d_tpp" => Ok(Self::TerminalProcedures),
            "cifp" => Ok(Self::Cifp),
            _ => Err(NamingError::UnknownFamily {
                name: s.to_string(),
            }),
        }
    }
}

/// Publication period of a cycle record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Period {
    Current,
    Next,
}

impl Period {
    /// Upper-case code as used by the metadata service
    pub fn code(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Next => "NEXT",
        }
    }

    /// Parse a period code case-insensitively
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CURRENT" => Some(Self::Current),
            "NEXT" => Some(Self::Next),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Edition requested by a caller
///
/// `Changeset` is the current edition restricted to changed products; it
/// reads the CURRENT cycle record and only changes which naming rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Current,
    Next,
    Changeset,
}

impl Edition {
    /// Period whose cycle record backs this edition
    pub fn period(&self) -> Period {
        match self {
            Self::Current | Self::Changeset => Period::Current,
            Self::Next => Period::Next,
        }
    }

    /// Whether only changed products are requested
    pub fn changes_only(&self) -> bool {
        matches!(self, Self::Changeset)
    }
}

impl FromStr for Edition {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "next" => Ok(Self::Next),
            "changeset" | "changes" => Ok(Self::Changeset),
            _ => Err(NamingError::UnknownValue {
                field: "edition",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Current => "current",
            Self::Next => "next",
            Self::Changeset => "changeset",
        };
        f.write_str(name)
    }
}

/// Delivery format of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductFormat {
    Pdf,
    GeoTiff,
    /// Raw data archive
    Zip,
}

impl FromStr for ProductFormat {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PDF" => Ok(Self::Pdf),
            "GEOTIFF" | "TIFF" | "TIF" => Ok(Self::GeoTiff),
            "ZIP" => Ok(Self::Zip),
            _ => Err(NamingError::UnknownValue {
                field: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProductFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "PDF",
            Self::GeoTiff => "GEOTIFF",
            Self::Zip => "ZIP",
        };
        f.write_str(name)
    }
}

/// Altitude series for IFR enroute charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Series {
    Low,
    High,
    Area,
}

impl FromStr for Series {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "HIGH" => Ok(Self::High),
            "AREA" => Ok(Self::Area),
            _ => Err(NamingError::UnknownValue {
                field: "series",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "LOW",
            Self::High => "HIGH",
            Self::Area => "AREA",
        };
        f.write_str(name)
    }
}

/// One publication cycle for a family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// CURRENT or NEXT
    pub period: Period,
    /// Family-specific type code (e.g. "56 DAY", "Helicopter_VFR")
    pub type_code: String,
    /// Date the cycle becomes effective
    pub effective_date: NaiveDate,
    /// Cycle number, when delivered or derived
    pub cycle_number: Option<String>,
    /// City or region name for per-region families
    pub region: Option<String>,
}

impl CycleRecord {
    /// Create a record without region or cycle number
    pub fn new(period: Period, type_code: impl Into<String>, effective_date: NaiveDate) -> Self {
        Self {
            period,
            type_code: type_code.into(),
            effective_date,
            cycle_number: None,
            region: None,
        }
    }

    /// Attach a cycle number
    pub fn with_cycle_number(mut self, cycle_number: impl Into<String>) -> Self {
        self.cycle_number = Some(cycle_number.into());
        self
    }

    /// Attach a city or region name
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Check whether this record has the given type code (case-insensitive)
    pub fn is_type(&self, type_code: &str) -> bool {
        self.type_code.eq_ignore_ascii_case(type_code)
    }
}

/// Cycle records returned by one metadata fetch
///
/// Immutable after construction; the cache hands out shared `Arc`s so a
/// reader keeps the snapshot it obtained even while a refresh swaps in a
/// newer one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    name: String,
    fetched_at: DateTime<Utc>,
    records: Vec<CycleRecord>,
}

impl CycleSnapshot {
    /// Create a snapshot stamped with the current time
    pub fn new(name: impl Into<String>, records: Vec<CycleRecord>) -> Self {
        Self::fetched_at(name, records, Utc::now())
    }

    /// Create a snapshot with an explicit fetch time
    pub fn fetched_at(
        name: impl Into<String>,
        records: Vec<CycleRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            fetched_at,
            records,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fetched_at_time(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn records(&self) -> &[CycleRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// First non-regional record for a period and type
    pub fn find(&self, period: Period, type_code: &str) -> Option<&CycleRecord> {
        self.records
            .iter()
            .find(|r| r.region.is_none() && r.period == period && r.is_type(type_code))
    }
}
