//! Built-in naming catalog
//!
//! Directory layouts and file names of the publication server, one
//! `FamilyDescriptor` per product family.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::cycles::EpochSchedule;
use crate::app::models::{ProductFamily, ProductFormat, Series};
use crate::constants::cycles;
use crate::errors::{ConfigError, NamingError, NamingResult};

use super::rules::{FamilyDescriptor, GeographyMatch, NamingRule};
use super::template::Template;

const SECTIONAL_GEOGRAPHIES: &[&str] = &[
    "Albuquerque", "Anchorage", "Atlanta", "Bethel", "Billings", "Brownsville",
    "Cape Lisburne", "Charlotte", "Cheyenne", "Chicago", "Cincinnati", "Cold Bay",
    "Dallas-Ft Worth", "Dawson", "Denver", "Detroit", "Dutch Harbor", "El Paso",
    "Fairbanks", "Great Falls", "Green Bay", "Halifax", "Hawaiian Islands", "Houston",
    "Jacksonville", "Juneau", "Kansas City", "Ketchikan", "Klamath Falls", "Kodiak",
    "Lake Huron", "Las Vegas", "Los Angeles", "McGrath", "Memphis", "Miami", "Montreal",
    "New Orleans", "New York", "Nome", "Omaha", "Phoenix", "Point Barrow",
    "Salt Lake City", "San Antonio", "San Francisco", "Seattle", "Seward", "St Louis",
    "Twin Cities", "Washington", "Western Aleutian Islands", "Whitehorse", "Wichita",
];

const TAC_GEOGRAPHIES: &[&str] = &[
    "Anchorage-Fairbanks", "Atlanta", "Baltimore-Washington", "Boston", "Charlotte",
    "Chicago", "Cincinnati", "Cleveland", "Colorado Springs", "Dallas-Ft Worth", "Denver",
    "Detroit", "Houston", "Kansas City", "Las Vegas", "Los Angeles", "Memphis", "Miami",
    "Minneapolis-St Paul", "New Orleans", "New York", "Orlando", "Philadelphia", "Phoenix",
    "Pittsburgh", "Portland", "Puerto Rico-VI", "St Louis", "Salt Lake City", "San Diego",
    "San Francisco", "Seattle", "Tampa",
];

const HELICOPTER_GEOGRAPHIES: &[&str] = &[
    "Baltimore-Washington", "Boston", "Chicago", "Dallas-Ft Worth", "Detroit",
    "Downtown Manhattan", "Eastern Long Island", "Houston North", "Houston South",
    "Los Angeles East", "Los Angeles West", "New York", "U.S. Gulf Coast", "Washington",
    "Washington Inset",
];

const SUPPLEMENT_REGIONS: &[&str] = &["NE", "NC", "NW", "SE", "SC", "SW", "EC", "AK", "PAC"];

const ENROUTE_GEOGRAPHIES: &[&str] = &["US", "Alaska", "Pacific", "Caribbean"];

/// All family descriptors, keyed by family
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    families: BTreeMap<ProductFamily, FamilyDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog describing the publication server layout
    pub fn builtin() -> NamingResult<Self> {
        let mut catalog = Self::new();
        catalog.insert(sectional()?);
        catalog.insert(terminal_area()?);
        catalog.insert(helicopter()?);
        catalog.insert(ifr_enroute()?);
        catalog.insert(chart_supplement()?);
        catalog.insert(terminal_procedures()?);
        catalog.insert(cifp()?);

        for descriptor in catalog.families.values() {
            descriptor.validate()?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, descriptor: FamilyDescriptor) {
        self.families.insert(descriptor.family, descriptor);
    }

    pub fn descriptor(&self, family: ProductFamily) -> Option<&FamilyDescriptor> {
        self.families.get(&family)
    }

    pub fn descriptor_mut(&mut self, family: ProductFamily) -> Option<&mut FamilyDescriptor> {
        self.families.get_mut(&family)
    }

    pub fn remove(&mut self, family: ProductFamily) -> Option<FamilyDescriptor> {
        self.families.remove(&family)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FamilyDescriptor> {
        self.families.values()
    }

    /// Apply a set-count override, failing when no rule matches
    pub fn override_set_count(
        &mut self,
        family: ProductFamily,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        count: u32,
    ) -> Result<(), ConfigError> {
        let applied = self
            .descriptor_mut(family)
            .map(|d| d.override_set_count(geography, series, format, count))
            .unwrap_or(false);
        if applied {
            Ok(())
        } else {
            Err(no_rule("set_counts", family, geography, series, format))
        }
    }

    /// Replace the directory and/or file-name template of one rule
    ///
    /// Templates are parsed before anything changes, so a bad template
    /// leaves the catalog untouched.
    pub fn override_templates(
        &mut self,
        family: ProductFamily,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        directory: Option<&str>,
        file: Option<&str>,
    ) -> Result<(), ConfigError> {
        let directory = directory.map(Template::parse).transpose()?;
        let file = file.map(Template::parse).transpose()?;

        let applied = self
            .descriptor_mut(family)
            .map(|d| d.override_templates(geography, series, format, directory, file))
            .unwrap_or(false);
        if applied {
            Ok(())
        } else {
            Err(no_rule("templates", family, geography, series, format))
        }
    }
}

fn no_rule(
    section: &str,
    family: ProductFamily,
    geography: &str,
    series: Option<Series>,
    format: ProductFormat,
) -> ConfigError {
    let series = series.map(|s| s.to_string()).unwrap_or_default();
    ConfigError::InvalidValue {
        field: format!("{}.{}", section, family),
        value: format!("{} {} {}", geography, series, format),
        reason: "no naming rule for this combination".to_string(),
    }
}

fn airac() -> NamingResult<EpochSchedule> {
    let epoch = cycles::AIRAC_EPOCH
        .parse::<NaiveDate>()
        .map_err(|_| NamingError::UnknownValue {
            field: "epoch",
            value: cycles::AIRAC_EPOCH.to_string(),
        })?;
    Ok(EpochSchedule::new(epoch, cycles::AIRAC_CYCLE_DAYS))
}

fn sectional() -> NamingResult<FamilyDescriptor> {
    FamilyDescriptor::new(ProductFamily::Sectional)
        .with_geographies(SECTIONAL_GEOGRAPHIES)
        .with_name_override("Hawaiian Islands", "Hawaiian")
        .with_name_override("McGrath", "McGrath")
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::GeoTiff,
            "visual/{mm-dd-yyyy}/sectional-files",
            "{name}.zip",
        )?)
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::Pdf,
            "visual/{mm-dd-yyyy}/PDFs",
            "{name}.zip",
        )?)
        .with_special_case(
            "Western Aleutian Islands",
            "visual/{mm-dd-yyyy}/sectional-files/Western_Aleutian_Islands_East.zip",
        )
}

fn terminal_area() -> NamingResult<FamilyDescriptor> {
    Ok(FamilyDescriptor::new(ProductFamily::TerminalArea)
        .with_geographies(TAC_GEOGRAPHIES)
        .with_name_override("Puerto Rico-VI", "Puerto_Rico-VI")
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::GeoTiff,
            "visual/{mm-dd-yyyy}/tac-files",
            "{name}_TAC.zip",
        )?)
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::Pdf,
            "visual/{mm-dd-yyyy}/PDFs",
            "{name}_TAC.zip",
        )?))
}

fn helicopter() -> NamingResult<FamilyDescriptor> {
    FamilyDescriptor::new(ProductFamily::Helicopter)
        .with_geographies(HELICOPTER_GEOGRAPHIES)
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::GeoTiff,
            "visual/{mm-dd-yyyy}/heli_files",
            "{name}_HEL.zip",
        )?)
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::Pdf,
            "visual/{mm-dd-yyyy}/PDFs",
            "{name}_HEL.zip",
        )?)
        .with_special_case(
            "U.S. Gulf Coast",
            "visual/{mm-dd-yyyy}/heli_files/US_Gulf_Coast_HEL.zip",
        )
}

fn ifr_enroute() -> NamingResult<FamilyDescriptor> {
    const DIR: &str = "enroute/{mm-dd-yyyy}";
    let rule = |geography: &str, series: Series, format: ProductFormat, file: &str| {
        NamingRule::new(GeographyMatch::exact(geography), Some(series), format, DIR, file)
    };
    use ProductFormat::{GeoTiff, Pdf};
    use Series::{Area, High, Low};

    let rules = vec![
        rule("US", Low, GeoTiff, "enr_l{index2}.zip")?.count(36),
        rule("US", Low, Pdf, "elus{index}.zip")?.count(36).step(2),
        rule("US", High, GeoTiff, "enr_h{index2}.zip")?.count(12),
        rule("US", High, Pdf, "ehus{index}.zip")?.count(12).step(2),
        rule("US", Area, GeoTiff, "enr_a.zip")?,
        rule("US", Area, Pdf, "area.zip")?,
        rule("Alaska", Low, GeoTiff, "enr_akl{index2}.zip")?
            .count(4)
            .merge_with_next(3, "enr_akl03_04.zip")?,
        rule("Alaska", Low, Pdf, "elak{index}.zip")?.count(4).step(2),
        rule("Alaska", High, GeoTiff, "enr_akh{index2}.zip")?.count(2),
        rule("Alaska", High, Pdf, "ehak{index}.zip")?.count(2).step(2),
        rule("Alaska", Area, GeoTiff, "enr_aka.zip")?.count(0),
        rule("Alaska", Area, Pdf, "akarea.zip")?.count(0),
        rule("Pacific", Low, GeoTiff, "enr_pl{index2}.zip")?.count(0),
        rule("Pacific", Low, Pdf, "elpa{index}.zip")?.count(0),
        rule("Pacific", High, GeoTiff, "enr_p{index2}.zip")?.count(2),
        rule("Pacific", High, Pdf, "ehpa{index}.zip")?.count(2).step(2),
        rule("Pacific", Area, GeoTiff, "enr_pa.zip")?.count(0),
        rule("Pacific", Area, Pdf, "paarea.zip")?.count(0),
        rule("Caribbean", Low, GeoTiff, "enr_cl{index2}.zip")?.count(2),
        rule("Caribbean", Low, Pdf, "elcb{index}.zip")?.count(2).step(2),
        rule("Caribbean", High, GeoTiff, "enr_ch{index2}.zip")?.count(2),
        rule("Caribbean", High, Pdf, "ehcb{index}.zip")?.count(2).step(2),
        rule("Caribbean", Area, GeoTiff, "enr_ca{index2}.zip")?.count(4),
        rule("Caribbean", Area, Pdf, "elcba{index}.zip")?
            .count(4)
            .rename(3, "elcb3.zip")?,
    ];

    Ok(rules.into_iter().fold(
        FamilyDescriptor::new(ProductFamily::IfrEnroute).with_geographies(ENROUTE_GEOGRAPHIES),
        FamilyDescriptor::with_rule,
    ))
}

fn chart_supplement() -> NamingResult<FamilyDescriptor> {
    Ok(FamilyDescriptor::new(ProductFamily::ChartSupplement)
        .with_geographies(SUPPLEMENT_REGIONS)
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::Pdf,
            "Upload_313-d/supplements",
            "CS_{region}_{yyyymmdd}.zip",
        )?))
}

fn terminal_procedures() -> NamingResult<FamilyDescriptor> {
    Ok(FamilyDescriptor::new(ProductFamily::TerminalProcedures)
        .with_epoch(airac()?)
        .with_geographies(&["US"])
        .with_rule(
            NamingRule::new(
                GeographyMatch::Any,
                None,
                ProductFormat::Pdf,
                "upload_313-d/terminal",
                "DDTPP{letter}_{yymmdd}.zip",
            )?
            .count(5),
        )
        .with_rule(
            NamingRule::new(
                GeographyMatch::Any,
                None,
                ProductFormat::Pdf,
                "d-tpp/{cycle}/compare_pdf",
                "DDTPP_Changes_{yymmdd}.zip",
            )?
            .changes_only(),
        ))
}

fn cifp() -> NamingResult<FamilyDescriptor> {
    Ok(FamilyDescriptor::new(ProductFamily::Cifp)
        .with_epoch(airac()?)
        .with_geographies(&["US"])
        .with_rule(NamingRule::new(
            GeographyMatch::Any,
            None,
            ProductFormat::Zip,
            "Upload_313-d/cifp",
            "CIFP_{yymmdd}.zip",
        )?))
}
