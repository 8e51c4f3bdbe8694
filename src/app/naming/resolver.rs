//! Path resolution
//!
//! Turns a (family, geography, format, series, edition) request plus the
//! cycle record backing it into the ordered list of candidate download
//! paths. Pure computation: nothing here touches the network.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::app::models::{CycleRecord, ProductFamily, ProductFormat, Series};
use crate::errors::NamingResult;

use super::catalog::Catalog;
use super::path::{CandidatePath, PathBuilder};
use super::rules::{normalize_geography, FamilyDescriptor, IndexException, NamingRule};
use super::template::{RenderContext, Template};

/// One path request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathQuery {
    pub family: ProductFamily,
    pub geography: String,
    pub format: ProductFormat,
    pub series: Option<Series>,
    pub changes_only: bool,
}

impl PathQuery {
    pub fn new(family: ProductFamily, geography: impl Into<String>, format: ProductFormat) -> Self {
        Self {
            family,
            geography: geography.into(),
            format,
            series: None,
            changes_only: false,
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series = Some(series);
        self
    }

    pub fn with_changes_only(mut self, changes_only: bool) -> Self {
        self.changes_only = changes_only;
        self
    }
}

/// Computes candidate paths from the naming catalog
#[derive(Debug, Clone)]
pub struct PathResolver {
    catalog: Arc<Catalog>,
}

impl PathResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Resolver over the built-in catalog
    pub fn builtin() -> NamingResult<Self> {
        Ok(Self::new(Arc::new(Catalog::builtin()?)))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn descriptor(&self, family: ProductFamily) -> Option<&FamilyDescriptor> {
        self.catalog.descriptor(family)
    }

    /// Candidate paths for `query` against `record`, in enumeration order
    ///
    /// Unknown geographies and combinations whose set count is zero yield an
    /// empty list. Deterministic for identical inputs.
    pub fn resolve(&self, query: &PathQuery, record: &CycleRecord) -> Vec<CandidatePath> {
        let Some(descriptor) = self.catalog.descriptor(query.family) else {
            debug!("No naming descriptor for {}", query.family);
            return Vec::new();
        };

        let geography = normalize_geography(&query.geography);
        let name = descriptor.display_name(&geography);
        let cycle = record.cycle_number.as_deref();
        let render = |template: &Template, index: u32| {
            template.render(&RenderContext {
                effective_date: record.effective_date,
                cycle,
                index,
                name: &name,
                region: &geography,
            })
        };

        if !query.changes_only {
            if let Some(special) = descriptor.special_case(&geography) {
                debug!("Special case path for {} {}", query.family, geography);
                return render(special, 1)
                    .map_err(|e| e.to_string())
                    .and_then(|path| PathBuilder::from_rendered(&path).map_err(|e| e.to_string()))
                    .map(|path| vec![path])
                    .unwrap_or_else(|e| {
                        warn!("Dropping special case path for {}: {}", geography, e);
                        Vec::new()
                    });
            }
        }

        if !descriptor.knows_geography(&geography) {
            debug!("{} does not publish geography {}", query.family, geography);
            return Vec::new();
        }

        let Some(rule) =
            descriptor.rule_for(&geography, query.series, query.format, query.changes_only)
        else {
            debug!(
                "No naming rule for {} {} {:?} {} (changes only: {})",
                query.family, geography, query.series, query.format, query.changes_only
            );
            return Vec::new();
        };

        enumerate(rule, render)
    }
}

/// Walk a rule's indices, applying exceptions
fn enumerate<F>(rule: &NamingRule, render: F) -> Vec<CandidatePath>
where
    F: Fn(&Template, u32) -> NamingResult<String>,
{
    let directory = match render(&rule.directory, 1) {
        Ok(directory) => directory,
        Err(e) => {
            warn!("Cannot render directory {}: {}", rule.directory, e);
            return Vec::new();
        }
    };

    let mut paths = Vec::with_capacity(rule.set_count as usize);
    let mut skip_next = None;

    for index in rule.indices() {
        if skip_next == Some(index) {
            continue;
        }

        let file = match rule.exceptions.get(&index) {
            Some(IndexException::Rename(template)) => render(template, index),
            Some(IndexException::MergeWithNext(template)) => {
                skip_next = Some(index + rule.step.max(1));
                render(template, index)
            }
            None => render(&rule.file, index),
        };

        let built = file.map_err(|e| e.to_string()).and_then(|file| {
            PathBuilder::default()
                .dirs(&directory)
                .and_then(|b| b.file(&file))
                .map_err(|e| e.to_string())
        });

        match built {
            Ok(path) => paths.push(path),
            Err(e) => warn!("Dropping candidate {} of {}: {}", index, rule.file, e),
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Period;
    use chrono::NaiveDate;

    fn resolver() -> PathResolver {
        PathResolver::builtin().unwrap()
    }

    fn record(y: i32, m: u32, d: u32) -> CycleRecord {
        CycleRecord::new(Period::Current, "56 DAY", NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn names(paths: &[CandidatePath]) -> Vec<String> {
        paths.iter().map(|p| p.file_name().to_string()).collect()
    }

    #[test]
    fn test_enroute_us_low_geotiff() {
        let query = PathQuery::new(ProductFamily::IfrEnroute, "US", ProductFormat::GeoTiff)
            .with_series(Series::Low);
        let paths = resolver().resolve(&query, &record(2023, 10, 5));

        assert_eq!(paths.len(), 36);
        assert_eq!(paths[0].relative_path(), "enroute/10-05-2023/enr_l01.zip");
        assert_eq!(paths[35].relative_path(), "enroute/10-05-2023/enr_l36.zip");
    }

    #[test]
    fn test_enroute_us_low_pdf_steps_by_two() {
        let query = PathQuery::new(ProductFamily::IfrEnroute, "US", ProductFormat::Pdf)
            .with_series(Series::Low);
        let paths = resolver().resolve(&query, &record(2023, 10, 5));

        assert_eq!(paths.len(), 18);
        assert_eq!(paths[0].file_name(), "elus1.zip");
        assert_eq!(paths[1].file_name(), "elus3.zip");
        assert_eq!(paths[17].file_name(), "elus35.zip");
    }

    #[test]
    fn test_caribbean_area_rename() {
        let query = PathQuery::new(ProductFamily::IfrEnroute, "Caribbean", ProductFormat::Pdf)
            .with_series(Series::Area);
        let paths = resolver().resolve(&query, &record(2023, 10, 5));

        assert_eq!(
            names(&paths),
            vec!["elcba1.zip", "elcba2.zip", "elcb3.zip", "elcba4.zip"]
        );
    }

    #[test]
    fn test_alaska_low_merges_three_and_four() {
        let query = PathQuery::new(ProductFamily::IfrEnroute, "alaska", ProductFormat::GeoTiff)
            .with_series(Series::Low);
        let paths = resolver().resolve(&query, &record(2023, 10, 5));

        assert_eq!(
            names(&paths),
            vec!["enr_akl01.zip", "enr_akl02.zip", "enr_akl03_04.zip"]
        );
    }

    #[test]
    fn test_zero_set_counts_yield_nothing() {
        let resolver = resolver();
        for (geography, series) in [
            ("Pacific", Series::Low),
            ("Alaska", Series::Area),
            ("Pacific", Series::Area),
        ] {
            for format in [ProductFormat::GeoTiff, ProductFormat::Pdf] {
                let query = PathQuery::new(ProductFamily::IfrEnroute, geography, format)
                    .with_series(series);
                assert!(resolver.resolve(&query, &record(2023, 10, 5)).is_empty());
            }
        }
    }

    #[test]
    fn test_special_case_wins_for_every_format() {
        let resolver = resolver();
        for format in [ProductFormat::GeoTiff, ProductFormat::Pdf] {
            let query = PathQuery::new(ProductFamily::Sectional, "Western Aleutian Islands", format);
            let paths = resolver.resolve(&query, &record(2023, 10, 5));
            assert_eq!(paths.len(), 1);
            assert_eq!(
                paths[0].relative_path(),
                "visual/10-05-2023/sectional-files/Western_Aleutian_Islands_East.zip"
            );
        }

        let query = PathQuery::new(ProductFamily::Helicopter, "U.S. Gulf Coast", ProductFormat::Pdf);
        let paths = resolver.resolve(&query, &record(2022, 5, 19));
        assert_eq!(
            paths[0].relative_path(),
            "visual/05-19-2022/heli_files/US_Gulf_Coast_HEL.zip"
        );
    }

    #[test]
    fn test_name_overrides_and_title_case() {
        let resolver = resolver();
        let date = record(2023, 10, 5);

        let query = PathQuery::new(ProductFamily::Sectional, "Hawaiian Islands", ProductFormat::GeoTiff);
        assert_eq!(names(&resolver.resolve(&query, &date)), vec!["Hawaiian.zip"]);

        let query = PathQuery::new(ProductFamily::TerminalArea, "Puerto Rico-VI", ProductFormat::Pdf);
        assert_eq!(
            resolver.resolve(&query, &date)[0].relative_path(),
            "visual/10-05-2023/PDFs/Puerto_Rico-VI_TAC.zip"
        );

        let query = PathQuery::new(ProductFamily::Sectional, "McGrath", ProductFormat::Pdf);
        assert_eq!(names(&resolver.resolve(&query, &date)), vec!["McGrath.zip"]);

        let query = PathQuery::new(ProductFamily::TerminalArea, "Dallas-Ft Worth", ProductFormat::GeoTiff);
        assert_eq!(
            resolver.resolve(&query, &date)[0].relative_path(),
            "visual/10-05-2023/tac-files/Dallas-Ft_Worth_TAC.zip"
        );
    }

    #[test]
    fn test_unknown_geography_is_empty() {
        let query = PathQuery::new(ProductFamily::Sectional, "Atlantis", ProductFormat::Pdf);
        assert!(resolver().resolve(&query, &record(2023, 10, 5)).is_empty());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = resolver();
        let query = PathQuery::new(ProductFamily::IfrEnroute, "US", ProductFormat::Pdf)
            .with_series(Series::High);
        let first = resolver.resolve(&query, &record(2023, 10, 5));
        let second = resolver.resolve(&query, &record(2023, 10, 5));
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["ehus1.zip", "ehus3.zip", "ehus5.zip", "ehus7.zip", "ehus9.zip", "ehus11.zip"]);
    }

    #[test]
    fn test_terminal_procedures_volumes_and_changeset() {
        let resolver = resolver();
        let mut current = record(2023, 10, 5);
        current.cycle_number = Some("50".to_string());

        let query = PathQuery::new(ProductFamily::TerminalProcedures, "US", ProductFormat::Pdf);
        assert_eq!(
            names(&resolver.resolve(&query, &current)),
            vec![
                "DDTPPA_231005.zip",
                "DDTPPB_231005.zip",
                "DDTPPC_231005.zip",
                "DDTPPD_231005.zip",
                "DDTPPE_231005.zip",
            ]
        );

        let changes = query.clone().with_changes_only(true);
        let paths = resolver.resolve(&changes, &current);
        assert_eq!(paths.len(), 1);
        assert_eq!(
            paths[0].relative_path(),
            "d-tpp/50/compare_pdf/DDTPP_Changes_231005.zip"
        );
    }

    #[test]
    fn test_changeset_without_cycle_number_is_dropped() {
        let query = PathQuery::new(ProductFamily::TerminalProcedures, "US", ProductFormat::Pdf)
            .with_changes_only(true);
        assert!(resolver().resolve(&query, &record(2023, 10, 5)).is_empty());
    }

    #[test]
    fn test_changeset_on_family_without_changes_rules() {
        let query = PathQuery::new(ProductFamily::Sectional, "Seattle", ProductFormat::Pdf)
            .with_changes_only(true);
        assert!(resolver().resolve(&query, &record(2023, 10, 5)).is_empty());

        let query = PathQuery::new(ProductFamily::Sectional, "Western Aleutian Islands", ProductFormat::Pdf)
            .with_changes_only(true);
        assert!(resolver().resolve(&query, &record(2023, 10, 5)).is_empty());
    }

    #[test]
    fn test_supplement_and_cifp() {
        let resolver = resolver();
        let query = PathQuery::new(ProductFamily::ChartSupplement, "ne", ProductFormat::Pdf);
        assert_eq!(
            resolver.resolve(&query, &record(2023, 10, 5))[0].relative_path(),
            "Upload_313-d/supplements/CS_NE_20231005.zip"
        );

        let query = PathQuery::new(ProductFamily::Cifp, "US", ProductFormat::Zip);
        assert_eq!(
            resolver.resolve(&query, &record(2023, 11, 2))[0].relative_path(),
            "Upload_313-d/cifp/CIFP_231102.zip"
        );
    }
}
