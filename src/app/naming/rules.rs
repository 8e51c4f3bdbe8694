//! Declarative naming table
//!
//! Each product family is described by a `FamilyDescriptor`: its cycle
//! schedule, known geographies, geography-level special cases, display-name
//! overrides and an ordered list of `NamingRule`s keyed by
//! (geography, series, format, changes-only).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::app::cycles::EpochSchedule;
use crate::app::models::{ProductFamily, ProductFormat, Series};
use crate::errors::{NamingError, NamingResult};

use super::template::Template;

/// Geography a rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GeographyMatch {
    /// Any geography the family knows
    Any,
    /// One upper-cased geography
    Exact(String),
}

impl GeographyMatch {
    pub fn exact(geography: &str) -> Self {
        Self::Exact(normalize_geography(geography))
    }

    fn matches(&self, geography: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == geography,
        }
    }
}

/// Deviation from the template for one index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IndexException {
    /// Use this file name instead of the template
    Rename(Template),
    /// Use this file name and consume the next index
    MergeWithNext(Template),
}

/// One (geography, series, format) → file naming branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingRule {
    pub geography: GeographyMatch,
    /// `None` when the family has no series
    pub series: Option<Series>,
    pub format: ProductFormat,
    /// Rule belongs to the changeset edition
    pub changes_only: bool,
    /// Number of discrete numbered parts
    pub set_count: u32,
    /// Distance between enumerated indices
    pub step: u32,
    pub directory: Template,
    pub file: Template,
    pub exceptions: BTreeMap<u32, IndexException>,
}

impl NamingRule {
    /// Single-part rule; adjust with the builder methods
    pub fn new(
        geography: GeographyMatch,
        series: Option<Series>,
        format: ProductFormat,
        directory: &str,
        file: &str,
    ) -> NamingResult<Self> {
        Ok(Self {
            geography,
            series,
            format,
            changes_only: false,
            set_count: 1,
            step: 1,
            directory: Template::parse(directory)?,
            file: Template::parse(file)?,
            exceptions: BTreeMap::new(),
        })
    }

    pub fn count(mut self, set_count: u32) -> Self {
        self.set_count = set_count;
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn changes_only(mut self) -> Self {
        self.changes_only = true;
        self
    }

    /// Replace the file name at `index`
    pub fn rename(mut self, index: u32, file: &str) -> NamingResult<Self> {
        self.exceptions
            .insert(index, IndexException::Rename(Template::parse(file)?));
        Ok(self)
    }

    /// Emit one combined file at `index` and skip the following index
    pub fn merge_with_next(mut self, index: u32, file: &str) -> NamingResult<Self> {
        self.exceptions
            .insert(index, IndexException::MergeWithNext(Template::parse(file)?));
        Ok(self)
    }

    fn matches(
        &self,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        changes_only: bool,
    ) -> bool {
        let series_matches = match self.series {
            None => true,
            Some(expected) => series == Some(expected),
        };
        self.format == format
            && self.changes_only == changes_only
            && series_matches
            && self.geography.matches(geography)
    }

    /// Indices this rule enumerates, before exceptions are applied
    pub fn indices(&self) -> impl Iterator<Item = u32> {
        (1..=self.set_count).step_by(self.step.max(1) as usize)
    }
}

/// Static configuration of one product family
#[derive(Debug, Clone, Serialize)]
pub struct FamilyDescriptor {
    pub family: ProductFamily,
    /// Present when cycle numbers are derived rather than delivered
    pub epoch: Option<EpochSchedule>,
    /// Upper-cased geographies; empty accepts any geography
    pub geographies: Vec<String>,
    /// Geography → literal relative path used instead of any rule
    pub special_cases: BTreeMap<String, Template>,
    /// Geography → display name used instead of title-casing
    pub name_overrides: BTreeMap<String, String>,
    pub rules: Vec<NamingRule>,
}

impl FamilyDescriptor {
    pub fn new(family: ProductFamily) -> Self {
        Self {
            family,
            epoch: None,
            geographies: Vec::new(),
            special_cases: BTreeMap::new(),
            name_overrides: BTreeMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_epoch(mut self, epoch: EpochSchedule) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_geographies(mut self, geographies: &[&str]) -> Self {
        self.geographies = geographies.iter().map(|g| normalize_geography(g)).collect();
        self
    }

    pub fn with_special_case(mut self, geography: &str, path: &str) -> NamingResult<Self> {
        self.special_cases
            .insert(normalize_geography(geography), Template::parse(path)?);
        Ok(self)
    }

    pub fn with_name_override(mut self, geography: &str, name: &str) -> Self {
        self.name_overrides
            .insert(normalize_geography(geography), name.to_string());
        self
    }

    pub fn with_rule(mut self, rule: NamingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Whether the family publishes `geography` (already normalized)
    pub fn knows_geography(&self, geography: &str) -> bool {
        self.geographies.is_empty() || self.geographies.iter().any(|g| g == geography)
    }

    /// Special-case path template for a normalized geography
    pub fn special_case(&self, geography: &str) -> Option<&Template> {
        self.special_cases.get(geography)
    }

    /// Most specific rule for a request; exact geography beats `Any`
    pub fn rule_for(
        &self,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        changes_only: bool,
    ) -> Option<&NamingRule> {
        let candidates = || {
            self.rules
                .iter()
                .filter(move |r| r.matches(geography, series, format, changes_only))
        };
        candidates()
            .find(|r| matches!(r.geography, GeographyMatch::Exact(_)))
            .or_else(|| candidates().next())
    }

    /// Configured set count, zero when no rule applies
    pub fn set_count(
        &self,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
    ) -> u32 {
        self.rule_for(geography, series, format, false)
            .map(|r| r.set_count)
            .unwrap_or(0)
    }

    /// Override the set count for one (geography, series, format)
    ///
    /// A wildcard rule is specialised into an exact-geography copy so the
    /// override does not leak into other geographies. Returns `false` when
    /// no rule matches.
    pub fn override_set_count(
        &mut self,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        count: u32,
    ) -> bool {
        self.specialise(geography, series, format, |rule| rule.set_count = count)
    }

    /// Replace the directory and/or file template for one
    /// (geography, series, format)
    ///
    /// Index exceptions of the rule are kept. Returns `false` when no rule
    /// matches.
    pub fn override_templates(
        &mut self,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        directory: Option<Template>,
        file: Option<Template>,
    ) -> bool {
        self.specialise(geography, series, format, |rule| {
            if let Some(directory) = directory {
                rule.directory = directory;
            }
            if let Some(file) = file {
                rule.file = file;
            }
        })
    }

    /// Apply `change` to the regular-edition rule for a geography, copying
    /// a wildcard rule into an exact one first
    fn specialise<F>(
        &mut self,
        geography: &str,
        series: Option<Series>,
        format: ProductFormat,
        change: F,
    ) -> bool
    where
        F: FnOnce(&mut NamingRule),
    {
        let geography = normalize_geography(geography);
        let position = self
            .rules
            .iter()
            .position(|r| {
                r.geography == GeographyMatch::Exact(geography.clone())
                    && r.matches(&geography, series, format, false)
            })
            .or_else(|| {
                self.rules
                    .iter()
                    .position(|r| r.matches(&geography, series, format, false))
            });

        let Some(position) = position else {
            return false;
        };

        if self.rules[position].geography == GeographyMatch::Any {
            let mut specialised = self.rules[position].clone();
            specialised.geography = GeographyMatch::Exact(geography);
            change(&mut specialised);
            self.rules.insert(position, specialised);
        } else {
            change(&mut self.rules[position]);
        }
        true
    }

    /// Name rendered for `{name}`
    pub fn display_name(&self, geography: &str) -> String {
        self.name_overrides
            .get(geography)
            .cloned()
            .unwrap_or_else(|| title_case(geography))
    }

    /// Reject rules that could never produce a path
    pub fn validate(&self) -> NamingResult<()> {
        for rule in &self.rules {
            if rule.step == 0 {
                return Err(NamingError::InvalidStep {
                    family: self.family.to_string(),
                    step: rule.step,
                });
            }
        }
        Ok(())
    }
}

/// Trim and upper-case a geography for lookups
pub fn normalize_geography(geography: &str) -> String {
    geography.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// `DALLAS-FT WORTH` → `Dallas-Ft_Worth`
pub fn title_case(geography: &str) -> String {
    geography
        .split_whitespace()
        .map(|word| {
            word.split('-')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join("_")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
