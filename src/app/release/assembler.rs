//! Release assembly
//!
//! Orchestrates one resolution: cycle lookup, then path building, then
//! availability probing. Every failure along the way is folded into the
//! returned `ResolutionResult`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::cycles::{CycleCache, RegionalCycles};
use crate::app::models::{CycleRecord, Edition, ProductFamily, ProductFormat, Series};
use crate::app::naming::{CandidatePath, FamilyDescriptor, PathQuery, PathResolver};

use super::probe::AvailabilityProbe;
use super::result::{ResolutionOutcome, ResolutionResult};

/// Per-family download settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSettings {
    /// Base URL candidate paths are resolved against
    pub base_url: Url,
    /// Probe candidates before returning them
    pub verify_availability: bool,
}

impl ProductSettings {
    /// Settings with verification on
    ///
    /// A trailing slash is added to the base path so candidate paths land
    /// beneath its last segment instead of replacing it.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.cannot_be_a_base() && !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            verify_availability: true,
        }
    }

    pub fn with_verification(mut self, verify_availability: bool) -> Self {
        self.verify_availability = verify_availability;
        self
    }
}

/// Resolves editions and downloadable releases
pub struct ReleaseAssembler {
    cache: Arc<CycleCache>,
    regional: RegionalCycles,
    resolver: PathResolver,
    prober: Arc<dyn AvailabilityProbe>,
    defaults: ProductSettings,
    products: HashMap<ProductFamily, ProductSettings>,
}

impl fmt::Debug for ReleaseAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseAssembler")
            .field("cache", &self.cache)
            .field("defaults", &self.defaults)
            .field("products", &self.products)
            .finish_non_exhaustive()
    }
}

impl ReleaseAssembler {
    pub fn new(
        cache: Arc<CycleCache>,
        resolver: PathResolver,
        prober: Arc<dyn AvailabilityProbe>,
        defaults: ProductSettings,
    ) -> Self {
        Self {
            regional: RegionalCycles::new(Arc::clone(&cache)),
            cache,
            resolver,
            prober,
            defaults,
            products: HashMap::new(),
        }
    }

    /// Override settings for one family
    pub fn with_product_settings(mut self, family: ProductFamily, settings: ProductSettings) -> Self {
        self.products.insert(family, settings);
        self
    }

    pub fn cache(&self) -> &Arc<CycleCache> {
        &self.cache
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Effective settings for `family`
    pub fn settings(&self, family: ProductFamily) -> &ProductSettings {
        self.products.get(&family).unwrap_or(&self.defaults)
    }

    /// Cycle record backing an edition, without building paths
    ///
    /// Per-region families need `geography`; others ignore it. Families with
    /// an epoch schedule get a derived cycle number when the record carries
    /// none.
    pub async fn resolve_edition_only(
        &self,
        family: ProductFamily,
        edition: Edition,
        geography: Option<&str>,
    ) -> Option<CycleRecord> {
        let descriptor = self.resolver.descriptor(family)?;
        self.cycle_record(descriptor, edition, geography).await
    }

    /// Resolve the downloadable files of one release
    pub async fn resolve_release(
        &self,
        family: ProductFamily,
        edition: Edition,
        geography: &str,
        format: ProductFormat,
        series: Option<Series>,
    ) -> ResolutionResult {
        let Some(descriptor) = self.resolver.descriptor(family) else {
            warn!("No naming descriptor configured for {}", family);
            return ResolutionResult::empty(ResolutionOutcome::UnknownFamily, None);
        };

        let Some(record) = self.cycle_record(descriptor, edition, Some(geography)).await else {
            debug!("No {} cycle record for {} {}", edition, family, geography);
            return ResolutionResult::empty(ResolutionOutcome::MetadataUnavailable, None);
        };

        let mut query = PathQuery::new(family, geography, format)
            .with_changes_only(edition.changes_only());
        if let Some(series) = series {
            query = query.with_series(series);
        }

        let settings = self.settings(family);
        let located = locate(self.resolver.resolve(&query, &record), &settings.base_url);
        if located.is_empty() {
            debug!("No candidate paths for {:?}", query);
            return ResolutionResult::empty(ResolutionOutcome::NoCandidatePaths, Some(record));
        }

        if !settings.verify_availability {
            debug!(
                "Verification disabled for {}, returning {} unverified paths",
                family,
                located.len()
            );
            let mut result = ResolutionResult::empty(ResolutionOutcome::Unverified, Some(record));
            for (path, url) in located {
                result.urls.push(url.to_string());
                result.candidate_paths.push(path);
            }
            return result;
        }

        let probes = join_all(located.iter().map(|(_, url)| self.prober.probe(url))).await;

        let mut availability = BTreeMap::new();
        let mut candidate_paths = Vec::new();
        let mut urls = Vec::new();
        for ((path, url), available) in located.into_iter().zip(probes) {
            availability.insert(path.relative_path().to_string(), available);
            if available {
                urls.push(url.to_string());
                candidate_paths.push(path);
            }
        }

        let outcome = if candidate_paths.is_empty() {
            ResolutionOutcome::AllCandidatesUnreachable
        } else {
            ResolutionOutcome::Available
        };
        info!(
            "Resolved {} {} {} {}: {}/{} available",
            family,
            edition,
            geography,
            format,
            candidate_paths.len(),
            availability.len()
        );

        let mut result = ResolutionResult::empty(outcome, Some(record));
        result.candidate_paths = candidate_paths;
        result.urls = urls;
        result.availability = availability;
        result
    }

    async fn cycle_record(
        &self,
        descriptor: &FamilyDescriptor,
        edition: Edition,
        geography: Option<&str>,
    ) -> Option<CycleRecord> {
        let family = descriptor.family;
        let period = edition.period();

        let mut record = if family.is_regional() {
            let Some(region) = geography else {
                debug!("{} is published per region but no geography was given", family);
                return None;
            };
            self.regional.lookup(family, region, period).await?
        } else {
            let snapshot = self.cache.get(family).await?;
            snapshot.find(period, family.cycle_type()).cloned()?
        };

        if record.cycle_number.is_none() {
            if let Some(schedule) = descriptor.epoch {
                // Dates before the epoch leave the number absent
                record.cycle_number = schedule
                    .cycle_at(record.effective_date)
                    .map(|n| n.to_string());
            }
        }

        Some(record)
    }
}

/// Resolve each candidate against `base`, dropping malformed ones
fn locate(candidates: Vec<CandidatePath>, base: &Url) -> Vec<(CandidatePath, Url)> {
    candidates
        .into_iter()
        .filter_map(|path| match path.resolve(base) {
            Ok(url) => Some((path, url)),
            Err(e) => {
                warn!("Dropping malformed candidate: {}", e);
                None
            }
        })
        .collect()
}
