//! Cycle cache scenarios and shared test fixtures
//!
//! `FakeSource` stands in for the metadata service; `standard_source()`
//! carries a realistic record set for every product family and is reused by
//! the release tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::app::cycles::{CycleCache, CycleCacheConfig, CycleSource, RegionalCycles};
use crate::app::models::{CycleRecord, CycleSnapshot, Period, ProductFamily};
use crate::errors::{FetchError, FetchResult};

/// Scriptable in-memory metadata source
#[derive(Debug, Default)]
pub struct FakeSource {
    records: Mutex<HashMap<String, Vec<CycleRecord>>>,
    failing: AtomicBool,
    delay: Option<Duration>,
    stamp_generation: bool,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, family: ProductFamily, records: Vec<CycleRecord>) -> Self {
        self.set_records(family, records);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Overwrite every record's cycle number with the fetch count
    pub fn stamping_generation(mut self) -> Self {
        self.stamp_generation = true;
        self
    }

    pub fn set_records(&self, family: ProductFamily, records: Vec<CycleRecord>) {
        self.records
            .lock()
            .unwrap()
            .insert(family.metadata_code().to_string(), records);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CycleSource for FakeSource {
    async fn fetch_cycles(&self, type_code: &str, _as_of: NaiveDate) -> FetchResult<CycleSnapshot> {
        let generation = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::ServerError { status: 503 });
        }

        let mut records = self
            .records
            .lock()
            .unwrap()
            .get(type_code)
            .cloned()
            .unwrap_or_default();
        if self.stamp_generation {
            for record in &mut records {
                record.cycle_number = Some(generation.to_string());
            }
        }

        Ok(CycleSnapshot::new(type_code, records))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn chart_cycles(type_code: &str) -> Vec<CycleRecord> {
    vec![
        CycleRecord::new(Period::Current, type_code, date(2023, 10, 5)).with_cycle_number("2310"),
        CycleRecord::new(Period::Next, type_code, date(2023, 11, 30)).with_cycle_number("2311"),
    ]
}

fn digital_cycles() -> Vec<CycleRecord> {
    vec![
        CycleRecord::new(Period::Current, "28 DAY", date(2023, 10, 5)),
        CycleRecord::new(Period::Next, "28 DAY", date(2023, 11, 2)),
    ]
}

fn regional(region: &str, type_code: &str, current: NaiveDate, next: Option<NaiveDate>) -> Vec<CycleRecord> {
    let mut records = vec![CycleRecord::new(Period::Current, type_code, current)
        .with_cycle_number("1")
        .with_region(region)];
    if let Some(next) = next {
        records.push(
            CycleRecord::new(Period::Next, type_code, next)
                .with_cycle_number("2")
                .with_region(region),
        );
    }
    records
}

/// Source with current and next cycles for every family
pub fn standard_source() -> FakeSource {
    let mut helicopter = Vec::new();
    helicopter.extend(regional("Boston", "Helicopter_VFR", date(2023, 3, 23), Some(date(2025, 3, 20))));
    helicopter.extend(regional("New York", "Helicopter_VFR", date(2023, 9, 7), None));
    helicopter.extend(regional("U.S. Gulf Coast", "Helicopter_VFR", date(2022, 5, 19), None));

    let mut supplements = Vec::new();
    supplements.extend(regional("NE", "56 DAY", date(2023, 10, 5), Some(date(2023, 11, 30))));
    supplements.extend(regional("SE", "56 DAY", date(2023, 10, 5), Some(date(2023, 11, 30))));
    supplements.extend(regional("AK", "56 DAY", date(2023, 10, 5), None));

    FakeSource::new()
        .with_records(ProductFamily::Sectional, chart_cycles("56 DAY"))
        .with_records(ProductFamily::TerminalArea, chart_cycles("56 DAY"))
        .with_records(ProductFamily::IfrEnroute, chart_cycles("56 DAY"))
        .with_records(ProductFamily::Helicopter, helicopter)
        .with_records(ProductFamily::ChartSupplement, supplements)
        .with_records(ProductFamily::TerminalProcedures, digital_cycles())
        .with_records(ProductFamily::Cifp, digital_cycles())
}

fn cache_with(source: Arc<FakeSource>, age_limit: Duration) -> CycleCache {
    CycleCache::new(
        source,
        CycleCacheConfig::default()
            .with_age_limit(age_limit)
            .with_fetch_timeout(Duration::from_secs(5)),
    )
}

#[tokio::test]
async fn test_fresh_snapshot_is_served_without_fetch() {
    let source = Arc::new(standard_source());
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    let first = cache.get(ProductFamily::Sectional).await.unwrap();
    let second = cache.get(ProductFamily::Sectional).await.unwrap();

    assert_eq!(source.fetch_count(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.records(), second.records());
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().fetches, 1);
}

#[tokio::test]
async fn test_families_have_separate_slots() {
    let source = Arc::new(standard_source());
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    cache.get(ProductFamily::Sectional).await.unwrap();
    cache.get(ProductFamily::IfrEnroute).await.unwrap();
    cache.get(ProductFamily::Sectional).await.unwrap();

    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_stale_snapshot_is_refetched() {
    let source = Arc::new(standard_source());
    let cache = cache_with(source.clone(), Duration::ZERO);

    let first = cache.get(ProductFamily::Sectional).await.unwrap();
    let second = cache.get(ProductFamily::Sectional).await.unwrap();

    assert_eq!(source.fetch_count(), 2);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_force_refresh_ignores_freshness() {
    let source = Arc::new(standard_source());
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    cache.get(ProductFamily::IfrEnroute).await.unwrap();
    cache.force_refresh(ProductFamily::IfrEnroute).await.unwrap();

    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_fetch_failure_surfaces_as_absent_and_retries() {
    let source = Arc::new(standard_source());
    source.set_failing(true);
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    assert!(cache.get(ProductFamily::Sectional).await.is_none());
    assert_eq!(cache.stats().failures, 1);

    source.set_failing(false);
    assert!(cache.get(ProductFamily::Sectional).await.is_some());
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_failed_refresh_clears_populated_slot() {
    let source = Arc::new(standard_source());
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    let held = cache.get(ProductFamily::Sectional).await.unwrap();
    source.set_failing(true);

    assert!(cache.force_refresh(ProductFamily::Sectional).await.is_none());
    assert!(cache.peek(ProductFamily::Sectional).await.is_none());

    // A reader that obtained the snapshot earlier keeps it intact
    assert_eq!(held.len(), 2);
}

#[tokio::test]
async fn test_empty_snapshot_counts_as_missing() {
    let source = Arc::new(FakeSource::new());
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    assert!(cache.get(ProductFamily::Cifp).await.is_none());
    assert!(cache.get(ProductFamily::Cifp).await.is_none());
    assert_eq!(source.fetch_count(), 2);

    source.set_records(ProductFamily::Cifp, digital_cycles());
    assert!(cache.get(ProductFamily::Cifp).await.is_some());
}

#[tokio::test]
async fn test_fetch_timeout_is_a_failure() {
    let source = Arc::new(standard_source().with_delay(Duration::from_millis(200)));
    let cache = CycleCache::new(
        source,
        CycleCacheConfig::default().with_fetch_timeout(Duration::from_millis(20)),
    );

    assert!(cache.get(ProductFamily::Sectional).await.is_none());
    assert_eq!(cache.stats().failures, 1);
}

#[tokio::test]
async fn test_refresh_swaps_whole_snapshot() {
    let source = Arc::new(standard_source().stamping_generation());
    let cache = cache_with(source.clone(), Duration::from_secs(3600));

    let before = cache.get(ProductFamily::IfrEnroute).await.unwrap();
    let after = cache.force_refresh(ProductFamily::IfrEnroute).await.unwrap();

    assert!(before
        .records()
        .iter()
        .all(|r| r.cycle_number.as_deref() == Some("1")));
    assert!(after
        .records()
        .iter()
        .all(|r| r.cycle_number.as_deref() == Some("2")));
}

#[tokio::test]
async fn test_concurrent_readers_never_see_mixed_snapshots() {
    let source = Arc::new(
        standard_source()
            .stamping_generation()
            .with_delay(Duration::from_millis(2)),
    );
    let cache = Arc::new(cache_with(source.clone(), Duration::ZERO));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                let snapshot = cache.get(ProductFamily::Sectional).await.unwrap();
                let first = snapshot.records()[0].cycle_number.clone();
                assert!(snapshot.records().iter().all(|r| r.cycle_number == first));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_misses_share_one_fetch() {
    let source = Arc::new(standard_source().with_delay(Duration::from_millis(50)));
    let cache = Arc::new(cache_with(source.clone(), Duration::from_secs(3600)));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache.get(ProductFamily::TerminalArea).await.is_some()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_regional_table_follows_cache_refresh() {
    let source = Arc::new(standard_source());
    let cache = Arc::new(cache_with(source.clone(), Duration::from_secs(3600)));
    let regional = RegionalCycles::new(Arc::clone(&cache));

    let first = regional.table(ProductFamily::Helicopter).await.unwrap();
    let again = regional.table(ProductFamily::Helicopter).await.unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    cache.force_refresh(ProductFamily::Helicopter).await.unwrap();
    let rebuilt = regional.table(ProductFamily::Helicopter).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));

    let record = regional
        .lookup(ProductFamily::Helicopter, "boston", Period::Next)
        .await
        .unwrap();
    assert_eq!(record.effective_date, date(2025, 3, 20));
    assert!(regional
        .lookup(ProductFamily::Helicopter, "Chicago", Period::Current)
        .await
        .is_none());
}
