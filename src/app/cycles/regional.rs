//! Per-region cycle lookup
//!
//! Families published per city or region carry one record per
//! (region, period, type). The lookup table is built wholesale from a cached
//! snapshot and replaced, never mutated, whenever that snapshot changes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::app::models::{CycleRecord, CycleSnapshot, Period, ProductFamily};
use crate::app::naming::normalize_geography;

use super::cache::CycleCache;

/// Upper-cased (region, period, type) key; the region is whitespace-normalized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionalKey {
    region: String,
    period: String,
    chart_type: String,
}

impl RegionalKey {
    pub fn new(region: &str, period: &str, chart_type: &str) -> Self {
        Self {
            region: normalize_geography(region),
            period: period.trim().to_uppercase(),
            chart_type: chart_type.trim().to_uppercase(),
        }
    }
}

/// Immutable (region, period, type) → record map
#[derive(Debug, Clone, Default)]
pub struct RegionalCycleTable {
    records: HashMap<RegionalKey, CycleRecord>,
    duplicates: usize,
}

impl RegionalCycleTable {
    /// Build a table from every regional record in `snapshot`
    ///
    /// Later records replace earlier ones under the same key. Duplicates
    /// point at a problem in the upstream feed and are logged.
    pub fn build(snapshot: &CycleSnapshot) -> Self {
        let mut records = HashMap::with_capacity(snapshot.len());
        let mut duplicates = 0;

        for record in snapshot.records() {
            let Some(region) = record.region.as_deref() else {
                continue;
            };
            let key = RegionalKey::new(region, record.period.code(), &record.type_code);
            if let Some(previous) = records.insert(key, record.clone()) {
                duplicates += 1;
                warn!(
                    "Duplicate regional cycle record for {} {} {} in {} (effective {} replaced by {})",
                    region,
                    record.period,
                    record.type_code,
                    snapshot.name(),
                    previous.effective_date,
                    record.effective_date
                );
            }
        }

        debug!(
            "Built regional cycle table for {} with {} entries",
            snapshot.name(),
            records.len()
        );

        Self {
            records,
            duplicates,
        }
    }

    /// Record for a region, period and chart type
    pub fn lookup(&self, region: &str, period: Period, chart_type: &str) -> Option<&CycleRecord> {
        self.records
            .get(&RegionalKey::new(region, period.code(), chart_type))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that replaced an earlier record with the same key
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Regional tables kept in step with the cycle cache
#[derive(Debug)]
pub struct RegionalCycles {
    cache: Arc<CycleCache>,
    tables: RwLock<HashMap<ProductFamily, BuiltTable>>,
}

#[derive(Debug, Clone)]
struct BuiltTable {
    source: Arc<CycleSnapshot>,
    table: Arc<RegionalCycleTable>,
}

impl RegionalCycles {
    pub fn new(cache: Arc<CycleCache>) -> Self {
        Self {
            cache,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Table for `family`, rebuilt if the cached snapshot was replaced
    pub async fn table(&self, family: ProductFamily) -> Option<Arc<RegionalCycleTable>> {
        let snapshot = self.cache.get(family).await?;

        if let Some(built) = self.tables.read().await.get(&family) {
            if Arc::ptr_eq(&built.source, &snapshot) {
                return Some(Arc::clone(&built.table));
            }
        }

        let table = Arc::new(RegionalCycleTable::build(&snapshot));
        let mut tables = self.tables.write().await;
        tables.insert(
            family,
            BuiltTable {
                source: snapshot,
                table: Arc::clone(&table),
            },
        );
        Some(table)
    }

    /// Record for one region of `family`
    pub async fn lookup(
        &self,
        family: ProductFamily,
        region: &str,
        period: Period,
    ) -> Option<CycleRecord> {
        let table = self.table(family).await?;
        table.lookup(region, period, family.cycle_type()).cloned()
    }
}
