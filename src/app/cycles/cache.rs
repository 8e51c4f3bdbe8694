//! Time-bounded cache of cycle snapshots
//!
//! One slot per product family. A slot is refreshed by fetching a complete
//! snapshot first and then swapping the shared `Arc` under a short write
//! lock, so readers observe either the previous snapshot or the new one in
//! its entirety. Failed fetches clear the slot instead of serving old data.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::app::models::{CycleSnapshot, ProductFamily};
use crate::errors::FetchError;

use super::config::CycleCacheConfig;
use super::source::CycleSource;

/// Per-family cache of cycle metadata
pub struct CycleCache {
    source: Arc<dyn CycleSource>,
    config: CycleCacheConfig,
    entries: RwLock<HashMap<ProductFamily, Arc<CacheEntry>>>,
    counters: Counters,
}

/// Mutable slot for one family
#[derive(Debug, Default)]
struct CacheEntry {
    state: RwLock<EntryState>,
    /// Serializes refreshes of this slot
    refresh: Mutex<()>,
}

/// Contents of a slot, always replaced as a whole
#[derive(Debug, Clone, Default)]
struct EntryState {
    snapshot: Option<Arc<CycleSnapshot>>,
    last_fetch: Option<DateTime<Utc>>,
}

impl EntryState {
    /// Snapshot if it is non-empty and younger than `age_limit`
    fn fresh_snapshot(&self, age_limit: Duration, now: DateTime<Utc>) -> Option<Arc<CycleSnapshot>> {
        let snapshot = self.snapshot.as_ref()?;
        let last_fetch = self.last_fetch?;
        if snapshot.is_empty() {
            return None;
        }

        // A fetch time in the future means the clock went backwards
        let Ok(age) = now.signed_duration_since(last_fetch).to_std() else {
            return None;
        };
        if age >= age_limit {
            None
        } else {
            Some(Arc::clone(snapshot))
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads served without a fetch
    pub hits: u64,
    /// Metadata fetches attempted
    pub fetches: u64,
    /// Fetches that failed, timed out or returned nothing
    pub failures: u64,
}

impl fmt::Debug for CycleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl CycleCache {
    /// Create an empty cache backed by `source`
    pub fn new(source: Arc<dyn CycleSource>, config: CycleCacheConfig) -> Self {
        Self {
            source,
            config,
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CycleCacheConfig {
        &self.config
    }

    /// Snapshot for `family`, fetching it when missing or stale
    ///
    /// Returns `None` when the metadata service could not deliver a usable
    /// snapshot; callers treat that as "cycle metadata unavailable".
    pub async fn get(&self, family: ProductFamily) -> Option<Arc<CycleSnapshot>> {
        let entry = self.entry(family).await;

        if let Some(snapshot) = self.fresh(&entry).await {
            debug!("Cycle cache hit for {}", family);
            return Some(snapshot);
        }

        let _refresh = entry.refresh.lock().await;

        // Another caller may have refreshed the slot while we waited
        if let Some(snapshot) = self.fresh(&entry).await {
            debug!("Cycle cache filled by concurrent refresh for {}", family);
            return Some(snapshot);
        }

        self.refresh_entry(family, &entry).await
    }

    /// Refetch the snapshot for `family` regardless of its age
    pub async fn force_refresh(&self, family: ProductFamily) -> Option<Arc<CycleSnapshot>> {
        let entry = self.entry(family).await;
        let _refresh = entry.refresh.lock().await;
        self.refresh_entry(family, &entry).await
    }

    /// Currently cached snapshot without fetching or checking its age
    pub async fn peek(&self, family: ProductFamily) -> Option<Arc<CycleSnapshot>> {
        let entries = self.entries.read().await;
        let entry = entries.get(&family)?;
        let state = entry.state.read().await;
        state.snapshot.clone()
    }

    /// Get current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    async fn entry(&self, family: ProductFamily) -> Arc<CacheEntry> {
        if let Some(entry) = self.entries.read().await.get(&family) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(family).or_default())
    }

    async fn fresh(&self, entry: &CacheEntry) -> Option<Arc<CycleSnapshot>> {
        let snapshot = entry
            .state
            .read()
            .await
            .fresh_snapshot(self.config.age_limit, Utc::now())?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Some(snapshot)
    }

    /// Fetch, then swap the slot contents in one write
    async fn refresh_entry(
        &self,
        family: ProductFamily,
        entry: &CacheEntry,
    ) -> Option<Arc<CycleSnapshot>> {
        let type_code = family.metadata_code();
        let as_of = Utc::now().date_naive();
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);

        let fetched = match tokio::time::timeout(
            self.config.fetch_timeout,
            self.source.fetch_cycles(type_code, as_of),
        )
        .await
        {
            Ok(Ok(snapshot)) if snapshot.is_empty() => Err(FetchError::Empty {
                type_code: type_code.to_string(),
            }),
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(FetchError::Timeout {
                seconds: self.config.fetch_timeout.as_secs(),
            }),
        };

        match fetched {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let mut state = entry.state.write().await;
                *state = EntryState {
                    snapshot: Some(Arc::clone(&snapshot)),
                    last_fetch: Some(Utc::now()),
                };
                info!(
                    "Refreshed {} cycle metadata ({} records)",
                    family,
                    snapshot.len()
                );
                Some(snapshot)
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Cycle metadata fetch for {} failed: {}", family, e);
                let mut state = entry.state.write().await;
                *state = EntryState::default();
                None
            }
        }
    }
}
