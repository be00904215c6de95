// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Time-boxed memoization in front of a [`UsageSource`].
//!
//! Entries are keyed by the raw signature string, so two spellings that resolve
//! to the same tag are cached separately. An entry younger than the TTL is
//! returned as-is; anything older is refetched and overwritten. Entries are
//! never evicted on their own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::source::UsageSource;
use crate::types::MetricsRecord;

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;

/// Default freshness window (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);

struct CacheEntry {
    record: MetricsRecord,
    fetched_at: Instant,
}

impl CacheEntry {
    fn new(record: MetricsRecord) -> Self {
        Self {
            record,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Cache of usage records keyed by signature.
///
/// Concurrent lookups for different signatures are safe. Two concurrent
/// lookups for the same cold signature may both reach the source; whichever
/// stores last wins.
pub struct UsageLookupCache {
    source: Arc<dyn UsageSource>,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl UsageLookupCache {
    /// Create a cache with the default one hour TTL.
    pub fn new(source: Arc<dyn UsageSource>) -> Self {
        Self::with_ttl(source, DEFAULT_TTL)
    }

    pub fn with_ttl(source: Arc<dyn UsageSource>, ttl: Duration) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &Arc<dyn UsageSource> {
        &self.source
    }

    /// Return the record for a signature, fetching it if absent or stale.
    ///
    /// The lock is released before the source is awaited.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn get(&self, signature: &str) -> MetricsRecord {
        if let Some(record) = self.lookup_fresh(signature) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "telemetry")]
            GLOBAL_METRICS.record_cache_hit();
            debug!("Cache hit");
            return record;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_cache_miss();
        debug!("Cache miss, fetching");

        let record = self.source.fetch(signature).await;
        self.store(signature, record.clone());
        record
    }

    fn lookup_fresh(&self, signature: &str) -> Option<MetricsRecord> {
        let entries = self.entries.read().ok()?;
        entries
            .get(signature)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.record.clone())
    }

    fn store(&self, signature: &str, record: MetricsRecord) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(signature.to_string(), CacheEntry::new(record));
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_entries, stale_entries) = match self.entries.read() {
            Ok(entries) => (
                entries.len(),
                entries.values().filter(|e| !e.is_fresh(self.ttl)).count(),
            ),
            Err(_) => (0, 0),
        };

        CacheStats {
            total_entries,
            stale_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl: self.ttl,
        }
    }

    /// Drop every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl std::fmt::Debug for UsageLookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLookupCache")
            .field("source", &self.source.name())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Entries older than the TTL, refetched on next access.
    pub stale_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl: Duration,
}
