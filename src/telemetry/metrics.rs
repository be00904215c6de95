// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lookup metrics.
//!
//! Counts source fetches (with latency) and cache hits/misses in-process.
//! Nothing is exported; `querylens lookup --verbose` prints a report at exit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Central metrics collection.
#[derive(Debug)]
pub struct Metrics {
    /// Fetch metrics keyed by source name.
    sources: RwLock<HashMap<String, SourceMetrics>>,

    cache: CacheCounters,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(HashMap::new()),
            cache: CacheCounters::new(),
            start_time: Instant::now(),
        }
    }

    fn sources_read(&self) -> RwLockReadGuard<'_, HashMap<String, SourceMetrics>> {
        self.sources.read().unwrap_or_else(|e| e.into_inner())
    }

    fn sources_write(&self) -> RwLockWriteGuard<'_, HashMap<String, SourceMetrics>> {
        self.sources.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one source fetch.
    pub fn record_fetch(&self, source: &str, duration: Duration, success: bool) {
        let mut sources = self.sources_write();
        sources
            .entry(source.to_string())
            .or_insert_with(SourceMetrics::new)
            .record(duration, success);
    }

    pub fn record_cache_hit(&self) {
        self.cache.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Fetch metrics for one source.
    pub fn source_metrics(&self, source: &str) -> Option<SourceMetrics> {
        self.sources_read().get(source).cloned()
    }

    /// `(hits, misses)` across all caches.
    pub fn cache_counts(&self) -> (u64, u64) {
        (
            self.cache.hits.load(Ordering::Relaxed),
            self.cache.misses.load(Ordering::Relaxed),
        )
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Take a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (cache_hits, cache_misses) = self.cache_counts();
        MetricsSnapshot {
            sources: self.sources_read().clone(),
            cache_hits,
            cache_misses,
            uptime: self.uptime(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        self.sources_write().clear();
        self.cache.hits.store(0, Ordering::Relaxed);
        self.cache.misses.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

/// Fetch metrics for one source.
#[derive(Debug, Clone)]
pub struct SourceMetrics {
    pub fetches: u64,
    pub successes: u64,
    /// Fetches that degraded to an empty record.
    pub failures: u64,
    pub total_duration: Duration,
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub histogram: Histogram,
}

impl SourceMetrics {
    pub fn new() -> Self {
        Self {
            fetches: 0,
            successes: 0,
            failures: 0,
            total_duration: Duration::ZERO,
            min_duration: Duration::MAX,
            max_duration: Duration::ZERO,
            histogram: Histogram::default(),
        }
    }

    pub fn record(&mut self, duration: Duration, success: bool) {
        self.fetches += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.total_duration += duration;
        self.min_duration = self.min_duration.min(duration);
        self.max_duration = self.max_duration.max(duration);
        self.histogram.record(duration);
    }

    pub fn avg_duration(&self) -> Duration {
        if self.fetches == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.fetches as u32
        }
    }

    /// Success rate in `0.0..=1.0`. No fetches counts as fully successful.
    pub fn success_rate(&self) -> f64 {
        if self.fetches == 0 {
            1.0
        } else {
            self.successes as f64 / self.fetches as f64
        }
    }
}

impl Default for SourceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-bucket latency histogram.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Upper bucket bounds in microseconds.
    bounds: Vec<u64>,
    /// One more slot than `bounds` for the overflow bucket.
    counts: Vec<u64>,
}

impl Histogram {
    pub fn with_bounds(bounds: Vec<u64>) -> Self {
        let counts = vec![0; bounds.len() + 1];
        Self { bounds, counts }
    }

    pub fn record(&mut self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let slot = self
            .bounds
            .iter()
            .position(|&bound| micros <= bound)
            .unwrap_or(self.bounds.len());
        self.counts[slot] += 1;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Upper bound of the bucket holding the `p`th percentile.
    ///
    /// The overflow bucket reports ten times the largest bound.
    pub fn percentile(&self, p: f64) -> Duration {
        let total = self.total();
        if total == 0 {
            return Duration::ZERO;
        }

        let target = ((total as f64 * p / 100.0).ceil() as u64).max(1);
        let mut seen = 0u64;
        for (slot, &count) in self.counts.iter().enumerate() {
            seen += count;
            if seen >= target {
                let micros = match self.bounds.get(slot) {
                    Some(&bound) => bound,
                    None => self.bounds.last().copied().unwrap_or(0) * 10,
                };
                return Duration::from_micros(micros);
            }
        }

        Duration::ZERO
    }

    pub fn p50(&self) -> Duration {
        self.percentile(50.0)
    }

    pub fn p99(&self) -> Duration {
        self.percentile(99.0)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        // 1ms, 10ms, 100ms, 1s, 10s, 30s
        Self::with_bounds(vec![
            1_000, 10_000, 100_000, 1_000_000, 10_000_000, 30_000_000,
        ])
    }
}

/// A point-in-time copy of all metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub sources: HashMap<String, SourceMetrics>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Share of cache lookups answered without a fetch.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Format as a human-readable report.
    pub fn format_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Lookup Metrics ===\n\n");
        report.push_str(&format!("Uptime: {:.2?}\n", self.uptime));
        report.push_str(&format!(
            "Cache: {} hits, {} misses ({:.1}% hit rate)\n",
            self.cache_hits,
            self.cache_misses,
            self.cache_hit_rate() * 100.0
        ));

        if !self.sources.is_empty() {
            report.push_str("\nSources:\n");
            let mut names: Vec<_> = self.sources.keys().collect();
            names.sort();
            for name in names {
                let metrics = &self.sources[name];
                report.push_str(&format!(
                    "  {}: {} fetches, {:.1}% success, avg {:.2?}, p99 {:.2?}\n",
                    name,
                    metrics.fetches,
                    metrics.success_rate() * 100.0,
                    metrics.avg_duration(),
                    metrics.histogram.p99()
                ));
            }
        }

        report
    }
}
