// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Freshness and refresh behavior of the lookup cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use querylens::{MetricsRecord, UsageLookupCache, UsageSource};

/// Source that counts fetches and stamps the count into `query_count`.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch(&self, signature: &str) -> MetricsRecord {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        let mut record = MetricsRecord::new(signature.trim());
        record.query_count = call;
        record.additional_info = format!("fetch #{}", call);
        record
    }
}

#[tokio::test]
async fn test_within_window_source_called_once() {
    let source = Arc::new(CountingSource::default());
    let cache = UsageLookupCache::with_ttl(source.clone(), Duration::from_secs(60));

    let first = cache.get("Shop.Orders.GetOrders").await;
    let second = cache.get("Shop.Orders.GetOrders").await;

    assert_eq!(source.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_after_window_exactly_one_refetch() {
    let source = Arc::new(CountingSource::default());
    let cache = UsageLookupCache::with_ttl(source.clone(), Duration::from_millis(50));

    let first = cache.get("Shop.Orders.GetOrders").await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    let stats = cache.stats();
    assert_eq!(stats.stale_entries, 1);

    let refreshed = cache.get("Shop.Orders.GetOrders").await;
    let again = cache.get("Shop.Orders.GetOrders").await;

    assert_eq!(source.calls(), 2);
    assert_eq!(first.query_count, 1);
    assert_eq!(refreshed.query_count, 2);
    assert_eq!(again, refreshed);
    assert_eq!(cache.stats().total_entries, 1);
}

#[tokio::test]
async fn test_distinct_signatures_cached_independently() {
    let source = Arc::new(CountingSource::default());
    let cache = UsageLookupCache::new(source.clone());

    cache.get("Shop.Orders.GetOrders").await;
    cache.get("Shop.Orders.GetOrders(int id)").await;
    cache.get("shop.orders.getorders").await;
    cache.get("Shop.Orders.GetOrders").await;

    assert_eq!(source.calls(), 3);
    let stats = cache.stats();
    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 3);
}

#[tokio::test]
async fn test_concurrent_lookups_for_different_signatures() {
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        delay: Some(Duration::from_millis(10)),
    });
    let cache = Arc::new(UsageLookupCache::new(source.clone()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            let signature = format!("Shop.Module{}.Run", i);
            let record = cache.get(&signature).await;
            (signature, record)
        }));
    }

    for handle in handles {
        let (signature, record) = handle.await.unwrap();
        assert_eq!(record.tag, signature);
    }

    assert_eq!(source.calls(), 16);
    assert_eq!(cache.stats().total_entries, 16);

    // Every entry is now warm.
    for i in 0..16 {
        cache.get(&format!("Shop.Module{}.Run", i)).await;
    }
    assert_eq!(source.calls(), 16);
}

#[tokio::test]
async fn test_concurrent_cold_lookups_store_one_result() {
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        delay: Some(Duration::from_millis(20)),
    });
    let cache = Arc::new(UsageLookupCache::new(source.clone()));

    let (a, b) = tokio::join!(cache.get("A.B.C"), cache.get("A.B.C"));
    assert!(a.query_count >= 1 && b.query_count >= 1);

    let stored = cache.get("A.B.C").await;
    assert!(stored == a || stored == b);
    assert_eq!(cache.stats().total_entries, 1);
}
