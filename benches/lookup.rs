// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for the lookup path: matching, CSV parsing, caching, formatting.
//!
//! Run with: `cargo bench --bench lookup`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use querylens::format::{format_bytes, format_ms, format_thousands};
use querylens::{
    LocalTable, LocalUsageSource, MetricsRecord, SummaryPresenter, TagMatcher, UsageLookupCache,
};

const HEADER: &str = "Tag,QueryCount,UniqueUserCount,Rows_Min,Rows_Max,Rows_Avg,Rows_Total,\
TotalBytes_Min,TotalBytes_Max,TotalBytes_Avg,TotalBytes_Total,ExecutionTime_Avg,AdditionalInfo";

/// A CSV export with `rows` distinct tags.
fn generate_export(rows: usize) -> String {
    let mut content = String::from(HEADER);
    content.push('\n');
    for i in 0..rows {
        content.push_str(&format!(
            "\"Shop.Module{m}.Service{i}.Query{i}\",{q},{u},1,{i},{avg}.5,{t},10,{i}00,{avg}.25,{t}000,{avg}.75,\n",
            m = i % 17,
            i = i,
            q = i * 3 + 1,
            u = i % 11 + 1,
            avg = i / 2,
            t = i * 7,
        ));
    }
    content
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");

    for size in [10usize, 100, 1_000] {
        let table = LocalTable::parse(&generate_export(size), ',');
        let tags = table.tags().to_vec();
        let last = format!("Contoso.{}(int id)", tags[size - 1]);
        let matcher = TagMatcher::new(Some(&last));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("suffix_worst_case", size), &tags, |b, tags| {
            b.iter(|| matcher.find(black_box(tags)));
        });

        let exact = TagMatcher::new(Some(&tags[size / 2]));
        group.bench_with_input(BenchmarkId::new("exact_midpoint", size), &tags, |b, tags| {
            b.iter(|| exact.find(black_box(tags)));
        });
    }

    group.bench_function("derive_signature", |b| {
        b.iter(|| TagMatcher::new(black_box(Some("Shop.Orders.GetOrders(int id, string name)"))));
    });

    group.finish();
}

fn bench_csv_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_parse");

    for size in [100usize, 1_000, 10_000] {
        let content = generate_export(size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| LocalTable::parse(black_box(content), ','));
        });
    }

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let source = Arc::new(LocalUsageSource::from_table(LocalTable::parse(
        &generate_export(1_000),
        ',',
    )));

    let mut group = c.benchmark_group("cache");

    let cache = UsageLookupCache::new(source.clone());
    rt.block_on(cache.get("Shop.Module3.Service500.Query500"));
    group.bench_function("warm_hit", |b| {
        b.to_async(&rt)
            .iter(|| cache.get(black_box("Shop.Module3.Service500.Query500")));
    });

    group.bench_function("cold_miss", |b| {
        b.to_async(&rt).iter(|| {
            let cache = UsageLookupCache::new(source.clone());
            async move { cache.get(black_box("Shop.Module3.Service500.Query500")).await }
        });
    });

    group.finish();
}

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");

    group.bench_function("format_bytes", |b| {
        b.iter(|| format_bytes(black_box(123_456_789.0)));
    });
    group.bench_function("format_ms", |b| {
        b.iter(|| format_ms(black_box(5_400_000)));
    });
    group.bench_function("format_thousands", |b| {
        b.iter(|| format_thousands(black_box(99_999)));
    });

    let mut record = MetricsRecord::new("Shop.Orders.GetOrders");
    record.query_count = 120;
    record.unique_user_count = 7;
    record.total_bytes.total = 1_500_000;
    record.execution_time.avg = 35.5;
    let presenter = SummaryPresenter::new();

    group.bench_function("summary", |b| {
        b.iter(|| presenter.summary(black_box(&record)));
    });
    group.bench_function("describe", |b| {
        b.iter(|| presenter.describe(black_box("Shop.Orders.GetOrders"), black_box(&record)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_matching,
    bench_csv_parse,
    bench_cache,
    bench_formatting
);
criterion_main!(benches);
