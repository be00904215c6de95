// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local CSV source loaded from files on disk.

use std::path::PathBuf;

use tempfile::TempDir;

use querylens::config::{merge_config, CliOptions, LensConfig};
use querylens::source::local::LOCAL_DATA_NOTE;
use querylens::{create_source, LocalUsageSource, SourceKind, UsageLens, UsageSource};

const EXPORT: &str = "\
Tag,QueryCount,UniqueUserCount,Rows_Min,Rows_Max,Rows_Avg,Rows_Total,TotalBytes_Total,BytesSent_Min,ExecutionTime_Max,AdditionalInfo
\"Shop.Orders.GetOrders\",\"120\",\"7\",\"1\",\"50\",\"12.5\",\"1500\",\"2500000\",\"64\",\"950\",
Shop.Customers.Find,9,3,1,1,1,9,900,10,12,nightly export
,5,5,5,5,5,5,5,5,5,
Shop.Orders.List,oops,2,,,,,,,,
";

fn write_export(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("query-usage.csv");
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_skips_untagged_rows() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(write_export(&dir, EXPORT)).unwrap();

    let table = source.table();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.tags(),
        &[
            "Shop.Orders.GetOrders".to_string(),
            "Shop.Customers.Find".to_string(),
            "Shop.Orders.List".to_string(),
        ]
    );
}

#[test]
fn test_load_maps_named_columns() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(write_export(&dir, EXPORT)).unwrap();

    let record = source.table().get("Shop.Orders.GetOrders").unwrap();
    assert_eq!(record.query_count, 120);
    assert_eq!(record.unique_user_count, 7);
    assert_eq!(record.rows.max, 50);
    assert_eq!(record.rows.avg, 12.5);
    assert_eq!(record.total_bytes.total, 2_500_000);
    assert_eq!(record.bytes_sent.min, 64);
    assert_eq!(record.execution_time.max, 950);
    assert_eq!(record.additional_info, LOCAL_DATA_NOTE);

    let find = source.table().get("shop.customers.find").unwrap();
    assert_eq!(find.additional_info, "nightly export");
}

#[test]
fn test_bad_cells_degrade_to_zero() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(write_export(&dir, EXPORT)).unwrap();

    let record = source.table().get("Shop.Orders.List").unwrap();
    assert_eq!(record.query_count, 0);
    assert_eq!(record.unique_user_count, 2);
    assert_eq!(record.rows.total, 0);
}

#[test]
fn test_missing_file_is_empty_table() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(dir.path().join("missing.csv")).unwrap();
    assert!(source.table().is_empty());
    assert_eq!(source.path(), Some(dir.path().join("missing.csv").as_path()));
}

#[test]
fn test_header_example_from_docs() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir, "Tag,BytesSent_Min\n\"Foo.Bar\",\"100\"\n\"\",\"7\"\n");
    let source = LocalUsageSource::open(path).unwrap();

    assert_eq!(source.table().len(), 1);
    assert_eq!(source.table().get("Foo.Bar").unwrap().bytes_sent.min, 100);
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_fetch_known_tags() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(write_export(&dir, EXPORT)).unwrap();

    for tag in source.table().tags().to_vec() {
        let record = source.fetch(&tag).await;
        assert_eq!(record.tag, tag);
    }
}

#[tokio::test]
async fn test_fetch_tag_containing_parameter_list() {
    let dir = TempDir::new().unwrap();
    let path = write_export(
        &dir,
        "Tag,QueryCount\n\"Orders.Get\",1\n\"Orders.Get(int id)\",5\n",
    );
    let source = LocalUsageSource::open(path).unwrap();

    let tag = source.table().tags()[1].clone();
    let record = source.fetch(&tag).await;
    assert_eq!(record.tag, "Orders.Get(int id)");
    assert_eq!(record.query_count, 5);

    let derived = source.fetch("Orders.Get(string name)").await;
    assert_eq!(derived.query_count, 1);
}

#[tokio::test]
async fn test_fetch_by_namespace_suffix() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(write_export(&dir, EXPORT)).unwrap();

    let record = source
        .fetch("Contoso.Shop.Customers.Find(string email)")
        .await;
    assert_eq!(record.tag, "Shop.Customers.Find");
    assert_eq!(record.query_count, 9);
}

#[tokio::test]
async fn test_fetch_unknown_and_blank() {
    let dir = TempDir::new().unwrap();
    let source = LocalUsageSource::open(write_export(&dir, EXPORT)).unwrap();

    for signature in ["Billing.Invoices.Create", "", "   "] {
        let record = source.fetch(signature).await;
        assert_eq!(record.query_count, 0);
        assert!(!record.additional_info.is_empty());
    }
}

// ============================================================================
// Wiring through configuration
// ============================================================================

#[tokio::test]
async fn test_lens_from_workspace_config() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir, EXPORT);

    let workspace = LensConfig {
        csv_path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let config = merge_config(None, Some(workspace), None, CliOptions::default());
    assert_eq!(config.source, SourceKind::Local);

    let source = create_source(&config).unwrap();
    assert_eq!(source.name(), "local");

    let lens = UsageLens::from_config(&config).unwrap();
    let descriptor = lens.describe("Shop.Orders.GetOrders").await;
    assert_eq!(
        descriptor.description,
        "Queries logged: 120 | Processed bytes: 2.5MB | Unique users: 7"
    );
}
