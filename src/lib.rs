// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! querylens - query usage and performance lenses for methods.
//!
//! Given a method signature such as `Shop.Orders.GetOrders(int id)`, querylens
//! finds the telemetry logged for the database calls that method makes and
//! renders it as a one-line summary plus a per-metric detail table.
//!
//! # Architecture
//!
//! - [`types`] - `MetricsRecord` and the explicit column-to-field mapping
//! - [`error`] - Error types and result aliases
//! - [`matcher`] - Signature-to-tag matching
//! - [`source`] - Remote analytics and local CSV usage sources
//! - [`cache`] - Time-boxed lookup cache
//! - [`format`] - Byte, duration and count formatting
//! - [`presenter`] - Summary line, detail table and lens descriptor
//! - [`lens`] - Cache plus presenter for one session
//! - [`config`] - Configuration loading and merging
//! - [`telemetry`] - Tracing setup and lookup metrics
//!
//! Lookups never fail. Missing data and transport or parse errors degrade to an
//! all-zero record whose `additional_info` says what went wrong.
//!
//! # Example
//!
//! ```rust,ignore
//! use querylens::config::{load_config, CliOptions};
//! use querylens::UsageLens;
//!
//! let config = load_config(".".as_ref(), CliOptions::default())?;
//! let lens = UsageLens::from_config(&config)?;
//! let descriptor = lens.describe("Shop.Orders.GetOrders(int id)").await;
//! println!("{}", descriptor.description);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod lens;
pub mod matcher;
pub mod presenter;
pub mod source;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::{CacheStats, UsageLookupCache};
pub use error::{ConfigError, FailureKind, LookupError, Result};
pub use lens::UsageLens;
pub use matcher::{derive_tag, TagMatcher};
pub use presenter::{DetailRow, DetailTable, LensDescriptor, SummaryPresenter};
pub use source::{
    create_source, AnalyticsConfig, AnalyticsSource, LocalTable, LocalUsageSource, SourceKind,
    UsageSource,
};
pub use types::{Field, MetricFamily, MetricStats, MetricsRecord, Stat};

/// querylens version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
