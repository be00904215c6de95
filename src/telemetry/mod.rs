// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracing and metrics for lookups.
//!
//! - **Tracing**: `tracing` events and `#[instrument]` spans on the lookup path,
//!   rendered by a `tracing-subscriber` fmt layer on stderr
//! - **Metrics**: per-source fetch latency and cache hit/miss counters in
//!   [`GLOBAL_METRICS`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use querylens::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_flags(debug, verbose))?;
//! ```
//!
//! Spans on the lookup path must not record the API key. Use `skip` or
//! `skip_all` on anything that takes a config or credentials.

mod init;
pub mod metrics;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
pub use metrics::{Histogram, Metrics, MetricsSnapshot, SourceMetrics, GLOBAL_METRICS};
