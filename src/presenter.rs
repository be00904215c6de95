// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Rendering of metrics records for display next to a method.
//!
//! [`SummaryPresenter::summary`] gives the one-line lens text,
//! [`SummaryPresenter::details`] the per-family table, and
//! [`SummaryPresenter::describe`] bundles both with a tooltip.

use std::fmt;

use serde::Serialize;

use crate::format::{
    format_bytes, format_float_bytes, value_or_na, value_or_na_as_time, DisplayValue,
    NOT_AVAILABLE,
};
use crate::types::{MetricFamily, MetricStats, MetricUnit, MetricsRecord};

/// Lens text shown when nothing was logged for a method.
pub const NO_DATA_SUMMARY: &str = "0 queries logged";

/// One row of the detail table. Cells are never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub label: String,
    pub min: String,
    pub max: String,
    pub avg: String,
    pub total: String,
}

/// Min/Max/Avg/Total for every metric family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailTable {
    pub rows: Vec<DetailRow>,
}

impl DetailTable {
    const HEADERS: [&'static str; 5] = ["Metric", "Min", "Max", "Avg", "Total"];

    pub fn row(&self, family: MetricFamily) -> Option<&DetailRow> {
        self.rows.iter().find(|row| row.label == family.label())
    }
}

impl fmt::Display for DetailTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<[&str; 5]> = self
            .rows
            .iter()
            .map(|r| [&*r.label, &*r.min, &*r.max, &*r.avg, &*r.total])
            .collect();

        let mut widths = Self::HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let write_line = |f: &mut fmt::Formatter<'_>, line: &[&str; 5]| -> fmt::Result {
            write!(f, "{:<w$}", line[0], w = widths[0])?;
            for (cell, width) in line.iter().zip(widths).skip(1) {
                write!(f, "  {:>w$}", cell, w = width)?;
            }
            writeln!(f)
        };

        write_line(f, &Self::HEADERS)?;
        for row in &cells {
            write_line(f, row)?;
        }
        Ok(())
    }
}

/// Everything an editor needs to draw one lens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensDescriptor {
    pub description: String,
    pub tooltip: String,
    pub details: DetailTable,
}

/// Stateless formatter for [`MetricsRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryPresenter;

impl SummaryPresenter {
    pub fn new() -> Self {
        Self
    }

    /// One-line summary, e.g. `Queries logged: 120 | Processed bytes: 1.5KB | Unique users: 7`.
    pub fn summary(&self, record: &MetricsRecord) -> String {
        if !record.has_data() {
            return NO_DATA_SUMMARY.to_string();
        }
        format!(
            "Queries logged: {} | Processed bytes: {} | Unique users: {}",
            record.query_count,
            format_bytes(record.total_bytes.total as f64),
            record.unique_user_count
        )
    }

    /// Per-family table. A record without logged queries shows `N/A` throughout.
    pub fn details(&self, record: &MetricsRecord) -> DetailTable {
        let rows = MetricFamily::ALL
            .into_iter()
            .map(|family| {
                let stats = record.has_data().then(|| record.family(family));
                detail_row(family, stats)
            })
            .collect();
        DetailTable { rows }
    }

    /// Build the lens for a signature.
    ///
    /// The tooltip names the signature and, on a second line, the record's
    /// provenance or error note.
    pub fn describe(&self, signature: &str, record: &MetricsRecord) -> LensDescriptor {
        let mut tooltip = format!("Src: {}", signature.trim());
        if !record.additional_info.trim().is_empty() {
            tooltip.push('\n');
            tooltip.push_str(record.additional_info.trim());
        }

        LensDescriptor {
            description: self.summary(record),
            tooltip,
            details: self.details(record),
        }
    }
}

fn detail_row(family: MetricFamily, stats: Option<&MetricStats>) -> DetailRow {
    let Some(stats) = stats else {
        return DetailRow {
            label: family.label().to_string(),
            min: NOT_AVAILABLE.to_string(),
            max: NOT_AVAILABLE.to_string(),
            avg: NOT_AVAILABLE.to_string(),
            total: NOT_AVAILABLE.to_string(),
        };
    };

    let unit = family.unit();
    DetailRow {
        label: family.label().to_string(),
        min: format_whole(unit, stats.min),
        max: format_whole(unit, stats.max),
        avg: format_average(unit, stats.avg),
        total: format_whole(unit, stats.total),
    }
}

fn format_whole(unit: MetricUnit, value: u64) -> String {
    let value = DisplayValue::from(value);
    match (unit, &value) {
        (MetricUnit::Count, _) => value_or_na(Some(&value)),
        (MetricUnit::Bytes, DisplayValue::Integer(n)) => format_bytes(*n as f64),
        (MetricUnit::Bytes, _) => NOT_AVAILABLE.to_string(),
        (MetricUnit::Milliseconds, _) => value_or_na_as_time(Some(&value)),
    }
}

fn format_average(unit: MetricUnit, value: f64) -> String {
    match unit {
        MetricUnit::Count => value_or_na(Some(&DisplayValue::from(value.round()))),
        // A zero average means no bytes, not an unknown value.
        MetricUnit::Bytes if value == 0.0 => format_bytes(0.0),
        MetricUnit::Bytes => format_float_bytes(value),
        MetricUnit::Milliseconds => value_or_na_as_time(Some(&DisplayValue::from(value.round()))),
    }
}
