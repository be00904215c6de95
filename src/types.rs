// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core type definitions for querylens.
//!
//! A [`MetricsRecord`] holds the normalized statistics for one tag. Tabular
//! sources (analytics query results, CSV exports) name their columns after the
//! record fields, e.g. `QueryCount` or `BytesSent_Min`. The [`Field`] enum is the
//! explicit mapping from those column names to typed record fields: unknown
//! columns resolve to `None` and are ignored, and any field a source does not
//! provide keeps its zero default.

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

// ============================================================================
// Metric families
// ============================================================================

/// A group of Min/Max/Avg/Total statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricFamily {
    Rows,
    Columns,
    TotalBytes,
    BytesSent,
    BytesReceived,
    ExecutionTime,
}

/// How the values of a metric family are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Plain counts, abbreviated in thousands.
    Count,
    /// Byte volumes, scaled through B/KB/MB/...
    Bytes,
    /// Durations in milliseconds.
    Milliseconds,
}

impl MetricFamily {
    /// All families, in detail-table order.
    pub const ALL: [MetricFamily; 6] = [
        Self::Rows,
        Self::Columns,
        Self::TotalBytes,
        Self::BytesSent,
        Self::BytesReceived,
        Self::ExecutionTime,
    ];

    /// Column-name prefix of this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "Rows",
            Self::Columns => "Columns",
            Self::TotalBytes => "TotalBytes",
            Self::BytesSent => "BytesSent",
            Self::BytesReceived => "BytesReceived",
            Self::ExecutionTime => "ExecutionTime",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rows => "Rows",
            Self::Columns => "Columns",
            Self::TotalBytes => "Total bytes",
            Self::BytesSent => "Bytes sent",
            Self::BytesReceived => "Bytes received",
            Self::ExecutionTime => "Execution time",
        }
    }

    pub fn unit(&self) -> MetricUnit {
        match self {
            Self::Rows | Self::Columns => MetricUnit::Count,
            Self::TotalBytes | Self::BytesSent | Self::BytesReceived => MetricUnit::Bytes,
            Self::ExecutionTime => MetricUnit::Milliseconds,
        }
    }

    /// Parse a family prefix, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One statistic within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Min,
    Max,
    Avg,
    Total,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Self::Min, Self::Max, Self::Avg, Self::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Avg => "Avg",
            Self::Total => "Total",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(s))
    }
}

/// Min/Max/Avg/Total for one family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub min: u64,
    pub max: u64,
    pub avg: f64,
    pub total: u64,
}

// ============================================================================
// Metrics record
// ============================================================================

/// Normalized per-tag performance statistics.
///
/// Numeric fields are zero when the source had no value for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    /// Matched method signature or alias.
    pub tag: String,
    pub query_count: u64,
    pub unique_user_count: u64,
    pub rows: MetricStats,
    pub columns: MetricStats,
    pub total_bytes: MetricStats,
    pub bytes_sent: MetricStats,
    pub bytes_received: MetricStats,
    pub execution_time: MetricStats,
    /// Provenance or status note, e.g. "No rows returned.".
    pub additional_info: String,
}

impl MetricsRecord {
    /// Create an all-zero record for a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Create an all-zero record carrying a status note.
    pub fn empty(tag: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            additional_info: info.into(),
            ..Default::default()
        }
    }

    /// Create the zero-valued record a failed lookup degrades to.
    pub fn from_error(tag: impl Into<String>, err: &LookupError) -> Self {
        Self::empty(tag, err.to_string())
    }

    /// Whether any queries were logged for this tag.
    pub fn has_data(&self) -> bool {
        self.query_count > 0
    }

    pub fn family(&self, family: MetricFamily) -> &MetricStats {
        match family {
            MetricFamily::Rows => &self.rows,
            MetricFamily::Columns => &self.columns,
            MetricFamily::TotalBytes => &self.total_bytes,
            MetricFamily::BytesSent => &self.bytes_sent,
            MetricFamily::BytesReceived => &self.bytes_received,
            MetricFamily::ExecutionTime => &self.execution_time,
        }
    }

    fn family_mut(&mut self, family: MetricFamily) -> &mut MetricStats {
        match family {
            MetricFamily::Rows => &mut self.rows,
            MetricFamily::Columns => &mut self.columns,
            MetricFamily::TotalBytes => &mut self.total_bytes,
            MetricFamily::BytesSent => &mut self.bytes_sent,
            MetricFamily::BytesReceived => &mut self.bytes_received,
            MetricFamily::ExecutionTime => &mut self.execution_time,
        }
    }

    /// Assign a parsed value to a field.
    ///
    /// Values are coerced to the field's type. Negative and non-finite numbers
    /// are stored as zero.
    pub fn apply(&mut self, field: Field, value: FieldValue) {
        match field {
            Field::Tag => self.tag = value.into_text(),
            Field::AdditionalInfo => self.additional_info = value.into_text(),
            Field::QueryCount => self.query_count = value.to_count(),
            Field::UniqueUserCount => self.unique_user_count = value.to_count(),
            Field::Metric(family, stat) => {
                let stats = self.family_mut(family);
                match stat {
                    Stat::Min => stats.min = value.to_count(),
                    Stat::Max => stats.max = value.to_count(),
                    Stat::Avg => stats.avg = value.to_average(),
                    Stat::Total => stats.total = value.to_count(),
                }
            }
        }
    }
}

// ============================================================================
// Column mapping
// ============================================================================

/// Storage type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
}

/// A record field addressable by column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Tag,
    QueryCount,
    UniqueUserCount,
    AdditionalInfo,
    Metric(MetricFamily, Stat),
}

impl Field {
    /// Every field, in column order.
    pub fn all() -> Vec<Field> {
        let mut fields = vec![Self::Tag, Self::QueryCount, Self::UniqueUserCount];
        for family in MetricFamily::ALL {
            for stat in Stat::ALL {
                fields.push(Self::Metric(family, stat));
            }
        }
        fields.push(Self::AdditionalInfo);
        fields
    }

    /// Resolve a column name such as `bytesSent_min`, ignoring case and
    /// surrounding whitespace.
    pub fn from_column(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("Tag") {
            return Some(Self::Tag);
        }
        if name.eq_ignore_ascii_case("QueryCount") {
            return Some(Self::QueryCount);
        }
        if name.eq_ignore_ascii_case("UniqueUserCount") {
            return Some(Self::UniqueUserCount);
        }
        if name.eq_ignore_ascii_case("AdditionalInfo") {
            return Some(Self::AdditionalInfo);
        }

        let (family, stat) = name.split_once('_')?;
        Some(Self::Metric(MetricFamily::parse(family)?, Stat::parse(stat)?))
    }

    /// Canonical column name.
    pub fn column_name(&self) -> String {
        match self {
            Self::Tag => "Tag".to_string(),
            Self::QueryCount => "QueryCount".to_string(),
            Self::UniqueUserCount => "UniqueUserCount".to_string(),
            Self::AdditionalInfo => "AdditionalInfo".to_string(),
            Self::Metric(family, stat) => format!("{}_{}", family.as_str(), stat.as_str()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Tag | Self::AdditionalInfo => FieldKind::Text,
            Self::Metric(_, Stat::Avg) => FieldKind::Float,
            _ => FieldKind::Integer,
        }
    }
}

/// A value parsed from a source cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }

    fn to_count(&self) -> u64 {
        match self {
            Self::Integer(n) => (*n).max(0) as u64,
            Self::Float(f) if f.is_finite() && *f > 0.0 => *f as u64,
            Self::Float(_) => 0,
            Self::Text(s) => s.trim().parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0),
        }
    }

    fn to_average(&self) -> f64 {
        let value = match self {
            Self::Integer(n) => *n as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}
