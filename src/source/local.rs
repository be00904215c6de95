// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local usage source backed by a CSV export.
//!
//! The file is read once at construction. Its first line names the columns
//! (`Tag`, `QueryCount`, `BytesSent_Min`, ...); every other non-blank line is
//! one tag. Fields are split on the delimiter without quote-aware escaping, so
//! values must not contain the delimiter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::error::LookupError;
use crate::matcher::TagMatcher;
use crate::types::MetricsRecord;

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;

use super::columns::{clean_field, ColumnMap};
use super::UsageSource;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Provenance note stored on rows loaded from a file.
pub const LOCAL_DATA_NOTE: &str = "(Local CSV data)";

/// In-memory table of records keyed by tag, in file order.
#[derive(Debug, Clone, Default)]
pub struct LocalTable {
    tags: Vec<String>,
    records: Vec<MetricsRecord>,
    index: HashMap<String, usize>,
}

impl LocalTable {
    /// Parse delimited text. The first line is the header.
    ///
    /// Rows without a tag are dropped. A later row whose tag equals an earlier
    /// one (ignoring case) replaces it in place.
    pub fn parse(content: &str, delimiter: char) -> Self {
        let mut table = Self::default();
        let mut lines = content.lines();

        let Some(header) = lines.next() else {
            return table;
        };
        let header = header.trim_start_matches('\u{feff}');
        let columns = ColumnMap::from_names(header.split(delimiter));

        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let cells: Vec<&str> = line.split(delimiter).map(clean_field).collect();
            let mut record = columns.populate(&cells);

            if record.tag.trim().is_empty() {
                debug!(line = line_no + 2, "Skipping row without tag");
                continue;
            }
            record.tag = record.tag.trim().to_string();
            if record.additional_info.is_empty() {
                record.additional_info = LOCAL_DATA_NOTE.to_string();
            }

            table.insert(record);
        }

        table
    }

    /// Load a table from a file. A missing file yields an empty table.
    pub fn load(path: &Path, delimiter: char) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content, delimiter)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Usage table not found, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    fn insert(&mut self, record: MetricsRecord) {
        let key = record.tag.to_lowercase();
        match self.index.get(&key) {
            Some(&position) => {
                self.tags[position] = record.tag.clone();
                self.records[position] = record;
            }
            None => {
                self.index.insert(key, self.records.len());
                self.tags.push(record.tag.clone());
                self.records.push(record);
            }
        }
    }

    /// Tags in table order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Record for a tag, ignoring case.
    pub fn get(&self, tag: &str) -> Option<&MetricsRecord> {
        self.index
            .get(&tag.to_lowercase())
            .map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a signature to a record.
    pub fn resolve(&self, signature: &str) -> Result<&MetricsRecord, LookupError> {
        let matcher = TagMatcher::new(Some(signature));
        let found = matcher.find(&self.tags).ok_or(LookupError::NotFound)?;
        debug!(tag = found.tag, rule = ?found.rule, "Matched local tag");
        Ok(&self.records[found.index])
    }
}

/// Usage source over a [`LocalTable`].
#[derive(Debug, Clone)]
pub struct LocalUsageSource {
    path: Option<PathBuf>,
    table: LocalTable,
}

impl LocalUsageSource {
    /// Open a CSV file. Only I/O errors other than "not found" fail.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let table = LocalTable::load(path, DEFAULT_DELIMITER)?;
        info!(rows = table.len(), "Loaded local usage table");
        Ok(Self {
            path: Some(path.to_path_buf()),
            table,
        })
    }

    /// Wrap an already-built table.
    pub fn from_table(table: LocalTable) -> Self {
        Self { path: None, table }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn table(&self) -> &LocalTable {
        &self.table
    }

    /// Lookup that reports misses as errors.
    pub fn try_fetch(&self, signature: &str) -> Result<MetricsRecord, LookupError> {
        self.table.resolve(signature).cloned()
    }
}

#[async_trait]
impl UsageSource for LocalUsageSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, signature: &str) -> MetricsRecord {
        let start = Instant::now();
        let result = self.try_fetch(signature);

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_fetch(self.name(), start.elapsed(), result.is_ok());
        #[cfg(not(feature = "telemetry"))]
        let _ = start;

        result.unwrap_or_else(|err| {
            debug!(signature, "No local usage data");
            MetricsRecord::from_error(signature.trim(), &err)
        })
    }
}
