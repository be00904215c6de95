// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Column-name driven row parsing shared by the tabular sources.

use std::collections::HashMap;

use crate::types::{Field, FieldKind, FieldValue, MetricsRecord};

/// Maps column names (case-insensitive) to positions for one result set.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    index: HashMap<String, usize>,
    bindings: Vec<(Field, usize)>,
}

impl ColumnMap {
    /// Build from header names in positional order.
    ///
    /// Names are trimmed and stripped of surrounding quotes. Blank names are
    /// skipped; on duplicates the first occurrence wins.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = HashMap::new();
        let mut bindings = Vec::new();

        for (position, raw) in names.into_iter().enumerate() {
            let name = clean_field(raw.as_ref());
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key, position);
            if let Some(field) = Field::from_column(name) {
                bindings.push((field, position));
            }
        }

        Self { index, bindings }
    }

    /// Position of a column, ignoring case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&name.trim().to_lowercase()).copied()
    }

    /// Number of distinct named columns.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Columns that resolved to record fields.
    pub fn bindings(&self) -> &[(Field, usize)] {
        &self.bindings
    }

    /// Build a record from one positional row.
    ///
    /// Fields without a column, with an out-of-range position, or with a null
    /// cell keep their zero default. Unparseable numbers become zero.
    pub fn populate<C: Cell>(&self, cells: &[C]) -> MetricsRecord {
        let mut record = MetricsRecord::default();
        for &(field, position) in &self.bindings {
            let Some(cell) = cells.get(position) else {
                continue;
            };
            if let Some(value) = cell.to_field_value(field.kind()) {
                record.apply(field, value);
            }
        }
        record
    }
}

/// Trim whitespace and surrounding double quotes.
pub fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// A raw cell that can be coerced into a record field.
pub trait Cell {
    /// `None` means the cell is null and the field keeps its default.
    fn to_field_value(&self, kind: FieldKind) -> Option<FieldValue>;
}

fn parse_integer(text: &str) -> i64 {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f as i64)
        })
        .unwrap_or(0)
}

fn parse_float(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

impl Cell for str {
    fn to_field_value(&self, kind: FieldKind) -> Option<FieldValue> {
        Some(match kind {
            FieldKind::Text => FieldValue::Text(clean_field(self).to_string()),
            FieldKind::Integer => FieldValue::Integer(parse_integer(clean_field(self))),
            FieldKind::Float => FieldValue::Float(parse_float(clean_field(self))),
        })
    }
}

impl Cell for &str {
    fn to_field_value(&self, kind: FieldKind) -> Option<FieldValue> {
        (**self).to_field_value(kind)
    }
}

impl Cell for String {
    fn to_field_value(&self, kind: FieldKind) -> Option<FieldValue> {
        self.as_str().to_field_value(kind)
    }
}

impl Cell for serde_json::Value {
    fn to_field_value(&self, kind: FieldKind) -> Option<FieldValue> {
        use serde_json::Value;

        match (self, kind) {
            (Value::Null, _) => None,
            (Value::String(s), kind) => s.as_str().to_field_value(kind),
            (Value::Number(n), FieldKind::Text) => Some(FieldValue::Text(n.to_string())),
            (Value::Number(n), FieldKind::Integer) => {
                let value = n
                    .as_i64()
                    .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                    .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                    .unwrap_or(0);
                Some(FieldValue::Integer(value))
            }
            (Value::Number(n), FieldKind::Float) => {
                Some(FieldValue::Float(n.as_f64().unwrap_or(0.0)))
            }
            (other, FieldKind::Text) => Some(FieldValue::Text(other.to_string())),
            (_, FieldKind::Integer) => Some(FieldValue::Integer(0)),
            (_, FieldKind::Float) => Some(FieldValue::Float(0.0)),
        }
    }
}
