// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Display formatting for metric values.
//!
//! All helpers are pure. Byte helpers scale in powers of 1000, durations are
//! given in milliseconds, and counts abbreviate to thousands with a `k` suffix.
//! Fractional output uses at most two decimals with trailing zeros trimmed,
//! so `1.50` prints as `1.5` and `2.00` as `2`.

/// Byte units, base 1000.
const BYTE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Placeholder for values that are missing or cannot be shown.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format with up to two decimals, trimming trailing zeros.
fn two_decimals(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a byte count, e.g. `1500.0` => `"1.5KB"`.
///
/// Anything under one byte (including NaN) renders as `"0B"`. Record fields are
/// unsigned, so callers never pass negative sizes from a record.
pub fn format_bytes(bytes: f64) -> String {
    if !(bytes >= 1.0) {
        return "0B".to_string();
    }

    let mut value = bytes;
    let mut order = 0;
    while value >= 1000.0 && order < BYTE_UNITS.len() - 1 {
        value /= 1000.0;
        order += 1;
    }

    format!("{}{}", two_decimals(value), BYTE_UNITS[order])
}

/// Format a raw signed byte count: zero is `"0B"`, negatives are `"N/A"`.
pub fn format_signed_bytes(bytes: i64) -> String {
    match bytes {
        0 => "0B".to_string(),
        b if b > 0 => format_bytes(b as f64),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format a fractional byte count; non-finite or non-positive values are `"N/A"`.
pub fn format_float_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format_bytes(bytes)
}

/// Converts milliseconds to a short time string.
///
/// Examples:
///   750      => "750ms"
///   1000     => "1s"
///   45000    => "45s"
///   120000   => "2m"
///   5400000  => "1.5h"
///   86400000 => "1d"
pub fn format_ms(ms: i64) -> String {
    if ms < 0 {
        return NOT_AVAILABLE.to_string();
    }
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let seconds = ms as f64 / 1000.0;
    if seconds < 60.0 {
        return format!("{}s", two_decimals(seconds));
    }

    let minutes = seconds / 60.0;
    if minutes < 60.0 {
        return format!("{}m", two_decimals(minutes));
    }

    let hours = minutes / 60.0;
    if hours < 24.0 {
        return format!("{}h", two_decimals(hours));
    }

    format!("{}d", two_decimals(hours / 24.0))
}

/// Abbreviate to thousands: 999 => "999", 123_456 => "123k", 99_999 => "100k".
pub fn format_thousands(value: i64) -> String {
    if value < 1000 {
        return value.to_string();
    }
    let thousands = (value as f64 / 1000.0).round() as i64;
    format!("{}k", thousands)
}

/// Format an average: integral values print without decimals.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = value.round();
    if (value - rounded).abs() < 1e-7 {
        return format!("{}", rounded as i64);
    }
    two_decimals(value)
}

/// A value headed for display whose type is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for DisplayValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for DisplayValue {
    fn from(value: u64) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for DisplayValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// `"N/A"` when absent, thousands-abbreviated when numeric, the text otherwise.
pub fn value_or_na(value: Option<&DisplayValue>) -> String {
    match value {
        None => NOT_AVAILABLE.to_string(),
        Some(DisplayValue::Integer(n)) => format_thousands(*n),
        Some(DisplayValue::Float(f)) if f.is_finite() => format_thousands(*f as i64),
        Some(DisplayValue::Float(_)) => NOT_AVAILABLE.to_string(),
        Some(DisplayValue::Text(s)) => s.clone(),
    }
}

/// Like [`value_or_na`], but numeric values are milliseconds.
pub fn value_or_na_as_time(value: Option<&DisplayValue>) -> String {
    match value {
        Some(DisplayValue::Integer(ms)) => format_ms(*ms),
        Some(DisplayValue::Float(ms)) if ms.is_finite() => format_ms(*ms as i64),
        _ => NOT_AVAILABLE.to_string(),
    }
}
