//! Shared formatting helpers for table headers and cells.
//!
//! All pure formatting functions (no ratatui styles, no layout) live here.
//! The TUI table, the plain-text dump and the analytics labels all go through
//! the same functions so a value reads the same everywhere.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::model::{ColumnDescriptor, ColumnType, Value};

/// Rendered for null or absent cells.
pub const MISSING: &str = "N/A";

/// Column whose values are shown verbatim.
const VERBATIM_COLUMN: &str = "class";

/// Name fragments that mark a column as date-like for untyped sources.
const DATE_NAME_HINTS: [&str; 3] = ["date", "time", "at"];

/// Turns a snake_case identifier into a label: `device_hours` -> `Device Hours`.
///
/// Underscores become spaces, then every non-whitespace character that starts
/// the string or follows whitespace is uppercased. Other characters are left
/// untouched.
pub fn format_column_name(raw: &str) -> String {
    title_case(&raw.replace('_', " "))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Formats a cell using only the column name (untyped sources).
///
/// Precedence: null, the verbatim `class` column, booleans, date-like
/// strings in columns whose name contains "date", "time" or "at", other
/// strings (label transform), everything else as-is.
///
/// The "at" fragment matches broadly ("status", "rating"); a string in such
/// a column is only rendered as a date when it actually parses as one.
pub fn format_cell_value(value: &Value, column: &str) -> String {
    let date_like = DATE_NAME_HINTS.iter().any(|hint| column.contains(hint));
    format_with(value, column, date_like)
}

/// Formats a cell using the column's type annotation when it has one.
///
/// Typed columns only attempt date rendering when they are `Date` or
/// `Timestamp`; `Unknown` columns fall back to [`format_cell_value`].
pub fn format_cell(value: &Value, column: &ColumnDescriptor) -> String {
    if column.column_type == ColumnType::Unknown {
        return format_cell_value(value, &column.raw_name);
    }
    format_with(value, &column.raw_name, column.column_type.is_temporal())
}

fn format_with(value: &Value, column: &str, date_like: bool) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        _ if column == VERBATIM_COLUMN => value.to_string(),
        Value::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        Value::String(s) => {
            if date_like && let Some(dt) = parse_datetime(s) {
                return format_local_datetime(&dt);
            }
            format_column_name(s)
        }
        Value::Number(_) => value.to_string(),
    }
}

/// Parses the date/time shapes produced by Postgres and JSON encoders.
///
/// Accepted: RFC 3339, `YYYY-MM-DD[T ]HH:MM:SS[.fff][offset]` (no offset
/// means local time) and a bare `YYYY-MM-DD` (UTC midnight).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.len() < 10 {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres text output: "2024-01-05 10:00:00.123+00"
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Renders an instant in the local time zone: `1/5/2024, 10:00:00 AM`.
pub fn format_local_datetime(dt: &DateTime<Utc>) -> String {
    format_datetime_in(dt, &Local)
}

/// Same layout as [`format_local_datetime`] for an explicit zone.
pub fn format_datetime_in<Tz: TimeZone>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.with_timezone(tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// Rounded share of `value` in `total`, in percent. Zero when `total` is zero.
pub fn percentage(value: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((value as f64 / total as f64) * 100.0).round() as u64
}
