use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::models::{Case, CaseTable, LocationPayload, NormalizedLocation, RawRecord, DATE_FIELDS};

use super::location::try_normalize;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// A per-row value that could not be parsed and was left absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub row: usize,
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub table: CaseTable,
    pub warnings: Vec<ParseWarning>,
}

/// Build the case table, discarding warnings.
pub fn build(records: Vec<RawRecord>) -> CaseTable {
    build_report(records).table
}

pub fn build_report(records: Vec<RawRecord>) -> BuildReport {
    let mut warnings = Vec::new();
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(row, record)| build_case(row, record, &mut warnings))
        .collect();

    for warning in &warnings {
        tracing::debug!(
            "row {}: could not parse {} from {:?}",
            warning.row,
            warning.field,
            warning.value
        );
    }

    BuildReport {
        table: CaseTable::new(rows),
        warnings,
    }
}

fn build_case(row: usize, mut record: RawRecord, warnings: &mut Vec<ParseWarning>) -> Case {
    let mut dates: [Option<NaiveDateTime>; 4] = [None; 4];
    for (slot, field) in dates.iter_mut().zip(DATE_FIELDS) {
        let Some(value) = record.shift_remove(field) else {
            continue;
        };
        *slot = parse_timestamp(&value);
        if slot.is_none() && !is_blank(&value) {
            warnings.push(ParseWarning {
                row,
                field,
                value: value.to_string(),
            });
        }
    }

    let payload = LocationPayload::from(record.shift_remove("location"));
    let location = try_normalize(&payload).unwrap_or_else(|| {
        warnings.push(ParseWarning {
            row,
            field: "location",
            value: payload_text(&payload),
        });
        NormalizedLocation::default()
    });

    let id = record.shift_remove("id").and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    let [created_at, updated_at, expired_at, date] = dates;
    Case {
        id,
        created_at,
        updated_at,
        expired_at,
        date,
        location,
        fields: scalar_fields(record),
    }
}

fn scalar_fields(record: RawRecord) -> Map<String, Value> {
    record
        .into_iter()
        .filter(|(_, v)| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn payload_text(payload: &LocationPayload) -> String {
    match payload {
        LocationPayload::RawString(s) => s.clone(),
        LocationPayload::Other(v) => v.to_string(),
        _ => String::new(),
    }
}

/// Coerce a date-like value to a naive UTC timestamp.
///
/// Offset-carrying strings are converted to UTC and the offset dropped; naive
/// strings are taken as already UTC. Slash-separated dates (`2024/11/28`) are
/// accepted alongside the dashed forms.
///
/// Numbers are Unix epoch *seconds*, which is what the feed emits. Tools that
/// default to epoch nanoseconds would read the same number differently; values
/// in nanoseconds fall outside chrono's range here and come out absent.
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            let secs = n.as_f64()?;
            if !secs.is_finite() {
                return None;
            }
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1e9).round() as u32;
            DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
