use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::CaseTable;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Lower-cased statuses that count as completed. Matched exactly.
pub const DONE_STATUSES: [&str; 4] = ["success", "completed", "done", "ช่วยเหลือแล้ว"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub province: Option<String>,
    pub district: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
    /// Share of the table, rounded to one decimal place.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoneSplit {
    pub done: usize,
    pub active: usize,
}

/// Count occurrences of each key, most frequent first. Equal counts keep the
/// order in which their key first appeared.
fn count_by_first_seen<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

fn label_counts<'a, I>(labels: I, total: usize) -> Vec<LabelCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    count_by_first_seen(labels.into_iter().map(|l| l.unwrap_or(UNKNOWN_LABEL)))
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
            percent: percent_of(count, total),
        })
        .collect()
}

/// Rows per (province, district).
pub fn group_counts(table: &CaseTable) -> Vec<GroupCount> {
    let keys = table.iter().map(|case| {
        (
            case.location.province.as_deref(),
            case.location.district.as_deref(),
        )
    });
    count_by_first_seen(keys)
        .into_iter()
        .map(|((province, district), count)| GroupCount {
            province: province.map(str::to_string),
            district: district.map(str::to_string),
            count,
        })
        .collect()
}

/// Rows per resolved status, absent status counted as [`UNKNOWN_LABEL`].
pub fn status_counts(table: &CaseTable) -> Vec<LabelCount> {
    label_counts(table.iter().map(|case| case.resolved_status()), table.len())
}

pub fn type_counts(table: &CaseTable) -> Vec<LabelCount> {
    label_counts(
        table.iter().map(|case| case.location.type_name.as_deref()),
        table.len(),
    )
}

/// Rows per calendar day of `updated_at`, oldest first. Rows without
/// `updated_at` are left out.
pub fn daily_counts(table: &CaseTable) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for updated_at in table.iter().filter_map(|case| case.updated_at) {
        *days.entry(updated_at.date()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

pub fn is_done(status: Option<&str>) -> bool {
    status.is_some_and(|s| {
        let lowered = s.to_lowercase();
        DONE_STATUSES.contains(&lowered.as_str())
    })
}

pub fn done_split(table: &CaseTable) -> DoneSplit {
    let done = table
        .iter()
        .filter(|case| is_done(case.resolved_status()))
        .count();
    DoneSplit {
        done,
        active: table.len() - done,
    }
}

/// Rows updated at or after `now - days`. A window reaching past the
/// representable range counts every row with an `updated_at`.
pub fn recent_count(table: &CaseTable, now: NaiveDateTime, days: i64) -> usize {
    let cutoff = Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(NaiveDateTime::MIN);
    table
        .iter()
        .filter(|case| case.updated_at.is_some_and(|at| at >= cutoff))
        .count()
}

/// `(latitude, longitude)` for rows that have both.
pub fn map_points(table: &CaseTable) -> Vec<(f64, f64)> {
    table
        .iter()
        .filter_map(|case| case.location.coordinates())
        .collect()
}
