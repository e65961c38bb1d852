use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::CaseTable;

use super::aggregate::{
    daily_counts, done_split, group_counts, map_points, recent_count, status_counts, type_counts,
    DailyCount, GroupCount, LabelCount,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyFigures {
    pub total: usize,
    pub active: usize,
    pub done: usize,
    pub recent: usize,
}

/// Everything the presentation layer shows for one filtered table.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub recent_days: i64,
    pub key_figures: KeyFigures,
    pub by_district: Vec<GroupCount>,
    pub by_status: Vec<LabelCount>,
    pub by_type: Vec<LabelCount>,
    pub daily: Vec<DailyCount>,
    pub mapped_cases: usize,
}

pub fn key_figures(table: &CaseTable, now: DateTime<Utc>, recent_days: i64) -> KeyFigures {
    let split = done_split(table);
    KeyFigures {
        total: table.len(),
        active: split.active,
        done: split.done,
        recent: recent_count(table, now.naive_utc(), recent_days),
    }
}

impl Dashboard {
    pub fn build(table: &CaseTable, now: DateTime<Utc>, recent_days: i64) -> Self {
        Self {
            generated_at: now,
            recent_days,
            key_figures: key_figures(table, now, recent_days),
            by_district: group_counts(table),
            by_status: status_counts(table),
            by_type: type_counts(table),
            daily: daily_counts(table),
            mapped_cases: map_points(table).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::build;
    use serde_json::json;

    #[test]
    fn dashboard_totals_agree() {
        let records = json!([
            {"id": 1, "updated_at": "2024-11-27T10:00:00+07:00",
             "location": {"geometry": {"coordinates": [100.47, 7.0]},
                          "properties": {"province": "Songkhla", "amphoe": "Hat Yai", "status": "Success", "help_type": "food"}}},
            {"id": 2, "updated_at": "2024-11-10 10:00:00",
             "location": "{\"properties\": {\"changwat\": \"Yala\", \"sos_status\": \"waiting\"}}"},
            {"id": 3, "location": 17},
        ]);
        let records = records
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        let table = build(records);
        let now = DateTime::parse_from_rfc3339("2024-11-28T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let dashboard = Dashboard::build(&table, now, 7);
        assert_eq!(
            dashboard.key_figures,
            KeyFigures { total: 3, active: 2, done: 1, recent: 1 }
        );
        assert_eq!(dashboard.by_district.iter().map(|g| g.count).sum::<usize>(), 3);
        assert_eq!(dashboard.by_status.len(), 3);
        assert_eq!(dashboard.by_type[0].label, "Unknown");
        assert_eq!(dashboard.by_type[0].count, 2);
        assert_eq!(dashboard.by_type[1].label, "food");
        assert_eq!(dashboard.daily.len(), 2);
        assert_eq!(dashboard.mapped_cases, 1);

        let encoded = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(encoded["key_figures"]["done"], json!(1));
        assert_eq!(encoded["daily"][0]["date"], json!("2024-11-10"));
    }
}
