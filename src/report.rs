use std::fmt;

use crate::analysis::Dashboard;

const TOP_ROWS: usize = 15;

/// Plain-text rendering for the terminal.
impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = &self.key_figures;

        writeln!(f, "Key figures ({})", self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "  Total cases:              {:>8}", k.total)?;
        writeln!(f, "  Active / not completed:   {:>8}", k.active)?;
        writeln!(f, "  Completed / done:         {:>8}", k.done)?;
        writeln!(
            f,
            "  Updated in last {} days:   {:>8}",
            self.recent_days, k.recent
        )?;

        writeln!(f, "\nCases by district")?;
        for group in self.by_district.iter().take(TOP_ROWS) {
            writeln!(
                f,
                "  {:<24} {:<24} {:>6}",
                group.province.as_deref().unwrap_or("-"),
                group.district.as_deref().unwrap_or("-"),
                group.count
            )?;
        }
        if self.by_district.len() > TOP_ROWS {
            writeln!(f, "  ... {} more", self.by_district.len() - TOP_ROWS)?;
        }

        writeln!(f, "\nCases by status")?;
        for status in &self.by_status {
            writeln!(
                f,
                "  {:<32} {:>6} {:>6.1}%",
                status.label, status.count, status.percent
            )?;
        }

        writeln!(f, "\nCases by need / type")?;
        for kind in self.by_type.iter().take(TOP_ROWS) {
            writeln!(f, "  {:<32} {:>6}", kind.label, kind.count)?;
        }

        writeln!(f, "\nDaily cases (by last update)")?;
        for day in &self.daily {
            writeln!(f, "  {} {:>6}", day.date.format("%Y-%m-%d"), day.count)?;
        }

        writeln!(f, "\nCases with map coordinates: {}", self.mapped_cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::build;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn display_lists_every_section() {
        let table = build(vec![json!({
            "id": 1,
            "updated_at": "2024-11-27 10:00:00",
            "location": {"properties": {"province": "Songkhla", "district": "Hat Yai", "status_text": "done"}},
        })
        .as_object()
        .cloned()
        .unwrap()]);
        let now = Utc.with_ymd_and_hms(2024, 11, 28, 0, 0, 0).unwrap();

        let text = Dashboard::build(&table, now, 7).to_string();
        assert!(text.contains("Key figures (2024-11-28 00:00 UTC)"));
        assert!(text.contains("Hat Yai"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("2024-11-27      1"));
        assert!(text.ends_with("Cases with map coordinates: 0\n"));
    }

    #[test]
    fn long_district_lists_are_truncated() {
        let records = (0..TOP_ROWS + 2)
            .map(|i| {
                json!({"location": {"properties": {"province": "Songkhla", "district": format!("D{i}")}}})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();
        let now = Utc.with_ymd_and_hms(2024, 11, 28, 0, 0, 0).unwrap();

        let text = Dashboard::build(&build(records), now, 7).to_string();
        assert!(text.contains("  ... 2 more\n"));
        assert!(!text.contains("D16"));
    }
}
