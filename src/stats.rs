use crate::days::{day_key, parse_day_key};
use crate::models::{DailyPoint, StatsResponse, StatsSummary, Urge};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn build_stats(urge: &Urge) -> StatsResponse {
    let days = daily_points(urge);
    let summary = summarize(&days);

    StatsResponse {
        urge_id: urge.id,
        name: urge.name.clone(),
        days,
        summary,
    }
}

/// One point per logged day, oldest first. Keys that do not parse as a day are skipped;
/// keys that name the same day (e.g. `2026-1-5` and `2026-01-05`) are summed.
pub fn daily_points(urge: &Urge) -> Vec<DailyPoint> {
    let mut by_day: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();

    for (key, count) in &urge.daily_resisted {
        if let Some(date) = parse_day_key(key) {
            let entry = by_day.entry(date).or_default();
            entry.0 = entry.0.saturating_add(*count);
        }
    }
    for (key, count) in &urge.daily_relapsed {
        if let Some(date) = parse_day_key(key) {
            let entry = by_day.entry(date).or_default();
            entry.1 = entry.1.saturating_add(*count);
        }
    }

    by_day
        .into_iter()
        .map(|(date, (resisted, relapsed))| DailyPoint {
            date: day_key(date),
            resisted,
            relapsed,
        })
        .collect()
}

// The no-relapse run counts logged days; a day with no entry does not break it.
pub fn summarize(days: &[DailyPoint]) -> StatsSummary {
    let mut summary = StatsSummary {
        total_days: days.len(),
        ..StatsSummary::default()
    };

    let mut run = 0usize;
    for point in days {
        summary.total_resisted = summary.total_resisted.saturating_add(point.resisted);
        summary.total_relapsed = summary.total_relapsed.saturating_add(point.relapsed);

        if point.relapsed == 0 {
            run += 1;
            summary.longest_no_relapse_streak = summary.longest_no_relapse_streak.max(run);
        } else {
            run = 0;
        }
    }

    summary
}
