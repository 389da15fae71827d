use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One tracked habit and its counters.
///
/// Field names are persisted in camelCase. Everything past `name` falls back
/// to its empty value so blobs written before the daily logs existed still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Urge {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub last_tap_date: Option<NaiveDate>,
    #[serde(default)]
    pub daily_resisted: BTreeMap<String, u64>,
    #[serde(default)]
    pub daily_relapsed: BTreeMap<String, u64>,
    #[serde(default)]
    pub badges_earned: Vec<String>,
}

impl Urge {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            total_count: 0,
            current_streak: 0,
            best_streak: 0,
            last_tap_date: None,
            daily_resisted: BTreeMap::new(),
            daily_relapsed: BTreeMap::new(),
            badges_earned: Vec::new(),
        }
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges_earned.iter().any(|earned| earned == badge)
    }
}

#[derive(Debug, Deserialize)]
pub struct UrgeNameRequest {
    pub name: String,
}

/// `?urge=<id>` selection. Kept raw so an empty or stale value falls back
/// to the first urge instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct SelectQuery {
    pub urge: Option<String>,
}

impl SelectQuery {
    pub fn selected(&self) -> Option<Uuid> {
        self.urge
            .as_deref()
            .and_then(|raw| raw.trim().parse::<Uuid>().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: String,
    pub resisted: u64,
    pub relapsed: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_days: usize,
    pub total_resisted: u64,
    pub total_relapsed: u64,
    pub longest_no_relapse_streak: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub urge_id: Uuid,
    pub name: String,
    pub days: Vec<DailyPoint>,
    pub summary: StatsSummary,
}
