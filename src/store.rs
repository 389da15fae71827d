use crate::days::{day_key, today, yesterday_of};
use crate::models::Urge;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Streak lengths that award a badge the first time they are reached.
pub const BADGE_MILESTONES: [u32; 3] = [7, 30, 100];

pub fn badge_name(milestone: u32) -> String {
    format!("{milestone}-Day Streak")
}

/// The whole collection of urges. Serialized as one blob under a fixed key.
///
/// Mutations on an unknown id leave the collection untouched and return `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrgeStore {
    #[serde(rename = "savedUrges", default)]
    urges: Vec<Urge>,
}

impl UrgeStore {
    pub fn urges(&self) -> &[Urge] {
        &self.urges
    }

    pub fn len(&self) -> usize {
        self.urges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urges.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Urge> {
        self.urges.iter().find(|urge| urge.id == id)
    }

    /// The selected urge, or the first one when nothing is selected or the
    /// selection no longer exists.
    pub fn main_urge(&self, selected: Option<Uuid>) -> Option<&Urge> {
        selected
            .and_then(|id| self.get(id))
            .or_else(|| self.urges.first())
    }

    pub fn add(&mut self, name: &str) -> Urge {
        let urge = Urge::new(name.trim());
        info!(id = %urge.id, name = %urge.name, "urge added");
        self.urges.push(urge.clone());
        urge
    }

    pub fn rename(&mut self, id: Uuid, name: &str) -> Option<Urge> {
        let urge = self.get_mut(id)?;
        urge.name = name.trim().to_string();
        debug!(%id, name = %urge.name, "urge renamed");
        Some(urge.clone())
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Urge> {
        let idx = self.urges.iter().position(|urge| urge.id == id)?;
        let removed = self.urges.remove(idx);
        info!(%id, "urge removed");
        Some(removed)
    }

    pub fn record_tap(&mut self, id: Uuid) -> Option<Urge> {
        self.record_tap_on(id, today())
    }

    pub fn record_tap_on(&mut self, id: Uuid, today: NaiveDate) -> Option<Urge> {
        let urge = self.get_mut(id)?;
        let key = day_key(today);

        urge.total_count = urge.total_count.saturating_add(1);
        let resisted = urge.daily_resisted.entry(key).or_insert(0);
        *resisted = resisted.saturating_add(1);

        urge.current_streak = next_streak(urge.last_tap_date, urge.current_streak, today);
        urge.last_tap_date = Some(today);
        urge.best_streak = urge.best_streak.max(urge.current_streak);

        for milestone in BADGE_MILESTONES {
            let badge = badge_name(milestone);
            if urge.current_streak == milestone && !urge.has_badge(&badge) {
                info!(%id, %badge, "badge earned");
                urge.badges_earned.push(badge);
            }
        }

        debug!(
            %id,
            total = urge.total_count,
            streak = urge.current_streak,
            "tap recorded"
        );
        Some(urge.clone())
    }

    pub fn reset(&mut self, id: Uuid) -> Option<Urge> {
        self.reset_on(id, today())
    }

    /// Logs a relapse for `today` and clears the running count and streak.
    /// Best streak, badges and daily history are kept.
    pub fn reset_on(&mut self, id: Uuid, today: NaiveDate) -> Option<Urge> {
        let urge = self.get_mut(id)?;

        let relapsed = urge.daily_relapsed.entry(day_key(today)).or_insert(0);
        *relapsed = relapsed.saturating_add(1);

        urge.total_count = 0;
        urge.current_streak = 0;
        urge.last_tap_date = None;

        info!(%id, "relapse logged");
        Some(urge.clone())
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Urge> {
        self.urges.iter_mut().find(|urge| urge.id == id)
    }
}

fn next_streak(last_tap: Option<NaiveDate>, current: u32, today: NaiveDate) -> u32 {
    match last_tap {
        Some(last) if last == yesterday_of(today) => current.saturating_add(1),
        Some(last) if last == today => current,
        _ => 1,
    }
}
