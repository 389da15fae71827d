use chrono::{Duration, Local, NaiveDate};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Current calendar day in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Canonical `YYYY-MM-DD` key used for every daily log map.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).ok()
}

pub fn yesterday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}
