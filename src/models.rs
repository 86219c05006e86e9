use crate::errors::CalendarError;
use chrono::{Datelike, Days, NaiveDate};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// A calendar cell identifier. Months are 0-based (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0(), date.day())
    }

    /// Resolves the key to a calendar date. Day overflow rolls into the
    /// following month, so `2023-1-30` becomes 2 March 2023.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month.checked_add(1)?, 1)?;
        first.checked_add_days(Days::new(u64::from(self.day.saturating_sub(1))))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidDateKey(s.to_string());
        let mut parts = s.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        if month > 11 || !(1..=31).contains(&day) {
            return Err(invalid());
        }

        Ok(Self { year, month, day })
    }
}

/// Date key to count. A key is present only while its count is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedDays(BTreeMap<String, u32>);

impl MarkedDays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.0.get(key).copied()
    }

    pub fn count(&self, key: &DateKey) -> u32 {
        self.get(&key.to_string()).unwrap_or(0)
    }

    /// Upserts a positive count; zero or negative removes the key.
    pub fn set(&mut self, key: &DateKey, count: i64) {
        self.insert_raw(key.to_string(), count);
    }

    pub fn remove(&mut self, key: &DateKey) -> Option<u32> {
        self.0.remove(&key.to_string())
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.0.contains_key(&key.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert_raw(&mut self, key: String, count: i64) {
        if count <= 0 {
            self.0.remove(&key);
        } else {
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            self.0.insert(key, count);
        }
    }
}

impl FromIterator<(String, i64)> for MarkedDays {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        let mut days = Self::new();
        for (key, count) in iter {
            days.insert_raw(key, count);
        }
        days
    }
}

impl Serialize for MarkedDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Days(BTreeMap<String, i64>),
    // An empty document written by a PHP-style store comes back as `[]`.
    List(Vec<serde_json::Value>),
}

impl<'de> Deserialize<'de> for MarkedDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawDocument::deserialize(deserializer)? {
            RawDocument::Days(days) => Ok(days.into_iter().collect()),
            RawDocument::List(items) if items.is_empty() => Ok(Self::new()),
            RawDocument::List(_) => Err(D::Error::custom(
                "expected a JSON object mapping date keys to counts",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Unmarked,
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Tier::Unmarked,
            1 => Tier::Low,
            2 => Tier::Medium,
            _ => Tier::High,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Tier::Unmarked => "unmarked",
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Tier::Unmarked => "#1a1a1a",
            Tier::Low => "#ffa500",
            Tier::Medium => "#ff4444",
            Tier::High => "#cc0000",
        }
    }
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStatistics {
    pub year: i32,
    pub year_total: u64,
    pub per_month_total: [u64; 12],
    pub per_month_active_days: [u32; 12],
    pub active_days: u32,
    pub top_month: usize,
    pub top_month_total: u64,
    pub average: f64,
    pub days_since_last_activity: i64,
}

impl DerivedStatistics {
    pub fn top_month_name(&self) -> Option<&'static str> {
        if self.top_month_total == 0 {
            return None;
        }
        MONTH_NAMES.get(self.top_month).copied()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub count: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_formats_without_padding() {
        let key = DateKey::new(2024, 1, 5);
        assert_eq!(key.to_string(), "2024-1-5");
        assert_eq!("2024-1-5".parse::<DateKey>().unwrap(), key);
    }

    #[test]
    fn date_key_rejects_out_of_range_parts() {
        assert!("2024-12-1".parse::<DateKey>().is_err());
        assert!("2024-0-0".parse::<DateKey>().is_err());
        assert!("2024-0-32".parse::<DateKey>().is_err());
        assert!("2024-0".parse::<DateKey>().is_err());
        assert!("2024-0-1-1".parse::<DateKey>().is_err());
        assert!("abc".parse::<DateKey>().is_err());
    }

    #[test]
    fn date_key_accepts_short_month_overflow() {
        let key: DateKey = "2023-1-30".parse().unwrap();
        assert_eq!(key.to_date(), NaiveDate::from_ymd_opt(2023, 3, 2));
    }

    #[test]
    fn date_key_from_calendar_date_uses_zero_based_month() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(DateKey::from_date(date).to_string(), "2024-11-25");
    }

    #[test]
    fn set_zero_removes_key() {
        let key = DateKey::new(2024, 0, 1);
        let mut days = MarkedDays::new();
        days.set(&key, 3);
        assert_eq!(days.count(&key), 3);
        days.set(&key, 0);
        assert!(!days.contains(&key));
        days.set(&key, -2);
        assert!(days.is_empty());
    }

    #[test]
    fn deserialize_drops_non_positive_counts() {
        let days: MarkedDays =
            serde_json::from_str(r#"{"2024-0-1": 2, "2024-0-2": 0, "2024-0-3": -1}"#).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days.get("2024-0-1"), Some(2));
    }

    #[test]
    fn deserialize_accepts_empty_array() {
        let days: MarkedDays = serde_json::from_str("[]").unwrap();
        assert!(days.is_empty());
        assert!(serde_json::from_str::<MarkedDays>("[1]").is_err());
        assert!(serde_json::from_str::<MarkedDays>("\"x\"").is_err());
    }

    #[test]
    fn tiers_follow_count() {
        assert_eq!(Tier::from_count(0), Tier::Unmarked);
        assert_eq!(Tier::from_count(1), Tier::Low);
        assert_eq!(Tier::from_count(2), Tier::Medium);
        assert_eq!(Tier::from_count(3), Tier::High);
        assert_eq!(Tier::from_count(40), Tier::High);
    }
}
