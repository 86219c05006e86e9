use crate::models::{DateKey, MONTH_NAMES, MarkedDays, Tier};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub key: DateKey,
    pub day: u32,
    pub count: u32,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub month: u32,
    pub name: &'static str,
    /// Empty cells before the 1st, Sunday first.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

pub fn build_year_grid(year: i32, days: &MarkedDays) -> Vec<MonthGrid> {
    (0..12)
        .filter_map(|month| build_month_grid(year, month, days))
        .collect()
}

/// Lays out one month using its real length. `month` is 0-based.
pub fn build_month_grid(year: i32, month: u32, days: &MarkedDays) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month + 1, 1)?;
    let cells = (1..=days_in_month(year, month)?)
        .map(|day| {
            let key = DateKey::new(year, month, day);
            let count = days.count(&key);
            DayCell {
                key,
                day,
                count,
                tier: Tier::from_count(count),
            }
        })
        .collect();

    Some(MonthGrid {
        month,
        name: MONTH_NAMES[month as usize],
        leading_blanks: first.weekday().num_days_from_sunday(),
        days: cells,
    })
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month + 1, 1)?;
    let next = if month == 11 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 2, 1)?
    };
    Some((next - first).num_days() as u32)
}
