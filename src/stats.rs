use crate::models::{DateKey, DerivedStatistics, MarkedDays};
use chrono::{Local, NaiveDate};

const PROBE_DAYS: u32 = 31;

pub fn build_statistics_today(days: &MarkedDays, year: i32) -> DerivedStatistics {
    build_statistics(days, year, Local::now().date_naive())
}

pub fn build_statistics(days: &MarkedDays, year: i32, today: NaiveDate) -> DerivedStatistics {
    let mut per_month_total = [0u64; 12];
    let mut per_month_active_days = [0u32; 12];

    for month in 0..12u32 {
        per_month_total[month as usize] = month_total(days, year, month);
        per_month_active_days[month as usize] = month_active_days(days, year, month);
    }

    let year_total: u64 = per_month_total.iter().sum();
    let active_days: u32 = per_month_active_days.iter().sum();

    let mut top_month = 0;
    let mut top_month_total = per_month_total[0];
    for (month, total) in per_month_total.iter().enumerate().skip(1) {
        if *total > top_month_total {
            top_month = month;
            top_month_total = *total;
        }
    }

    DerivedStatistics {
        year,
        year_total,
        per_month_total,
        per_month_active_days,
        active_days,
        top_month,
        top_month_total,
        average: monthly_average(year_total),
        days_since_last_activity: days_since_last_activity(days, today),
    }
}

/// Sums days 1..=31 of the month whether or not the month has that many days.
pub fn month_total(days: &MarkedDays, year: i32, month: u32) -> u64 {
    (1..=PROBE_DAYS)
        .map(|day| u64::from(days.count(&DateKey::new(year, month, day))))
        .sum()
}

pub fn month_active_days(days: &MarkedDays, year: i32, month: u32) -> u32 {
    (1..=PROBE_DAYS)
        .filter(|day| days.count(&DateKey::new(year, month, *day)) > 0)
        .count() as u32
}

/// Year total spread over all twelve months, rounded to one decimal.
pub fn monthly_average(year_total: u64) -> f64 {
    (year_total as f64 / 12.0 * 10.0).round() / 10.0
}

/// Whole days since the latest marked day on or before `today`, looking at
/// every year in the snapshot. Zero when nothing qualifies.
pub fn days_since_last_activity(days: &MarkedDays, today: NaiveDate) -> i64 {
    days.iter()
        .filter(|(_, count)| *count > 0)
        .filter_map(|(key, _)| key.parse::<DateKey>().ok()?.to_date())
        .filter(|date| *date <= today)
        .max()
        .map(|last| (today - last).num_days())
        .unwrap_or(0)
}
