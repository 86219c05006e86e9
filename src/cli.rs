use crate::calendar::CalendarStore;
use crate::config::ClientConfig;
use crate::errors::CalendarError;
use crate::grid::{build_year_grid, MonthGrid};
use crate::models::{DateKey, DerivedStatistics};
use crate::remote::{HttpDocumentStore, DEFAULT_ENDPOINT};
use crate::stats::build_statistics_today;
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "habit_calendar", version, about = "Year-at-a-glance habit calendar")]
pub struct Cli {
    /// Calendar document endpoint used by the client commands
    #[arg(long, env = "CALENDAR_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, env = "CALENDAR_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the document server and calendar page (default)
    Serve,
    /// Print the year grid and its statistics
    Show {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Print the statistics for a year
    Stats {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Set the count for a day (YYYY-MM-DD); zero clears it
    Mark { date: NaiveDate, count: i64 },
    /// Clear a day (YYYY-MM-DD)
    Unmark { date: NaiveDate },
}

/// Runs a client command against the document server and returns what to print.
pub async fn run(command: Command, config: &ClientConfig) -> Result<String, CalendarError> {
    let remote = HttpDocumentStore::with_timeout(config.endpoint.clone(), config.timeout)?;
    let mut store = CalendarStore::new(remote);
    let this_year = Local::now().year();

    match command {
        Command::Serve => Ok(String::new()),
        Command::Show { year } => {
            store.load().await?;
            let year = year.unwrap_or(this_year);
            let stats = build_statistics_today(store.snapshot(), year);
            let months = build_year_grid(year, store.snapshot());
            Ok(format!(
                "{}\n{}",
                render_year_text(year, &months),
                render_stats_text(&stats)
            ))
        }
        Command::Stats { year } => {
            store.load().await?;
            let stats = build_statistics_today(store.snapshot(), year.unwrap_or(this_year));
            Ok(render_stats_text(&stats))
        }
        Command::Mark { date, count } => {
            // A failed load must not be followed by a save, or the remote
            // document would be overwritten with a near-empty mapping.
            store.load().await?;
            let key = DateKey::from_date(date);
            store.set(&key, count);
            store.persist().await?;
            Ok(format!("{date}: {}", store.count(&key)))
        }
        Command::Unmark { date } => {
            store.load().await?;
            store.delete(&DateKey::from_date(date));
            store.persist().await?;
            Ok(format!("{date}: cleared"))
        }
    }
}

pub fn render_year_text(year: i32, months: &[MonthGrid]) -> String {
    let mut out = format!("{year}\n");
    for month in months {
        let _ = writeln!(out, "\n{}", month.name);
        out.push_str(" Su Mo Tu We Th Fr Sa\n");

        let mut column = 0;
        for _ in 0..month.leading_blanks {
            out.push_str("   ");
            column += 1;
        }
        for cell in &month.days {
            let mark = match cell.count {
                0 => format!("{:>3}", "."),
                1..=9 => format!("{:>3}", cell.count),
                _ => format!("{:>3}", "+"),
            };
            out.push_str(&mark);
            column += 1;
            if column % 7 == 0 {
                out.push('\n');
            }
        }
        if column % 7 != 0 {
            out.push('\n');
        }
    }
    out
}

pub fn render_stats_text(stats: &DerivedStatistics) -> String {
    let top = match stats.top_month_name() {
        Some(name) => format!("{name} ({} times)", stats.top_month_total),
        None => "-".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Year:            {}", stats.year);
    let _ = writeln!(out, "Total:           {}", stats.year_total);
    let _ = writeln!(out, "Top month:       {top}");
    let _ = writeln!(out, "Monthly average: {}", stats.average);
    let _ = writeln!(out, "Active days:     {}", stats.active_days);
    let _ = writeln!(out, "Days since last: {}", stats.days_since_last_activity);
    out
}
