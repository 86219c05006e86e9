use crate::grid::MonthGrid;
use crate::models::{DerivedStatistics, MONTH_NAMES};
use crate::session::{CalendarView, EditSurface, Notice, NoticeKind};
use std::fmt::Write as _;

const DAY_HEADERS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

pub fn render_page(view: &CalendarView) -> String {
    INDEX_HTML
        .replace("{{YEAR}}", &view.year.to_string())
        .replace("{{NOTICE}}", &render_notice(view.notice.as_ref()))
        .replace("{{STATS}}", &render_stats(&view.statistics))
        .replace("{{MONTHS}}", &render_months(&view.months, &view.statistics))
        .replace("{{EDITOR}}", &render_editor(view.editor))
}

fn render_notice(notice: Option<&Notice>) -> String {
    match notice {
        Some(notice) => {
            let kind = match notice.kind {
                NoticeKind::Info => "ok",
                NoticeKind::Error => "error",
            };
            format!(
                r#"<p class="status" data-type="{kind}">{}</p>"#,
                notice.message
            )
        }
        None => String::new(),
    }
}

fn render_stats(stats: &DerivedStatistics) -> String {
    let (top_name, top_detail) = match stats.top_month_name() {
        Some(name) => (name, format!("{} times", stats.top_month_total)),
        None => ("-", "0 times".to_string()),
    };

    let mut html = String::new();
    for (label, value, detail) in [
        ("Total", stats.year_total.to_string(), String::new()),
        ("Top month", top_name.to_string(), top_detail),
        ("Monthly average", stats.average.to_string(), String::new()),
        ("Active days", stats.active_days.to_string(), String::new()),
        (
            "Days since last",
            stats.days_since_last_activity.to_string(),
            String::new(),
        ),
    ] {
        let _ = write!(
            html,
            r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span><span class="hint">{detail}</span></div>"#
        );
    }
    html
}

fn render_months(months: &[MonthGrid], stats: &DerivedStatistics) -> String {
    let mut html = String::new();
    for month in months {
        let index = month.month as usize;
        let total = stats.per_month_total[index];
        let active = stats.per_month_active_days[index];

        let _ = write!(
            html,
            r#"<div class="month"><div class="month-header"><span class="month-name">{}</span><span class="month-stats"><span title="Total: {total} times">{total}</span><span title="Active days: {active}">{active}</span></span></div><div class="days">"#,
            month.name
        );
        for header in DAY_HEADERS {
            let _ = write!(html, r#"<div class="day-header">{header}</div>"#);
        }
        for _ in 0..month.leading_blanks {
            html.push_str(r#"<div class="day empty"></div>"#);
        }
        for cell in &month.days {
            let _ = write!(
                html,
                r#"<a class="day {}" style="--tier: {}" href="/edit/{}" data-count="{}">{}</a>"#,
                cell.tier.css_class(),
                cell.tier.color(),
                cell.key,
                cell.count,
                cell.day
            );
        }
        html.push_str("</div></div>");
    }
    html
}

fn render_editor(editor: Option<EditSurface>) -> String {
    let Some(surface) = editor else {
        return String::new();
    };
    let month = MONTH_NAMES
        .get(surface.key.month as usize)
        .copied()
        .unwrap_or_default();

    format!(
        r#"<div class="modal"><form class="modal-card" method="post" action="/edit">
      <h2>{day} {month} {year}</h2>
      <label>How many times?<input type="number" name="count" min="0" value="{count}" autofocus /></label>
      <div class="actions">
        <button type="submit" class="btn-save">Save</button>
        <button type="submit" class="btn-delete" formaction="/edit/delete">Delete</button>
        <button type="submit" class="btn-cancel" formaction="/edit/cancel">Cancel</button>
      </div>
    </form></div>"#,
        day = surface.key.day,
        year = surface.key.year,
        count = surface.count,
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Calendar {{YEAR}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg: #0f0f0f;
      --card: #1c1c1c;
      --ink: #f1ede6;
      --muted: #8b857d;
      --accent: #ff6b4a;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: center;
      gap: 18px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    header form {
      margin: 0;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--card);
      color: var(--ink);
    }

    .status {
      text-align: center;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #ff6b5a;
    }

    .status[data-type="ok"] {
      color: #5fd08a;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 14px;
      margin: 24px auto;
      max-width: 1100px;
    }

    .stat {
      background: var(--card);
      border-radius: 16px;
      padding: 16px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .hint {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .calendar {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
      gap: 18px;
      max-width: 1100px;
      margin: 0 auto;
    }

    .month {
      background: var(--card);
      border-radius: 16px;
      padding: 14px;
    }

    .month-header {
      display: flex;
      justify-content: space-between;
      margin-bottom: 10px;
    }

    .month-stats span {
      margin-left: 8px;
      color: var(--muted);
    }

    .days {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 4px;
    }

    .day-header {
      text-align: center;
      font-size: 0.75rem;
      color: var(--muted);
    }

    .day {
      aspect-ratio: 1;
      display: grid;
      place-items: center;
      border-radius: 8px;
      font-size: 0.8rem;
      color: var(--ink);
      text-decoration: none;
      background: var(--tier);
      border: 1px solid #2a2a2a;
    }

    .day.empty {
      background: transparent;
      border: none;
    }

    .day.low,
    .day.medium,
    .day.high {
      color: white;
      border-color: var(--tier);
    }

    .modal {
      position: fixed;
      inset: 0;
      background: rgba(0, 0, 0, 0.6);
      display: grid;
      place-items: center;
    }

    .modal-card {
      background: var(--card);
      border-radius: 20px;
      padding: 28px;
      display: grid;
      gap: 16px;
      min-width: 280px;
    }

    .modal-card input {
      display: block;
      width: 100%;
      margin-top: 8px;
      padding: 10px;
      font-size: 1.1rem;
      border-radius: 10px;
      border: 1px solid #333;
      background: #111;
      color: var(--ink);
    }

    .actions {
      display: flex;
      gap: 10px;
    }

    .btn-save {
      background: var(--accent);
      color: white;
    }
  </style>
</head>
<body>
  <header>
    <form method="post" action="/year/prev"><button type="submit">&larr;</button></form>
    <h1>{{YEAR}}</h1>
    <form method="post" action="/year/next"><button type="submit">&rarr;</button></form>
  </header>
  {{NOTICE}}
  <section class="panel">{{STATS}}</section>
  <section class="calendar">{{MONTHS}}</section>
  {{EDITOR}}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_year_grid;
    use crate::models::{DateKey, MarkedDays};
    use crate::stats::build_statistics;
    use chrono::NaiveDate;

    fn view_for(days: &MarkedDays, editor: Option<EditSurface>) -> CalendarView {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        CalendarView {
            year: 2024,
            months: build_year_grid(2024, days),
            statistics: build_statistics(days, 2024, today),
            editor,
            notice: None,
        }
    }

    #[test]
    fn page_links_every_day_to_its_editor() {
        let mut days = MarkedDays::new();
        days.set(&DateKey::new(2024, 1, 29), 2);

        let html = render_page(&view_for(&days, None));
        assert!(html.contains("<h1>2024</h1>"));
        assert!(html.contains(r#"href="/edit/2024-1-29" data-count="2""#));
        assert!(html.contains(r#"class="day medium""#));
        assert_eq!(html.matches(r#"href="/edit/"#).count(), 366);
        assert!(html.contains("February"));
        assert!(!html.contains("modal-card"));
    }

    #[test]
    fn empty_year_shows_dash_for_top_month() {
        let html = render_page(&view_for(&MarkedDays::new(), None));
        assert!(html.contains(r#"<span class="value">-</span>"#));
    }

    #[test]
    fn editor_is_prefilled() {
        let surface = EditSurface {
            key: DateKey::new(2024, 2, 14),
            count: 3,
        };
        let html = render_page(&view_for(&MarkedDays::new(), Some(surface)));
        assert!(html.contains("<h2>14 March 2024</h2>"));
        assert!(html.contains(r#"value="3""#));
    }
}
