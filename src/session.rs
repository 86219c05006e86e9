use crate::calendar::CalendarStore;
use crate::errors::CalendarError;
use crate::grid::{build_year_grid, MonthGrid};
use crate::models::{DateKey, DerivedStatistics};
use crate::remote::DocumentStore;
use crate::stats::build_statistics;
use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::error;

pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Short-lived status message shown after a load or save.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub raised_at: Instant,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Info,
            raised_at: Instant::now(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
            raised_at: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < NOTICE_TTL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSurface {
    pub key: DateKey,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct CalendarView {
    pub year: i32,
    pub months: Vec<MonthGrid>,
    pub statistics: DerivedStatistics,
    pub editor: Option<EditSurface>,
    pub notice: Option<Notice>,
}

/// State owned by a calendar front end: the store, the displayed year, the
/// open editor and the latest notice.
#[derive(Debug)]
pub struct CalendarSession<S> {
    store: CalendarStore<S>,
    year: i32,
    editor: Option<EditSurface>,
    notice: Option<Notice>,
}

impl<S: DocumentStore> CalendarSession<S> {
    pub fn new(store: CalendarStore<S>, year: i32) -> Self {
        Self {
            store,
            year,
            editor: None,
            notice: None,
        }
    }

    /// One-time load of the remote document.
    pub async fn start(&mut self) {
        match self.store.load().await {
            Ok(_) => self.notice = Some(Notice::info("Data loaded")),
            Err(err) => self.report("Could not connect to the calendar store", &err),
        }
    }

    /// Re-reads the remote document so edits made elsewhere since the last
    /// load are not overwritten by the next save. The displayed year and
    /// open editor are kept. Returns false when the store could not be read.
    pub async fn reload(&mut self) -> bool {
        match self.store.load().await {
            Ok(_) => true,
            Err(err) => {
                self.report("Could not connect to the calendar store", &err);
                false
            }
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Moves the displayed year. The loaded snapshot already spans every year,
    /// so nothing is fetched.
    pub fn change_year(&mut self, delta: i32) {
        self.year = self.year.saturating_add(delta);
    }

    pub fn open_editor(&mut self, key: DateKey) -> EditSurface {
        let surface = EditSurface {
            key,
            count: self.store.count(&key),
        };
        self.editor = Some(surface);
        surface
    }

    pub fn editor(&self) -> Option<EditSurface> {
        self.editor
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Applies the edit surface's count and writes the document through.
    /// Unparsable input counts as zero, which removes the day.
    pub async fn confirm_edit(&mut self, raw_count: &str) {
        let Some(surface) = self.editor.take() else {
            return;
        };
        self.store.set(&surface.key, parse_count(raw_count));
        self.save().await;
    }

    pub async fn delete_entry(&mut self) {
        let Some(surface) = self.editor.take() else {
            return;
        };
        self.store.delete(&surface.key);
        self.save().await;
    }

    pub fn store(&self) -> &CalendarStore<S> {
        &self.store
    }

    pub fn active_notice(&self) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible_at(Instant::now()))
    }

    pub fn view(&self, today: NaiveDate) -> CalendarView {
        let snapshot = self.store.snapshot();
        CalendarView {
            year: self.year,
            months: build_year_grid(self.year, snapshot),
            statistics: build_statistics(snapshot, self.year, today),
            editor: self.editor,
            notice: self.active_notice().cloned(),
        }
    }

    async fn save(&mut self) {
        match self.store.persist().await {
            Ok(()) => self.notice = Some(Notice::info("Saved")),
            Err(err) => self.report("Could not save the calendar", &err),
        }
    }

    fn report(&mut self, message: &str, err: &CalendarError) {
        error!("{message}: {err}");
        self.notice = Some(Notice::error(message));
    }
}

/// Reads a count the way a lenient form field does: an optional sign and
/// leading digits, anything else is zero.
pub fn parse_count(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => (-1, &raw[1..]),
        Some(b'+') => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|value| sign * value)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarkedDays;
    use crate::remote::testing::MemoryDocumentStore;

    fn session_with(document: MarkedDays) -> (CalendarSession<MemoryDocumentStore>, MemoryDocumentStore) {
        let remote = MemoryDocumentStore::with_document(document);
        let session = CalendarSession::new(CalendarStore::new(remote.clone()), 2024);
        (session, remote)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[tokio::test]
    async fn start_loads_once_and_year_changes_do_not_refetch() {
        let mut document = MarkedDays::new();
        document.set(&DateKey::new(2023, 4, 2), 3);
        let (mut session, remote) = session_with(document);

        session.start().await;
        assert_eq!(remote.fetches(), 1);
        assert_eq!(session.view(today()).statistics.year_total, 0);

        session.change_year(-1);
        let view = session.view(today());
        assert_eq!(view.year, 2023);
        assert_eq!(view.statistics.year_total, 3);
        assert_eq!(view.months[4].days[1].count, 3);
        assert_eq!(remote.fetches(), 1);
    }

    #[tokio::test]
    async fn confirm_edit_writes_through() {
        let (mut session, remote) = session_with(MarkedDays::new());
        session.start().await;
        let key = DateKey::new(2024, 2, 8);

        let surface = session.open_editor(key);
        assert_eq!(surface.count, 0);
        session.confirm_edit("2").await;

        assert_eq!(session.editor(), None);
        assert_eq!(remote.document().count(&key), 2);
        assert_eq!(remote.writes(), 1);

        assert_eq!(session.open_editor(key).count, 2);
        session.confirm_edit("0").await;
        assert!(!remote.document().contains(&key));
        assert_eq!(remote.writes(), 2);
    }

    #[tokio::test]
    async fn reload_keeps_days_written_elsewhere() {
        let (mut session, remote) = session_with(MarkedDays::new());
        session.start().await;

        let mut elsewhere = MarkedDays::new();
        elsewhere.set(&DateKey::new(2024, 0, 1), 5);
        remote.replace(&elsewhere).await.unwrap();

        let key = DateKey::new(2024, 0, 2);
        session.open_editor(key);
        assert!(session.reload().await);
        assert_eq!(session.editor().map(|surface| surface.key), Some(key));
        session.confirm_edit("1").await;

        let document = remote.document();
        assert_eq!(document.count(&DateKey::new(2024, 0, 1)), 5);
        assert_eq!(document.count(&key), 1);
        assert_eq!(remote.fetches(), 2);
    }

    #[tokio::test]
    async fn failed_reload_raises_error_notice() {
        let (mut session, remote) = session_with(MarkedDays::new());
        session.start().await;
        remote.set_offline(true);

        assert!(!session.reload().await);
        assert_eq!(session.active_notice().unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn garbage_count_deletes_the_day() {
        let mut document = MarkedDays::new();
        let key = DateKey::new(2024, 0, 1);
        document.set(&key, 5);
        let (mut session, remote) = session_with(document);
        session.start().await;

        session.open_editor(key);
        session.confirm_edit("lots").await;
        assert!(remote.document().is_empty());
    }

    #[tokio::test]
    async fn delete_entry_removes_and_saves() {
        let mut document = MarkedDays::new();
        let key = DateKey::new(2024, 7, 20);
        document.set(&key, 1);
        let (mut session, remote) = session_with(document);
        session.start().await;

        session.open_editor(key);
        session.delete_entry().await;
        assert!(remote.document().is_empty());
        assert_eq!(session.editor(), None);
    }

    #[tokio::test]
    async fn edits_without_open_editor_are_ignored() {
        let (mut session, remote) = session_with(MarkedDays::new());
        session.confirm_edit("4").await;
        session.delete_entry().await;
        assert_eq!(remote.writes(), 0);
    }

    #[tokio::test]
    async fn failures_become_error_notices() {
        let (mut session, remote) = session_with(MarkedDays::new());
        remote.set_offline(true);
        session.start().await;

        let notice = session.active_notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(session.store().snapshot().is_empty());

        let key = DateKey::new(2024, 1, 1);
        session.open_editor(key);
        session.confirm_edit("3").await;
        assert_eq!(session.active_notice().unwrap().kind, NoticeKind::Error);
        assert_eq!(session.store().count(&key), 3);
    }

    #[test]
    fn notices_expire() {
        let notice = Notice::info("Saved");
        assert!(notice.is_visible_at(notice.raised_at));
        assert!(!notice.is_visible_at(notice.raised_at + NOTICE_TTL));
    }

    #[test]
    fn parse_count_is_lenient() {
        assert_eq!(parse_count("3"), 3);
        assert_eq!(parse_count(" 12abc"), 12);
        assert_eq!(parse_count("-2"), -2);
        assert_eq!(parse_count("+4"), 4);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("x1"), 0);
        assert_eq!(parse_count("-"), 0);
    }
}
