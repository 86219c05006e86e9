use crate::errors::CalendarError;
use crate::models::{DateKey, MarkedDays};
use crate::remote::DocumentStore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// In-memory marked days plus the document they are loaded from and saved to.
///
/// Mutations only touch memory; callers follow every user edit with
/// [`CalendarStore::persist`].
#[derive(Debug)]
pub struct CalendarStore<S> {
    remote: S,
    days: MarkedDays,
}

impl<S: DocumentStore> CalendarStore<S> {
    pub fn new(remote: S) -> Self {
        Self {
            remote,
            days: MarkedDays::new(),
        }
    }

    /// Replaces the local mapping with the remote document. On failure the
    /// mapping is left empty and the error is handed back to the caller.
    pub async fn load(&mut self) -> Result<&MarkedDays, CalendarError> {
        match self.remote.fetch().await {
            Ok(days) => {
                info!(entries = days.len(), "calendar document loaded");
                self.days = days;
                Ok(&self.days)
            }
            Err(err) => {
                warn!("calendar document unavailable, starting empty: {err}");
                self.days = MarkedDays::new();
                Err(err)
            }
        }
    }

    pub fn set(&mut self, key: &DateKey, count: i64) {
        self.days.set(key, count);
    }

    pub fn delete(&mut self, key: &DateKey) {
        self.days.remove(key);
    }

    pub fn count(&self, key: &DateKey) -> u32 {
        self.days.count(key)
    }

    pub fn snapshot(&self) -> &MarkedDays {
        &self.days
    }

    /// Overwrites the remote document with the whole local mapping.
    pub async fn persist(&self) -> Result<(), CalendarError> {
        self.remote.replace(&self.days).await
    }
}

impl<S> CalendarStore<S>
where
    S: DocumentStore + Clone + Send + Sync + 'static,
{
    /// Persists the current mapping on a background task without waiting.
    /// Overlapping calls are not ordered: whichever write finishes last wins.
    pub fn spawn_persist(&self) -> JoinHandle<Result<(), CalendarError>> {
        let remote = self.remote.clone();
        let days = self.days.clone();
        tokio::spawn(async move {
            let result = remote.replace(&days).await;
            if let Err(err) = &result {
                warn!("background save failed: {err}");
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::MemoryDocumentStore;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn key(year: i32, month: u32, day: u32) -> DateKey {
        DateKey::new(year, month, day)
    }

    #[tokio::test]
    async fn set_and_delete_follow_presence_invariant() {
        let mut store = CalendarStore::new(MemoryDocumentStore::default());
        let day = key(2024, 4, 12);

        store.set(&day, 4);
        assert_eq!(store.snapshot().count(&day), 4);

        store.set(&day, 0);
        assert!(!store.snapshot().contains(&day));

        store.set(&day, 2);
        store.delete(&day);
        assert!(!store.snapshot().contains(&day));

        store.delete(&day);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn load_failure_falls_back_to_empty() {
        let remote = MemoryDocumentStore::default();
        let mut store = CalendarStore::new(remote.clone());
        store.set(&key(2024, 0, 1), 3);

        remote.set_offline(true);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CalendarError::Connectivity(_)));
        assert!(store.snapshot().is_empty());

        remote.set_offline(false);
        remote.set_malformed(true);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CalendarError::MalformedDocument(_)));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn persist_failure_keeps_local_state() {
        let remote = MemoryDocumentStore::default();
        let mut store = CalendarStore::new(remote.clone());
        remote.set_offline(true);

        store.set(&key(2024, 0, 1), 3);
        assert!(store.persist().await.is_err());
        assert_eq!(store.count(&key(2024, 0, 1)), 3);
        assert!(remote.document().is_empty());
    }

    #[tokio::test]
    async fn persist_twice_is_idempotent() {
        let remote = MemoryDocumentStore::default();
        let mut store = CalendarStore::new(remote.clone());
        store.set(&key(2024, 1, 29), 2);

        store.persist().await.unwrap();
        let once = remote.document();
        store.persist().await.unwrap();

        assert_eq!(remote.document(), once);
        assert_eq!(remote.writes(), 2);
    }

    #[tokio::test]
    async fn persisting_a_fresh_load_leaves_document_unchanged() {
        let mut document = MarkedDays::new();
        document.set(&key(2023, 11, 31), 1);
        document.set(&key(2024, 1, 30), 5);
        let remote = MemoryDocumentStore::with_document(document.clone());

        let mut store = CalendarStore::new(remote.clone());
        store.load().await.unwrap();
        store.persist().await.unwrap();

        assert_eq!(remote.document(), document);
    }

    /// Writes of a single-entry document are slow, everything else is instant.
    #[derive(Clone)]
    struct SlowStore {
        document: Arc<Mutex<MarkedDays>>,
    }

    impl DocumentStore for SlowStore {
        async fn fetch(&self) -> Result<MarkedDays, CalendarError> {
            Ok(self.document.lock().unwrap().clone())
        }

        async fn replace(&self, days: &MarkedDays) -> Result<(), CalendarError> {
            let delay = if days.len() == 1 { 80 } else { 0 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            *self.document.lock().unwrap() = days.clone();
            Ok(())
        }
    }

    #[tokio::test]
    async fn overlapping_persists_let_the_last_completion_win() {
        let remote = SlowStore {
            document: Arc::new(Mutex::new(MarkedDays::new())),
        };
        let mut store = CalendarStore::new(remote.clone());

        store.set(&key(2024, 6, 1), 1);
        let first = store.spawn_persist();
        store.set(&key(2024, 6, 2), 1);
        let second = store.spawn_persist();

        second.await.unwrap().unwrap();
        first.await.unwrap().unwrap();

        // The first write was issued earlier but completed later, so the
        // remote holds the older mapping while local state has both days.
        let remote_doc = remote.document.lock().unwrap().clone();
        assert_eq!(remote_doc.len(), 1);
        assert!(remote_doc.contains(&key(2024, 6, 1)));
        assert_eq!(store.snapshot().len(), 2);
    }
}
