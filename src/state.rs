use crate::calendar::CalendarStore;
use crate::errors::CalendarError;
use crate::models::MarkedDays;
use crate::remote::DocumentStore;
use crate::session::CalendarSession;
use crate::storage::persist_document;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// The server's copy of the calendar document, mirrored to one JSON file.
#[derive(Clone)]
pub struct SharedDocument {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<MarkedDays>>,
}

impl SharedDocument {
    pub fn new(data_path: PathBuf, data: MarkedDays) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }
}

impl DocumentStore for SharedDocument {
    async fn fetch(&self) -> Result<MarkedDays, CalendarError> {
        Ok(self.data.lock().await.clone())
    }

    async fn replace(&self, days: &MarkedDays) -> Result<(), CalendarError> {
        let mut data = self.data.lock().await;
        persist_document(&self.data_path, days)
            .await
            .map_err(|err| CalendarError::Connectivity(err.message))?;
        *data = days.clone();
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub document: SharedDocument,
    pub page: Arc<Mutex<CalendarSession<SharedDocument>>>,
}

impl AppState {
    /// Builds the state and performs the page session's one-time load.
    pub async fn new(data_path: PathBuf, data: MarkedDays, year: i32) -> Self {
        let document = SharedDocument::new(data_path, data);
        let mut session = CalendarSession::new(CalendarStore::new(document.clone()), year);
        session.start().await;

        Self {
            document,
            page: Arc::new(Mutex::new(session)),
        }
    }
}
