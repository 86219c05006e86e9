//! Access to the single JSON document that holds every marked day.

use crate::errors::CalendarError;
use crate::models::{ErrorBody, MarkedDays};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/api/datos";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-document read and overwrite. There is no partial update.
pub trait DocumentStore {
    fn fetch(&self) -> impl Future<Output = Result<MarkedDays, CalendarError>> + Send;

    fn replace(&self, days: &MarkedDays)
    -> impl Future<Output = Result<(), CalendarError>> + Send;
}

/// Talks to the document server over HTTP: `GET` reads, `POST` overwrites.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpDocumentStore {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CalendarError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("habit_calendar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                CalendarError::Connectivity(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self) -> Result<MarkedDays, CalendarError> {
        debug!(endpoint = %self.endpoint, "fetching calendar document");
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| CalendarError::Connectivity(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalendarError::Connectivity(format!(
                "HTTP {} from {}",
                response.status(),
                self.endpoint
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CalendarError::Connectivity(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CalendarError::MalformedDocument(e.to_string()))
    }

    async fn replace(&self, days: &MarkedDays) -> Result<(), CalendarError> {
        debug!(endpoint = %self.endpoint, entries = days.len(), "replacing calendar document");
        let response = self
            .client
            .post(&self.endpoint)
            .json(days)
            .send()
            .await
            .map_err(|e| CalendarError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => format!("{}: {}", body.error, body.message),
            Err(_) => format!("HTTP {status} from {}", self.endpoint),
        };
        if status == StatusCode::BAD_REQUEST {
            Err(CalendarError::InvalidInput(detail))
        } else {
            Err(CalendarError::Connectivity(detail))
        }
    }
}
