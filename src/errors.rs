use crate::models::ErrorBody;
use axum::{http::StatusCode, Json};

/// Failures of the calendar engine when talking to the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("could not reach the calendar store: {0}")]
    Connectivity(String),

    #[error("calendar store returned a malformed document: {0}")]
    MalformedDocument(String),

    #[error("calendar store rejected the document: {0}")]
    InvalidInput(String),

    #[error("invalid date key: {0}")]
    InvalidDateKey(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            error: "Method not allowed".to_string(),
            message: "only GET and POST are supported".to_string(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Storage failure".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidInput(message) => Self::bad_request("Invalid data", message),
            CalendarError::InvalidDateKey(key) => {
                Self::bad_request("Invalid date", format!("invalid date key: {key}"))
            }
            other => Self::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            error: self.error,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
