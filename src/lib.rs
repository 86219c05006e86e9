pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod errors;
pub mod grid;
pub mod handlers;
pub mod models;
pub mod remote;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use calendar::CalendarStore;
pub use errors::CalendarError;
pub use models::{DateKey, MarkedDays};
pub use remote::{DocumentStore, HttpDocumentStore};
pub use state::AppState;
pub use storage::{bootstrap_document, load_document, resolve_data_path};
