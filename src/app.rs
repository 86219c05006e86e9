use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub const DOCUMENT_PATH: &str = "/api/datos";

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let document = get(handlers::get_document)
        .post(handlers::replace_document)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed);

    Router::new()
        .route("/", get(handlers::index))
        .route("/year/prev", post(handlers::year_prev))
        .route("/year/next", post(handlers::year_next))
        .route("/edit", post(handlers::save_edit))
        .route("/edit/delete", post(handlers::delete_edit))
        .route("/edit/cancel", post(handlers::cancel_edit))
        .route("/edit/:key", get(handlers::open_editor))
        .route(DOCUMENT_PATH, document.layer(cors))
        .with_state(state)
}
