use crate::errors::AppError;
use crate::grid::days_in_month;
use crate::models::{DateKey, EditForm, MarkedDays, SaveResponse};
use crate::remote::DocumentStore;
use crate::state::AppState;
use crate::ui::render_page;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Local;
use tracing::{info, warn};

pub async fn get_document(State(state): State<AppState>) -> Json<MarkedDays> {
    let data = state.document.data.lock().await;
    Json(data.clone())
}

pub async fn replace_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, AppError> {
    let days: MarkedDays = serde_json::from_slice(&body).map_err(|err| {
        warn!("rejected calendar document: {err}");
        AppError::bad_request("Invalid data", "the submitted JSON is not valid")
    })?;

    state.document.replace(&days).await?;
    info!(entries = days.len(), "calendar document replaced");

    Ok(Json(SaveResponse {
        success: true,
        message: "Data saved".to_string(),
    }))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut session = state.page.lock().await;
    session.reload().await;
    Html(render_page(&session.view(Local::now().date_naive())))
}

pub async fn year_prev(State(state): State<AppState>) -> Redirect {
    state.page.lock().await.change_year(-1);
    Redirect::to("/")
}

pub async fn year_next(State(state): State<AppState>) -> Redirect {
    state.page.lock().await.change_year(1);
    Redirect::to("/")
}

pub async fn open_editor(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Html<String>, AppError> {
    let key: DateKey = key.parse()?;
    if days_in_month(key.year, key.month).is_none_or(|last| key.day > last) {
        return Err(AppError::bad_request(
            "Invalid date",
            format!("{key} is not a day of the calendar"),
        ));
    }

    let mut session = state.page.lock().await;
    session.reload().await;
    session.open_editor(key);
    Ok(Html(render_page(&session.view(Local::now().date_naive()))))
}

// Saves re-read the document first so days written through the API since the
// page was rendered survive the whole-document overwrite.
pub async fn save_edit(State(state): State<AppState>, Form(form): Form<EditForm>) -> Redirect {
    let mut session = state.page.lock().await;
    if session.reload().await {
        session.confirm_edit(&form.count).await;
    } else {
        session.close_editor();
    }
    Redirect::to("/")
}

pub async fn delete_edit(State(state): State<AppState>) -> Redirect {
    let mut session = state.page.lock().await;
    if session.reload().await {
        session.delete_entry().await;
    } else {
        session.close_editor();
    }
    Redirect::to("/")
}

pub async fn cancel_edit(State(state): State<AppState>) -> Redirect {
    state.page.lock().await.close_editor();
    Redirect::to("/")
}
