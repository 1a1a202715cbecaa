use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::models::organizer::EventDraft;
use crate::services::organizer;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{accepted, success};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub organizer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub organizer: OrganizerRef,
    pub event: EventDraft,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, AppError> {
    let today = Utc::now().date_naive();
    let summary = organizer::dashboard(&state.catalog, params.organizer_id.as_deref(), today)?;
    Ok(success(summary, "Dashboard retrieved"))
}

/// Validates a new event and returns its preview. The catalog is unchanged.
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let preview = organizer::preview_new(
        &state.catalog,
        (request.organizer.id.as_str(), request.organizer.name.as_str()),
        &request.event,
    )?;
    Ok(accepted(preview, "Event draft accepted"))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> Result<Response, AppError> {
    let preview = organizer::preview_edit(&state.catalog, &id, &draft)?;
    Ok(accepted(preview, "Event changes accepted"))
}
