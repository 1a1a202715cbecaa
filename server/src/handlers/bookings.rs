use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;

use crate::services::bookings::BookingQuery;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Response {
    let bookings = state.bookings.list(&query, Utc::now()).await;
    success(bookings, "Bookings retrieved")
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let booking = state
        .bookings
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", id)))?;
    Ok(success(booking, "Booking retrieved"))
}
