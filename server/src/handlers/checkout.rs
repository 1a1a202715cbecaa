use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::checkout::{ContactForm, OpenCheckoutRequest, PaymentForm};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{accepted, created, empty_success, success};

pub async fn open_checkout(
    State(state): State<AppState>,
    Json(request): Json<OpenCheckoutRequest>,
) -> Result<Response, AppError> {
    let session = state.checkout.open(request).await?;
    Ok(created(session, "Checkout opened"))
}

pub async fn get_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.checkout.get(id).await?;
    Ok(success(session, "Checkout retrieved"))
}

pub async fn submit_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ContactForm>,
) -> Result<Response, AppError> {
    let session = state.checkout.submit_contact(id, form).await?;
    Ok(success(session, "Contact details saved"))
}

pub async fn step_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.checkout.back(id).await?;
    Ok(success(session, "Returned to contact details"))
}

/// Starts the charge; poll the session for the outcome.
pub async fn submit_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<PaymentForm>,
) -> Result<Response, AppError> {
    let session = state.checkout.submit_payment(id, form).await?;
    Ok(accepted(session, "Payment processing"))
}

pub async fn cancel_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.checkout.cancel(id).await?;
    Ok(empty_success("Checkout cancelled"))
}
