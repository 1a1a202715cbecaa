use axum::response::Response;
use axum::Json;

use crate::models::contact::ContactMessage;
use crate::services::contact;
use crate::utils::error::AppError;
use crate::utils::response::accepted;

pub async fn send_message(Json(message): Json<ContactMessage>) -> Result<Response, AppError> {
    let receipt = contact::submit(&message)?;
    Ok(accepted(receipt, "Message received"))
}
