use axum::extract::Query;
use axum::response::Response;
use serde::Deserialize;

use crate::services::navigation::{ResolvedView, View};
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    pub path: String,
}

pub async fn resolve(Query(params): Query<ResolveParams>) -> Result<Response, AppError> {
    let view = View::parse(&params.path)?;
    Ok(success(ResolvedView::from(&view), "View resolved"))
}
