use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Serialize;

use crate::data::{ALL_CATEGORIES, ALL_CITIES};
use crate::models::Event;
use crate::services::catalog::{CatalogParams, FilterCriteria, SortKey};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct EventListing<'a> {
    events: Vec<&'a Event>,
    total: usize,
    /// Canonical query string for the applied criteria.
    query: String,
    active_filters: usize,
    sort: SortKey,
}

#[derive(Serialize)]
struct Facets<'a> {
    cities: Vec<&'a str>,
    categories: Vec<&'a str>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Result<Response, AppError> {
    let criteria = FilterCriteria::try_from(params)?;
    let events = state.catalog.search(&criteria);

    let listing = EventListing {
        total: events.len(),
        events,
        query: criteria.to_query_string(),
        active_filters: criteria.active_filter_count(),
        sort: criteria.sort,
    };
    Ok(success(listing, "Events retrieved"))
}

pub async fn featured_events(State(state): State<AppState>) -> Response {
    success(state.catalog.featured(), "Featured events retrieved")
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.catalog.get(&id)?;
    Ok(success(event, "Event retrieved"))
}

/// Filter options, each list led by its "all" choice.
pub async fn facets(State(state): State<AppState>) -> Response {
    let facets = Facets {
        cities: std::iter::once(ALL_CITIES)
            .chain(state.catalog.cities().iter().map(String::as_str))
            .collect(),
        categories: std::iter::once(ALL_CATEGORIES)
            .chain(state.catalog.categories().iter().map(String::as_str))
            .collect(),
    };
    success(facets, "Catalog facets retrieved")
}
