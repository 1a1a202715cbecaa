use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{bookings, checkout, contact, events, health_check, navigation, organizer};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let security = create_security_headers_layer(state.config.production);
    let cors = create_cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/events", get(events::list_events))
        .route("/api/events/featured", get(events::featured_events))
        .route("/api/events/:id", get(events::get_event))
        .route("/api/catalog/facets", get(events::facets))
        .route("/api/checkout", post(checkout::open_checkout))
        .route(
            "/api/checkout/:id",
            get(checkout::get_checkout).delete(checkout::cancel_checkout),
        )
        .route("/api/checkout/:id/contact", post(checkout::submit_contact))
        .route("/api/checkout/:id/back", post(checkout::step_back))
        .route("/api/checkout/:id/payment", post(checkout::submit_payment))
        .route("/api/bookings", get(bookings::list_bookings))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/organizer/dashboard", get(organizer::dashboard))
        .route("/api/organizer/events", post(organizer::create_event))
        .route("/api/organizer/events/:id", put(organizer::update_event))
        .route("/api/contact", post(contact::send_message))
        .route("/api/navigation/resolve", get(navigation::resolve))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(security)
        .layer(cors)
}
