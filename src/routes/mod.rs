use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{accounts, events, health_check};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(events::list_events))
        .route("/events", post(events::create_event))
        .route("/events/:id", get(events::event_detail))
        .route(
            "/events/:id/edit",
            get(events::edit_event_form).post(events::update_event),
        )
        .route(
            "/events/:id/delete",
            get(events::confirm_delete_event).post(events::delete_event),
        )
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
