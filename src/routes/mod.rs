//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API under `/api` plus a health check into one
//! Axum router. Participant endpoints authenticate with the bearer token
//! handed out by `POST /api/polls/:id/join`.

pub mod auth;
pub mod calendar;
pub mod polls;
pub mod themes;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/polls", get(polls::list_polls).post(polls::create_poll))
        .route("/api/polls/{id}", get(polls::get_poll))
        .route("/api/polls/{id}/share", get(polls::share))
        .route("/api/polls/{id}/results", get(polls::results))
        .route("/api/polls/{id}/join", post(auth::join))
        .route("/api/polls/{id}/me", get(polls::my_grid))
        .route("/api/polls/{id}/me/mode", put(polls::set_mode))
        .route("/api/polls/{id}/me/press", post(polls::press))
        .route("/api/polls/{id}/me/drag", post(polls::drag))
        .route("/api/polls/{id}/me/release", post(polls::release))
        .route("/api/polls/{id}/me/range", post(polls::select_range))
        .route("/api/polls/{id}/locations", post(polls::add_location))
        .route("/api/polls/{id}/locations/{location_id}/vote", post(polls::toggle_vote))
        .route("/api/session/logout", post(auth::logout))
        .route("/api/themes", get(themes::list_themes))
        .route("/api/themes/{name}/css", get(themes::theme_css))
        .route("/api/calendar", get(calendar::current_month))
        .route("/api/calendar/{year}/{month}", get(calendar::month))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
