//! Poll routes — creation, listing, personal grid, ballot, and results.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::poll::Poll;
use crate::poll::ballot::LocationView;
use crate::poll::grid::SelectionMode;
use crate::routes::auth::ParticipantAuth;
use crate::services::poll::{self, MyGrid, NewPoll, PollError, PollResults, PollSummary, PollView, ShareLink};
use crate::state::AppState;

pub(crate) fn poll_error_to_status(err: PollError) -> StatusCode {
    let status = match &err {
        PollError::NotFound(_) | PollError::LocationNotFound(_) => StatusCode::NOT_FOUND,
        PollError::Closed(_) | PollError::DuplicateLocation(_) | PollError::Full { .. } => StatusCode::CONFLICT,
        PollError::WrongPassword => StatusCode::UNAUTHORIZED,
        PollError::Forbidden => StatusCode::FORBIDDEN,
        PollError::InvalidSlot { .. }
        | PollError::InvalidWindow(_)
        | PollError::InvalidDate(_)
        | PollError::TooManyDates { .. }
        | PollError::DeadlinePassed
        | PollError::EmptyName
        | PollError::EmptyLocation => StatusCode::BAD_REQUEST,
    };
    debug!(code = err.error_code(), error = %err, %status, "poll request rejected");
    status
}

// =============================================================================
// POLLS
// =============================================================================

/// `POST /api/polls` — create a poll from the creation form.
pub async fn create_poll(
    State(state): State<AppState>,
    Json(body): Json<NewPoll>,
) -> Result<(StatusCode, Json<Poll>), StatusCode> {
    let created = poll::create_poll(&state, body).await.map_err(poll_error_to_status)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/polls` — list public polls.
pub async fn list_polls(State(state): State<AppState>) -> Json<Vec<PollSummary>> {
    Json(poll::list_public(&state).await)
}

/// `GET /api/polls/:id` — poll configuration, roster, and ballot.
pub async fn get_poll(
    State(state): State<AppState>,
    auth: Option<ParticipantAuth>,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<PollView>, StatusCode> {
    let me = auth.as_ref().and_then(|a| a.name_in(poll_id));
    let view = poll::get_poll(&state, poll_id, me).await.map_err(poll_error_to_status)?;
    Ok(Json(view))
}

/// `GET /api/polls/:id/share` — title and absolute link.
pub async fn share(State(state): State<AppState>, Path(poll_id): Path<Uuid>) -> Result<Json<ShareLink>, StatusCode> {
    let link = poll::share_link(&state, poll_id).await.map_err(poll_error_to_status)?;
    Ok(Json(link))
}

/// `GET /api/polls/:id/results` — aggregated grid and Top-3 rankings.
pub async fn results(
    State(state): State<AppState>,
    auth: Option<ParticipantAuth>,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<PollResults>, StatusCode> {
    let me = auth.as_ref().and_then(|a| a.name_in(poll_id));
    let res = poll::results(&state, poll_id, me).await.map_err(poll_error_to_status)?;
    Ok(Json(res))
}

// =============================================================================
// PERSONAL GRID
// =============================================================================

#[derive(Deserialize)]
pub struct ModeBody {
    pub mode: SelectionMode,
}

#[derive(Deserialize)]
pub struct CellBody {
    pub day: u8,
    pub hour: u8,
    pub mode: Option<SelectionMode>,
}

#[derive(Deserialize)]
pub struct CellRef {
    pub day: u8,
    pub hour: u8,
}

#[derive(Deserialize)]
pub struct RangeBody {
    pub start: CellRef,
    pub end: CellRef,
    pub mode: Option<SelectionMode>,
}

/// `GET /api/polls/:id/me` — the caller's grid.
pub async fn my_grid(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<MyGrid>, StatusCode> {
    let grid = poll::my_grid(&state, &auth.session, poll_id)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(grid))
}

/// `PUT /api/polls/:id/me/mode` — switch between available and maybe.
pub async fn set_mode(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
    Json(body): Json<ModeBody>,
) -> Result<Json<MyGrid>, StatusCode> {
    let grid = poll::set_mode(&state, &auth.session, poll_id, body.mode)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(grid))
}

/// `POST /api/polls/:id/me/press` — toggle a cell and start a drag.
pub async fn press(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
    Json(body): Json<CellBody>,
) -> Result<Json<MyGrid>, StatusCode> {
    let grid = poll::press(&state, &auth.session, poll_id, body.day, body.hour, body.mode)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(grid))
}

/// `POST /api/polls/:id/me/drag` — extend the drag rectangle.
pub async fn drag(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
    Json(body): Json<CellRef>,
) -> Result<Json<MyGrid>, StatusCode> {
    let grid = poll::drag(&state, &auth.session, poll_id, body.day, body.hour)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(grid))
}

/// `POST /api/polls/:id/me/release` — end the drag.
pub async fn release(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<MyGrid>, StatusCode> {
    let grid = poll::release(&state, &auth.session, poll_id)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(grid))
}

/// `POST /api/polls/:id/me/range` — press, drag, and release in one call.
pub async fn select_range(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
    Json(body): Json<RangeBody>,
) -> Result<Json<MyGrid>, StatusCode> {
    let start = (body.start.day, body.start.hour);
    let end = (body.end.day, body.end.hour);
    let grid = poll::select_range(&state, &auth.session, poll_id, start, end, body.mode)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(grid))
}

// =============================================================================
// LOCATIONS
// =============================================================================

#[derive(Deserialize)]
pub struct AddLocationBody {
    pub name: String,
}

/// `POST /api/polls/:id/locations` — add a candidate and vote for it.
pub async fn add_location(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path(poll_id): Path<Uuid>,
    Json(body): Json<AddLocationBody>,
) -> Result<(StatusCode, Json<LocationView>), StatusCode> {
    let view = poll::add_location(&state, &auth.session, poll_id, &body.name)
        .await
        .map_err(poll_error_to_status)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `POST /api/polls/:id/locations/:location_id/vote` — toggle the caller's vote.
pub async fn toggle_vote(
    State(state): State<AppState>,
    auth: ParticipantAuth,
    Path((poll_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LocationView>, StatusCode> {
    let view = poll::toggle_location_vote(&state, &auth.session, poll_id, location_id)
        .await
        .map_err(poll_error_to_status)?;
    Ok(Json(view))
}

#[cfg(test)]
#[path = "polls_test.rs"]
mod tests;
