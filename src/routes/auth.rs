//! Participant auth routes — join by name, bearer sessions, logout.

use axum::extract::{FromRef, OptionalFromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::polls::poll_error_to_status;
use crate::services::poll::{self, JoinOutcome};
use crate::services::session;
use crate::state::{AppState, Session};

/// Token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Participant resolved from the bearer token.
/// Use as a handler parameter to require a joined participant.
pub struct ParticipantAuth {
    pub session: Session,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for ParticipantAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(StatusCode::UNAUTHORIZED)?.to_owned();
        let app_state = AppState::from_ref(state);
        let session = session::validate_session(&app_state, &token)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(Self { session, token })
    }
}

/// Anonymous readers are allowed on read endpoints; a bad token is treated
/// the same as none.
impl<S> OptionalFromRequestParts<S> for ParticipantAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(<Self as axum::extract::FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

impl ParticipantAuth {
    /// Participant name when the session belongs to `poll_id`.
    #[must_use]
    pub fn name_in(&self, poll_id: Uuid) -> Option<&str> {
        (self.session.poll_id == poll_id).then_some(self.session.name.as_str())
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct JoinBody {
    pub name: String,
    pub password: Option<String>,
}

/// `POST /api/polls/:id/join` — sign in by name, creating the participant.
pub async fn join(
    State(state): State<AppState>,
    Path(poll_id): Path<Uuid>,
    Json(body): Json<JoinBody>,
) -> Result<(StatusCode, Json<JoinOutcome>), StatusCode> {
    let outcome = poll::join(&state, poll_id, &body.name, body.password.as_deref())
        .await
        .map_err(poll_error_to_status)?;
    let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(outcome)))
}

/// `POST /api/session/logout` — drop the bearer token.
pub async fn logout(State(state): State<AppState>, auth: ParticipantAuth) -> StatusCode {
    session::delete_session(&state, &auth.token).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
