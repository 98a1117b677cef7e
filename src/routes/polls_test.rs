use super::*;
use crate::poll::grid::TimeStatus;
use crate::services::session;
use crate::state::{Session, test_helpers};

async fn auth_for(state: &AppState, poll_id: Uuid, name: &str) -> ParticipantAuth {
    let outcome = poll::join(state, poll_id, name, None).await.unwrap();
    ParticipantAuth { session: Session { poll_id, name: outcome.name }, token: outcome.token }
}

// =============================================================================
// poll_error_to_status
// =============================================================================

#[test]
fn poll_error_to_status_maps_not_found() {
    assert_eq!(poll_error_to_status(PollError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
    assert_eq!(poll_error_to_status(PollError::LocationNotFound(Uuid::nil())), StatusCode::NOT_FOUND);
}

#[test]
fn poll_error_to_status_maps_conflicts() {
    assert_eq!(poll_error_to_status(PollError::Closed(Uuid::nil())), StatusCode::CONFLICT);
    assert_eq!(poll_error_to_status(PollError::DuplicateLocation("A".into())), StatusCode::CONFLICT);
    assert_eq!(poll_error_to_status(PollError::Full { max: 1 }), StatusCode::CONFLICT);
}

#[test]
fn poll_error_to_status_maps_auth() {
    assert_eq!(poll_error_to_status(PollError::WrongPassword), StatusCode::UNAUTHORIZED);
    assert_eq!(poll_error_to_status(PollError::Forbidden), StatusCode::FORBIDDEN);
}

#[test]
fn poll_error_to_status_maps_validation() {
    assert_eq!(poll_error_to_status(PollError::InvalidSlot { day: 0, hour: 0 }), StatusCode::BAD_REQUEST);
    assert_eq!(poll_error_to_status(PollError::EmptyName), StatusCode::BAD_REQUEST);
    assert_eq!(poll_error_to_status(PollError::DeadlinePassed), StatusCode::BAD_REQUEST);
    assert_eq!(poll_error_to_status(PollError::TooManyDates { max: 14 }), StatusCode::BAD_REQUEST);
}

// =============================================================================
// handlers
// =============================================================================

#[tokio::test]
async fn create_then_list_and_get() {
    let state = test_helpers::test_app_state();
    let body: NewPoll = serde_json::from_value(serde_json::json!({
        "title": "Study group",
        "window": {"kind": "evening"},
        "locations": ["Library", ""]
    }))
    .unwrap();

    let (status, Json(created)) = create_poll(State(state.clone()), Json(body)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.shape.start_hour, 18);

    let Json(listed) = list_polls(State(state.clone())).await;
    assert_eq!(listed.len(), 1);

    let Json(view) = get_poll(State(state.clone()), None, Path(created.id)).await.unwrap();
    assert_eq!(view.locations.len(), 1);
    assert!(!view.closed);
}

#[tokio::test]
async fn create_with_bad_window_is_400() {
    let state = test_helpers::test_app_state();
    let body: NewPoll = serde_json::from_value(serde_json::json!({
        "window": {"kind": "custom", "start": "25:00", "end": "26:00"}
    }))
    .unwrap();
    let err = create_poll(State(state), Json(body)).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn grid_endpoints_round_trip() {
    let state = test_helpers::test_app_state();
    let poll_id = test_helpers::seed_poll(&state, &[]).await;

    let auth = auth_for(&state, poll_id, "alice").await;
    let body = CellBody { day: 0, hour: 9, mode: None };
    let Json(grid) = press(State(state.clone()), auth, Path(poll_id), Json(body)).await.unwrap();
    assert_eq!(grid.cells[0], TimeStatus::Available);

    let auth = auth_for(&state, poll_id, "alice").await;
    let Json(grid) = drag(State(state.clone()), auth, Path(poll_id), Json(CellRef { day: 1, hour: 10 })).await.unwrap();
    assert_eq!(grid.counts.available, 4);

    let auth = auth_for(&state, poll_id, "alice").await;
    let Json(grid) = release(State(state.clone()), auth, Path(poll_id)).await.unwrap();
    assert!(!grid.dragging);

    let auth = auth_for(&state, poll_id, "alice").await;
    let Json(grid) = set_mode(State(state.clone()), auth, Path(poll_id), Json(ModeBody { mode: SelectionMode::Maybe }))
        .await
        .unwrap();
    assert_eq!(grid.mode, SelectionMode::Maybe);

    let auth = auth_for(&state, poll_id, "alice").await;
    let range = RangeBody { start: CellRef { day: 5, hour: 12 }, end: CellRef { day: 5, hour: 13 }, mode: None };
    let Json(grid) = select_range(State(state.clone()), auth, Path(poll_id), Json(range)).await.unwrap();
    assert_eq!(grid.counts.maybe, 2);

    let auth = auth_for(&state, poll_id, "alice").await;
    let Json(mine) = my_grid(State(state.clone()), auth, Path(poll_id)).await.unwrap();
    assert_eq!(mine.counts.available, 4);
}

#[tokio::test]
async fn press_outside_grid_is_400() {
    let state = test_helpers::test_app_state();
    let poll_id = test_helpers::seed_poll(&state, &[]).await;
    let auth = auth_for(&state, poll_id, "alice").await;
    let body = CellBody { day: 0, hour: 8, mode: None };
    let err = press(State(state), auth, Path(poll_id), Json(body)).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_for_other_poll_is_403() {
    let state = test_helpers::test_app_state();
    let poll_a = test_helpers::seed_poll(&state, &[]).await;
    let poll_b = test_helpers::seed_poll(&state, &[]).await;
    let auth = auth_for(&state, poll_a, "alice").await;
    let err = release(State(state), auth, Path(poll_b)).await.unwrap_err();
    assert_eq!(err, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn locations_add_vote_and_results() {
    let state = test_helpers::test_app_state();
    let poll_id = test_helpers::seed_poll(&state, &["Gangnam"]).await;

    let auth = auth_for(&state, poll_id, "alice").await;
    let body = AddLocationBody { name: "Hongdae".into() };
    let (status, Json(added)) = add_location(State(state.clone()), auth, Path(poll_id), Json(body)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added.vote_count, 1);

    let auth = auth_for(&state, poll_id, "bob").await;
    let dup = AddLocationBody { name: "Hongdae".into() };
    let err = add_location(State(state.clone()), auth, Path(poll_id), Json(dup)).await.unwrap_err();
    assert_eq!(err, StatusCode::CONFLICT);

    let auth = auth_for(&state, poll_id, "bob").await;
    let Json(voted) = toggle_vote(State(state.clone()), auth, Path((poll_id, added.id))).await.unwrap();
    assert_eq!(voted.vote_count, 2);

    let auth = auth_for(&state, poll_id, "bob").await;
    let Json(res) = results(State(state.clone()), Some(auth), Path(poll_id)).await.unwrap();
    assert_eq!(res.top_locations.len(), 1);
    assert_eq!(res.top_locations[0].count, 2);
    assert!(res.locations.iter().any(|l| l.name == "Hongdae" && l.voted_by_me));
}

#[tokio::test]
async fn share_returns_link() {
    let state = test_helpers::test_app_state();
    let poll_id = test_helpers::seed_poll(&state, &[]).await;
    let Json(link) = share(State(state), Path(poll_id)).await.unwrap();
    assert!(link.url.ends_with(&format!("/poll/{poll_id}")));
}

#[tokio::test]
async fn session_table_is_shared_with_handlers() {
    let state = test_helpers::test_app_state();
    let poll_id = test_helpers::seed_poll(&state, &[]).await;
    let auth = auth_for(&state, poll_id, "alice").await;
    assert!(session::validate_session(&state, &auth.token).await.is_some());
}
