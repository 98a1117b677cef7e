use super::*;
use axum::extract::FromRequestParts;
use crate::state::test_helpers;

fn parts_with_auth(value: Option<&str>) -> Parts {
    let mut builder = axum::http::Request::builder().uri("/api/polls");
    if let Some(value) = value {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(()).unwrap().into_parts().0
}

// =============================================================================
// bearer_token
// =============================================================================

#[test]
fn bearer_token_reads_header() {
    let parts = parts_with_auth(Some("Bearer abc123"));
    assert_eq!(bearer_token(&parts), Some("abc123"));
}

#[test]
fn bearer_token_rejects_other_schemes_and_blanks() {
    assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc"))), None);
    assert_eq!(bearer_token(&parts_with_auth(Some("Bearer   "))), None);
    assert_eq!(bearer_token(&parts_with_auth(None)), None);
}

// =============================================================================
// extractor
// =============================================================================

#[tokio::test]
async fn extractor_requires_known_token() {
    let state = test_helpers::test_app_state();
    let mut parts = parts_with_auth(None);
    let res = <ParticipantAuth as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;
    assert!(matches!(res, Err(StatusCode::UNAUTHORIZED)));

    let mut parts = parts_with_auth(Some("Bearer not-a-session"));
    let res = <ParticipantAuth as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;
    assert!(matches!(res, Err(StatusCode::UNAUTHORIZED)));
}

#[tokio::test]
async fn extractor_resolves_session() {
    let state = test_helpers::test_app_state();
    let poll_id = Uuid::new_v4();
    let token = session::create_session(&state, poll_id, "alice").await;

    let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
    let Ok(auth) = <ParticipantAuth as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await else {
        panic!("token should resolve");
    };
    assert_eq!(auth.session.name, "alice");
    assert_eq!(auth.name_in(poll_id), Some("alice"));
    assert_eq!(auth.name_in(Uuid::new_v4()), None);
}

#[tokio::test]
async fn optional_extractor_tolerates_bad_token() {
    let state = test_helpers::test_app_state();
    let mut parts = parts_with_auth(Some("Bearer stale"));
    let res = <ParticipantAuth as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state).await;
    assert!(matches!(res, Ok(None)));
}

// =============================================================================
// handlers
// =============================================================================

#[tokio::test]
async fn join_then_rejoin_status_codes() {
    let state = test_helpers::test_app_state();
    let poll_id = test_helpers::seed_poll(&state, &[]).await;
    let body = || JoinBody { name: "alice".into(), password: Some("pw".into()) };

    let (status, Json(first)) = join(State(state.clone()), Path(poll_id), Json(body())).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(first.created);

    let (status, _) = join(State(state.clone()), Path(poll_id), Json(body())).await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let wrong = JoinBody { name: "alice".into(), password: Some("nope".into()) };
    let err = join(State(state.clone()), Path(poll_id), Json(wrong)).await.unwrap_err();
    assert_eq!(err, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn join_unknown_poll_is_404() {
    let state = test_helpers::test_app_state();
    let body = JoinBody { name: "alice".into(), password: None };
    let err = join(State(state), Path(Uuid::new_v4()), Json(body)).await.unwrap_err();
    assert_eq!(err, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_forgets_token() {
    let state = test_helpers::test_app_state();
    let poll_id = Uuid::new_v4();
    let token = session::create_session(&state, poll_id, "alice").await;
    let auth = ParticipantAuth { session: Session { poll_id, name: "alice".into() }, token: token.clone() };

    assert_eq!(logout(State(state.clone()), auth).await, StatusCode::NO_CONTENT);
    assert!(session::validate_session(&state, &token).await.is_none());
}
