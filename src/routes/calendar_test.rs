use super::*;
use crate::state::test_helpers;

fn query(selected: Option<&str>, press: Option<&str>, drag: Option<&str>) -> Query<CalendarQuery> {
    Query(CalendarQuery {
        selected: selected.map(str::to_owned),
        press: press.map(str::to_owned),
        drag: drag.map(str::to_owned),
    })
}

#[tokio::test]
async fn month_lays_out_known_month() {
    let state = test_helpers::test_app_state();
    let Json(page) = month(State(state), Path((2024, 2)), query(None, None, None)).await.unwrap();
    // 2024-02-01 was a Thursday.
    assert_eq!(page.view.leading_blanks, 4);
    assert_eq!(page.view.days.len(), 29);
    assert!(page.view.days.iter().all(|d| d.is_past));
    assert_eq!((page.prev.year, page.prev.month), (2024, 1));
    assert_eq!((page.next.year, page.next.month), (2024, 3));
}

#[tokio::test]
async fn month_rejects_bad_month_number() {
    let state = test_helpers::test_app_state();
    let err = month(State(state.clone()), Path((2024, 0)), query(None, None, None)).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
    let err = month(State(state), Path((2024, 13)), query(None, None, None)).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn selected_dates_are_marked_and_past_ones_dropped() {
    let state = test_helpers::test_app_state();
    let q = query(Some("2099-03-03, 2099-03-05,2000-01-01"), None, None);
    let Json(page) = month(State(state), Path((2099, 3)), q).await.unwrap();
    let marked: Vec<u8> = page.view.days.iter().filter(|d| d.is_selected).map(|d| d.day).collect();
    assert_eq!(marked, vec![3, 5]);
    assert_eq!(page.selected.len(), 2);
    assert!(!page.full);
}

#[tokio::test]
async fn press_and_drag_apply_one_gesture() {
    let state = test_helpers::test_app_state();
    let q = query(Some("2099-03-01"), Some("2099-03-10"), Some("2099-03-12"));
    let Json(page) = month(State(state.clone()), Path((2099, 3)), q).await.unwrap();
    let marked: Vec<u8> = page.view.days.iter().filter(|d| d.is_selected).map(|d| d.day).collect();
    assert_eq!(marked, vec![1, 10, 11, 12]);

    // Pressing a selected day and dragging clears the span.
    let q = query(Some("2099-03-10,2099-03-11,2099-03-12"), Some("2099-03-12"), Some("2099-03-11"));
    let Json(page) = month(State(state), Path((2099, 3)), q).await.unwrap();
    assert_eq!(page.selected.len(), 1);
}

#[tokio::test]
async fn huge_drag_stops_at_cap() {
    let state = test_helpers::test_app_state();
    let q = query(None, Some("2099-03-01"), Some("9999-12-31"));
    let Json(page) = month(State(state), Path((2099, 3)), q).await.unwrap();
    assert_eq!(page.selected.len(), 14);
    assert!(page.full);
}

#[tokio::test]
async fn malformed_date_is_400() {
    let state = test_helpers::test_app_state();
    let err = month(State(state), Path((2099, 3)), query(Some("2099-3-1x"), None, None)).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn current_month_contains_today() {
    let state = test_helpers::test_app_state();
    let today = state.config.today();
    let Json(page) = current_month(State(state), query(None, None, None)).await.unwrap();
    assert_eq!(page.view.year, today.year());
    assert_eq!(page.view.month, u8::from(today.month()));
    assert_eq!(page.view.days.iter().filter(|d| d.is_today).count(), 1);
}
