//! Month layout for the candidate-date picker.
//!
//! The picker state travels in the query string: `selected` carries the
//! dates picked so far (comma-separated `YYYY-MM-DD`), and an optional
//! `press`/`drag` pair applies one drag gesture on top of them. The
//! response echoes the resulting selection so the client can send it back
//! with the next request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use time::macros::format_description;
use time::{Date, Month};

use crate::poll::calendar::{self, CalendarPage, DateSelection, MonthCursor};
use crate::state::AppState;

fn parse_date(raw: &str) -> Result<Date, StatusCode> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| StatusCode::BAD_REQUEST)
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub selected: Option<String>,
    pub press: Option<String>,
    pub drag: Option<String>,
}

impl CalendarQuery {
    /// Rebuild the picker state relative to `today`. Past dates are dropped.
    fn selection(&self, today: Date) -> Result<DateSelection, StatusCode> {
        let mut selection = DateSelection::new(today);
        for raw in self.selected.iter().flat_map(|s| s.split(',')).filter(|s| !s.trim().is_empty()) {
            let date = parse_date(raw)?;
            if !selection.select_range(date, date) {
                break;
            }
        }
        if let Some(press) = self.press.as_deref() {
            selection.press(parse_date(press)?);
            if let Some(drag) = self.drag.as_deref() {
                selection.drag(parse_date(drag)?);
            }
            selection.release();
        }
        Ok(selection)
    }
}

fn render(state: &AppState, cursor: MonthCursor, query: &CalendarQuery) -> Result<Json<CalendarPage>, StatusCode> {
    let selection = query.selection(state.config.today())?;
    calendar::calendar_page(cursor, &selection)
        .map(Json)
        .ok_or(StatusCode::BAD_REQUEST)
}

/// `GET /api/calendar` — the month containing today.
pub async fn current_month(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarPage>, StatusCode> {
    let cursor = MonthCursor::containing(state.config.today());
    render(&state, cursor, &query)
}

/// `GET /api/calendar/:year/:month` — blanks, days, selection, and prev/next.
pub async fn month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u8)>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarPage>, StatusCode> {
    let month = Month::try_from(month).map_err(|_| StatusCode::BAD_REQUEST)?;
    render(&state, MonthCursor { year, month }, &query)
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
