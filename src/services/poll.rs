//! Poll service — creation, joining, grid editing, voting, and results.
//!
//! DESIGN
//! ======
//! Polls live in `AppState::polls`. Every operation takes the map lock once,
//! applies a pure domain function from `crate::poll`, bumps the poll
//! version, and returns a view built under the same lock. The persistence
//! task picks up the version change later; nothing here waits on I/O.
//!
//! ERROR HANDLING
//! ==============
//! Coordinates, dates, and names coming from clients are validated here so
//! the domain functions stay total. Once a poll's deadline has passed,
//! every participant mutation fails with `Closed` while reads keep working.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::poll::ballot::{Ballot, BallotError, LocationView};
use crate::poll::calendar::DateSelection;
use crate::poll::grid::{
    AvailabilityGrid, DragState, GridShape, MAX_GRID_DAYS, SelectionMode, Slot, StatusCounts, TimeStatus,
};
use crate::poll::stats::{self, RankedLocation, Respondent, Shade};
use crate::poll::window::{TimeWindow, WindowError};
use crate::poll::{DEFAULT_TITLE, Poll, SlotLabel, Visibility};
use crate::services::session;
use crate::state::{AppState, Participant, PollState, Session};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("poll not found: {0}")]
    NotFound(Uuid),
    #[error("poll is closed: {0}")]
    Closed(Uuid),
    #[error("slot out of range: day {day}, hour {hour}")]
    InvalidSlot { day: u8, hour: u8 },
    #[error("invalid time window: {0}")]
    InvalidWindow(#[from] WindowError),
    #[error("invalid candidate date: {0}")]
    InvalidDate(Date),
    #[error("too many candidate dates (max {max})")]
    TooManyDates { max: u8 },
    #[error("deadline is already past")]
    DeadlinePassed,
    #[error("participant name is empty")]
    EmptyName,
    #[error("location name is empty")]
    EmptyLocation,
    #[error("location already exists: {0}")]
    DuplicateLocation(String),
    #[error("location not found: {0}")]
    LocationNotFound(Uuid),
    #[error("wrong password")]
    WrongPassword,
    #[error("session does not belong to this poll")]
    Forbidden,
    #[error("poll is full (max {max} participants)")]
    Full { max: usize },
}

impl PollError {
    /// Grepable error code returned to clients.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_POLL_NOT_FOUND",
            Self::Closed(_) => "E_POLL_CLOSED",
            Self::InvalidSlot { .. } => "E_INVALID_SLOT",
            Self::InvalidWindow(_) => "E_INVALID_WINDOW",
            Self::InvalidDate(_) => "E_INVALID_DATE",
            Self::TooManyDates { .. } => "E_TOO_MANY_DATES",
            Self::DeadlinePassed => "E_DEADLINE_PASSED",
            Self::EmptyName => "E_EMPTY_NAME",
            Self::EmptyLocation => "E_EMPTY_LOCATION",
            Self::DuplicateLocation(_) => "E_DUPLICATE_LOCATION",
            Self::LocationNotFound(_) => "E_LOCATION_NOT_FOUND",
            Self::WrongPassword => "E_WRONG_PASSWORD",
            Self::Forbidden => "E_FORBIDDEN",
            Self::Full { .. } => "E_POLL_FULL",
        }
    }
}

impl From<BallotError> for PollError {
    fn from(err: BallotError) -> Self {
        match err {
            BallotError::EmptyName => Self::EmptyLocation,
            BallotError::Duplicate(name) => Self::DuplicateLocation(name),
            BallotError::NotFound(id) => Self::LocationNotFound(id),
        }
    }
}

// =============================================================================
// CREATION
// =============================================================================

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

/// Everything the creation form collects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPoll {
    pub title: Option<String>,
    #[serde(default)]
    pub dates: Vec<Date>,
    #[serde(default)]
    pub ranges: Vec<DateRange>,
    #[serde(default)]
    pub window: TimeWindow,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

/// Resolve the candidate dates. Without any input, the poll covers the
/// next two weeks starting today.
fn resolve_dates(new: &NewPoll, today: Date) -> Result<Vec<Date>, PollError> {
    let too_many = PollError::TooManyDates { max: MAX_GRID_DAYS };
    let mut selection = DateSelection::new(today);
    for &date in &new.dates {
        if selection.is_past(date) {
            return Err(PollError::InvalidDate(date));
        }
        if !selection.select_range(date, date) {
            return Err(too_many);
        }
    }
    for range in &new.ranges {
        if !selection.select_range(range.start, range.end) {
            return Err(too_many);
        }
    }

    let mut dates = selection.into_dates();
    if dates.is_empty() && new.dates.is_empty() && new.ranges.is_empty() {
        dates = (0..i64::from(MAX_GRID_DAYS))
            .map(|offset| today + time::Duration::days(offset))
            .collect();
    }
    if dates.is_empty() {
        // Every requested range lay in the past.
        return Err(PollError::InvalidDate(new.ranges.first().map_or(today, |r| r.end)));
    }
    Ok(dates)
}

/// Create a poll and register it in memory.
///
/// # Errors
///
/// Returns a validation error for past dates, too many dates, a bad time
/// window, or a deadline that has already passed.
pub async fn create_poll(state: &AppState, new: NewPoll) -> Result<Poll, PollError> {
    let now = state.config.now();
    let dates = resolve_dates(&new, now.date())?;
    let (start_hour, end_hour) = new.window.hours()?;
    let days = u8::try_from(dates.len()).unwrap_or(u8::MAX);
    let shape = GridShape::new(days, start_hour, end_hour)
        .ok_or(PollError::TooManyDates { max: MAX_GRID_DAYS })?;

    if new.deadline.is_some_and(|deadline| deadline <= now) {
        return Err(PollError::DeadlinePassed);
    }

    let title = new
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_owned();

    let poll = Poll {
        id: Uuid::new_v4(),
        title,
        dates,
        window: new.window,
        shape,
        visibility: new.visibility,
        deadline: new.deadline,
        created_at: now,
    };
    let ballot = Ballot::from_names(new.locations.iter().map(String::as_str));

    {
        let mut polls = state.polls.write().await;
        polls.insert(poll.id, PollState::new(poll.clone(), ballot));
    }

    info!(poll_id = %poll.id, days = shape.days, start_hour, end_hour, "poll created");
    Ok(poll)
}

// =============================================================================
// READ VIEWS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PollSummary {
    pub id: Uuid,
    pub title: String,
    pub first_date: Option<Date>,
    pub last_date: Option<Date>,
    pub participant_count: usize,
    pub closed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Public polls, newest first.
pub async fn list_public(state: &AppState) -> Vec<PollSummary> {
    let now = state.config.now();
    let polls = state.polls.read().await;
    let mut out: Vec<PollSummary> = polls
        .values()
        .filter(|ps| ps.poll.visibility == Visibility::Public)
        .map(|ps| PollSummary {
            id: ps.poll.id,
            title: ps.poll.title.clone(),
            first_date: ps.poll.dates.first().copied(),
            last_date: ps.poll.dates.last().copied(),
            participant_count: ps.participants.len(),
            closed: ps.poll.is_closed(now),
            created_at: ps.poll.created_at,
        })
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct PollView {
    #[serde(flatten)]
    pub poll: Poll,
    pub closed: bool,
    pub participants: Vec<String>,
    pub locations: Vec<LocationView>,
}

/// Poll configuration plus roster and ballot, from `me`'s point of view.
///
/// # Errors
///
/// Returns `NotFound` for an unknown poll.
pub async fn get_poll(state: &AppState, poll_id: Uuid, me: Option<&str>) -> Result<PollView, PollError> {
    let now = state.config.now();
    let polls = state.polls.read().await;
    let ps = polls.get(&poll_id).ok_or(PollError::NotFound(poll_id))?;
    Ok(PollView {
        poll: ps.poll.clone(),
        closed: ps.poll.is_closed(now),
        participants: ps.participants.iter().map(|p| p.name.clone()).collect(),
        locations: ps.ballot.options().iter().map(|o| LocationView::new(o, me)).collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLink {
    pub title: String,
    pub url: String,
}

/// Title and absolute link for sharing a poll.
///
/// # Errors
///
/// Returns `NotFound` for an unknown poll.
pub async fn share_link(state: &AppState, poll_id: Uuid) -> Result<ShareLink, PollError> {
    let polls = state.polls.read().await;
    let ps = polls.get(&poll_id).ok_or(PollError::NotFound(poll_id))?;
    Ok(ShareLink { title: ps.poll.title.clone(), url: state.config.share_url(poll_id) })
}

// =============================================================================
// JOIN
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub token: String,
    pub name: String,
    /// False when an existing participant signed back in.
    pub created: bool,
}

/// Join a poll by name, creating the participant on first use.
///
/// # Errors
///
/// Returns `EmptyName`, `WrongPassword` for a protected name, `Closed` when
/// a new participant tries to join after the deadline, or `Full`.
pub async fn join(
    state: &AppState,
    poll_id: Uuid,
    name: &str,
    password: Option<&str>,
) -> Result<JoinOutcome, PollError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PollError::EmptyName);
    }
    let password = password.filter(|p| !p.is_empty());
    let now = state.config.now();

    let created = {
        let mut polls = state.polls.write().await;
        let ps = polls.get_mut(&poll_id).ok_or(PollError::NotFound(poll_id))?;

        if let Some(existing) = ps.participant(name) {
            if let Some(stored) = &existing.password {
                let ok = password.is_some_and(|p| session::verify_password(stored, p));
                if !ok {
                    return Err(PollError::WrongPassword);
                }
            }
            false
        } else {
            if ps.poll.is_closed(now) {
                return Err(PollError::Closed(poll_id));
            }
            let max = state.config.max_participants;
            if ps.participants.len() >= max {
                return Err(PollError::Full { max });
            }
            ps.participants.push(Participant {
                name: name.to_owned(),
                password: password.map(session::hash_password),
                grid: AvailabilityGrid::new(ps.poll.shape),
                mode: SelectionMode::default(),
                drag: DragState::default(),
                joined_at: now,
            });
            ps.touch();
            true
        }
    };

    let token = session::create_session(state, poll_id, name).await;
    info!(%poll_id, name, created, "participant joined");
    Ok(JoinOutcome { token, name: name.to_owned(), created })
}

// =============================================================================
// PERSONAL GRID
// =============================================================================

/// The caller's own grid and ballot choices.
#[derive(Debug, Clone, Serialize)]
pub struct MyGrid {
    pub name: String,
    pub mode: SelectionMode,
    pub shape: GridShape,
    pub cells: Vec<TimeStatus>,
    pub counts: StatusCounts,
    pub dragging: bool,
    pub location_votes: Vec<String>,
}

impl MyGrid {
    fn new(participant: &Participant, ballot: &Ballot) -> Self {
        Self {
            name: participant.name.clone(),
            mode: participant.mode,
            shape: participant.grid.shape(),
            cells: participant.grid.cells().to_vec(),
            counts: participant.grid.counts(),
            dragging: participant.drag.is_dragging(),
            location_votes: ballot.votes_of(&participant.name),
        }
    }
}

fn authorize(session: &Session, poll_id: Uuid) -> Result<(), PollError> {
    if session.poll_id == poll_id { Ok(()) } else { Err(PollError::Forbidden) }
}

fn slot(shape: GridShape, day: u8, hour: u8) -> Result<Slot, PollError> {
    shape.slot(day, hour).ok_or(PollError::InvalidSlot { day, hour })
}

/// Apply `edit` to an open poll on behalf of the session's participant.
async fn edit_poll<T>(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    edit: impl FnOnce(&mut PollState) -> Result<T, PollError>,
) -> Result<T, PollError> {
    authorize(session, poll_id)?;
    let now = state.config.now();
    let mut polls = state.polls.write().await;
    let ps = polls.get_mut(&poll_id).ok_or(PollError::NotFound(poll_id))?;
    if ps.participant(&session.name).is_none() {
        return Err(PollError::Forbidden);
    }
    if ps.poll.is_closed(now) {
        return Err(PollError::Closed(poll_id));
    }
    let out = edit(&mut *ps)?;
    ps.touch();
    Ok(out)
}

/// Run `edit` against the session participant's grid, then describe it.
async fn edit_grid(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    edit: impl FnOnce(GridShape, &mut Participant) -> Result<(), PollError>,
) -> Result<MyGrid, PollError> {
    edit_poll(state, session, poll_id, |ps| {
        let shape = ps.poll.shape;
        let participant = ps.participant_mut(&session.name).ok_or(PollError::Forbidden)?;
        edit(shape, participant)?;
        let participant = ps.participant(&session.name).ok_or(PollError::Forbidden)?;
        Ok(MyGrid::new(participant, &ps.ballot))
    })
    .await
}

/// The caller's grid without modifying it.
///
/// # Errors
///
/// Returns `Forbidden` for a session of another poll.
pub async fn my_grid(state: &AppState, session: &Session, poll_id: Uuid) -> Result<MyGrid, PollError> {
    authorize(session, poll_id)?;
    let polls = state.polls.read().await;
    let ps = polls.get(&poll_id).ok_or(PollError::NotFound(poll_id))?;
    let participant = ps.participant(&session.name).ok_or(PollError::Forbidden)?;
    Ok(MyGrid::new(participant, &ps.ballot))
}

/// Change the status a click or drag cycles toward.
///
/// # Errors
///
/// Returns `Closed` after the deadline.
pub async fn set_mode(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    mode: SelectionMode,
) -> Result<MyGrid, PollError> {
    edit_grid(state, session, poll_id, |_, p| {
        p.mode = mode;
        Ok(())
    })
    .await
}

/// Pointer down on a cell: toggle it and start a drag.
///
/// # Errors
///
/// Returns `InvalidSlot` for coordinates outside the poll grid.
pub async fn press(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    day: u8,
    hour: u8,
    mode: Option<SelectionMode>,
) -> Result<MyGrid, PollError> {
    edit_grid(state, session, poll_id, |shape, p| {
        let slot = slot(shape, day, hour)?;
        let mode = mode.unwrap_or(p.mode);
        p.drag.press(&mut p.grid, slot, mode);
        Ok(())
    })
    .await
}

/// Pointer enters a cell during a drag.
///
/// # Errors
///
/// Returns `InvalidSlot` for coordinates outside the poll grid.
pub async fn drag(state: &AppState, session: &Session, poll_id: Uuid, day: u8, hour: u8) -> Result<MyGrid, PollError> {
    edit_grid(state, session, poll_id, |shape, p| {
        let slot = slot(shape, day, hour)?;
        p.drag.drag(&mut p.grid, slot);
        Ok(())
    })
    .await
}

/// Pointer up: end the drag.
///
/// # Errors
///
/// Returns `Closed` after the deadline.
pub async fn release(state: &AppState, session: &Session, poll_id: Uuid) -> Result<MyGrid, PollError> {
    edit_grid(state, session, poll_id, |_, p| {
        p.drag.release();
        Ok(())
    })
    .await
}

/// Press at `start`, drag to `end`, release, in one step.
///
/// # Errors
///
/// Returns `InvalidSlot` when either corner is outside the grid; the grid
/// is left untouched in that case.
pub async fn select_range(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    start: (u8, u8),
    end: (u8, u8),
    mode: Option<SelectionMode>,
) -> Result<MyGrid, PollError> {
    edit_grid(state, session, poll_id, |shape, p| {
        let anchor = slot(shape, start.0, start.1)?;
        let terminus = slot(shape, end.0, end.1)?;
        let mode = mode.unwrap_or(p.mode);
        p.drag.press(&mut p.grid, anchor, mode);
        p.drag.drag(&mut p.grid, terminus);
        p.drag.release();
        Ok(())
    })
    .await
}

// =============================================================================
// LOCATIONS
// =============================================================================

/// Add a location candidate; the adder votes for it.
///
/// # Errors
///
/// Returns `EmptyLocation` or `DuplicateLocation`.
pub async fn add_location(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    name: &str,
) -> Result<LocationView, PollError> {
    let view = edit_poll(state, session, poll_id, |ps| {
        let option = ps.ballot.add(name, &session.name)?;
        Ok(LocationView::new(option, Some(session.name.as_str())))
    })
    .await?;
    info!(%poll_id, location = %view.name, "location added");
    Ok(view)
}

/// Toggle the caller's vote on a location.
///
/// # Errors
///
/// Returns `LocationNotFound` for an unknown option.
pub async fn toggle_location_vote(
    state: &AppState,
    session: &Session,
    poll_id: Uuid,
    location_id: Uuid,
) -> Result<LocationView, PollError> {
    edit_poll(state, session, poll_id, |ps| {
        ps.ballot.toggle_vote(location_id, &session.name)?;
        let option = ps
            .ballot
            .options()
            .iter()
            .find(|o| o.id == location_id)
            .ok_or(PollError::LocationNotFound(location_id))?;
        Ok(LocationView::new(option, Some(session.name.as_str())))
    })
    .await
}

// =============================================================================
// RESULTS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    #[serde(flatten)]
    pub label: SlotLabel,
    pub available: Vec<String>,
    pub maybe: Vec<String>,
    pub shade: Shade,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopSlot {
    #[serde(flatten)]
    pub label: SlotLabel,
    pub count: usize,
}

/// Aggregated view over every participant.
#[derive(Debug, Clone, Serialize)]
pub struct PollResults {
    pub poll_id: Uuid,
    pub title: String,
    pub closed: bool,
    pub participants: Vec<String>,
    pub cells: Vec<CellView>,
    pub top_slots: Vec<TopSlot>,
    pub top_locations: Vec<RankedLocation>,
    pub locations: Vec<LocationView>,
}

/// Per-cell tallies, shades, and Top-3 rankings.
///
/// # Errors
///
/// Returns `NotFound` for an unknown poll.
pub async fn results(state: &AppState, poll_id: Uuid, me: Option<&str>) -> Result<PollResults, PollError> {
    let now = state.config.now();
    let polls = state.polls.read().await;
    let ps = polls.get(&poll_id).ok_or(PollError::NotFound(poll_id))?;
    let poll = &ps.poll;

    let respondents: Vec<Respondent<'_>> = ps
        .participants
        .iter()
        .map(|p| Respondent { name: &p.name, grid: &p.grid })
        .collect();
    let total = respondents.len();
    let tallies = stats::tally_grid(poll.shape, &respondents);

    let top_slots = stats::top_slots(&tallies)
        .into_iter()
        .map(|ranked| TopSlot { label: poll.label(ranked.slot), count: ranked.count })
        .collect();

    let cells = tallies
        .into_iter()
        .map(|t| {
            let shade = stats::shade(t.available_count(), t.maybe_count(), total);
            CellView { label: poll.label(t.slot), available: t.available, maybe: t.maybe, shade }
        })
        .collect();

    Ok(PollResults {
        poll_id,
        title: poll.title.clone(),
        closed: poll.is_closed(now),
        participants: ps.participants.iter().map(|p| p.name.clone()).collect(),
        cells,
        top_slots,
        top_locations: stats::top_locations(&ps.ballot),
        locations: ps.ballot.options().iter().map(|o| LocationView::new(o, me)).collect(),
    })
}

#[cfg(test)]
#[path = "poll_test.rs"]
mod tests;
