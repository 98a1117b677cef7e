//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the optional database pool, the map of live polls, and the
//! bearer-token session table. Each poll carries a version counter that is
//! bumped on every mutation; the persistence task compares it with the last
//! flushed version to decide what to write.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::poll::Poll;
use crate::poll::ballot::Ballot;
use crate::poll::grid::{AvailabilityGrid, DragState, SelectionMode};

// =============================================================================
// PARTICIPANT
// =============================================================================

/// Salted SHA-256 of an optional join password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

/// A person who joined a poll by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub password: Option<PasswordHash>,
    pub grid: AvailabilityGrid,
    #[serde(default)]
    pub mode: SelectionMode,
    /// In-progress pointer drag. Never persisted.
    #[serde(skip)]
    pub drag: DragState,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

// =============================================================================
// POLL STATE
// =============================================================================

/// Per-poll live state.
#[derive(Debug, Clone)]
pub struct PollState {
    pub poll: Poll,
    /// Participants in join order.
    pub participants: Vec<Participant>,
    pub ballot: Ballot,
    /// Bumped on every mutation.
    pub version: u64,
    /// Last version written to Postgres.
    pub persisted_version: u64,
}

impl PollState {
    /// State for a freshly created poll, dirty until first flush.
    #[must_use]
    pub fn new(poll: Poll, ballot: Ballot) -> Self {
        Self { poll, participants: Vec::new(), ballot, version: 1, persisted_version: 0 }
    }

    /// State rebuilt from a stored snapshot, clean.
    #[must_use]
    pub fn from_snapshot(snapshot: PollSnapshot, version: u64) -> Self {
        Self {
            poll: snapshot.poll,
            participants: snapshot.participants,
            ballot: snapshot.ballot,
            version,
            persisted_version: version,
        }
    }

    #[must_use]
    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    pub fn participant_mut(&mut self, name: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.name == name)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.version != self.persisted_version
    }

    pub fn touch(&mut self) {
        self.version += 1;
    }

    #[must_use]
    pub fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            poll: self.poll.clone(),
            participants: self.participants.clone(),
            ballot: self.ballot.clone(),
        }
    }
}

/// Serializable form of a poll stored in the `polls.snapshot` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSnapshot {
    pub poll: Poll,
    pub participants: Vec<Participant>,
    pub ballot: Ballot,
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Identity behind a bearer token: one participant of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    pub poll_id: Uuid,
    pub name: String,
}

/// Bearer tokens, at most one per participant.
#[derive(Debug, Default)]
pub struct SessionTable {
    by_token: HashMap<String, Session>,
    by_participant: HashMap<Session, String>,
}

impl SessionTable {
    /// Token already issued to `session`'s participant, if any.
    #[must_use]
    pub fn token_for(&self, session: &Session) -> Option<&str> {
        self.by_participant.get(session).map(String::as_str)
    }

    pub fn insert(&mut self, token: String, session: Session) {
        if let Some(old) = self.by_participant.insert(session.clone(), token.clone()) {
            self.by_token.remove(&old);
        }
        self.by_token.insert(token, session);
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<&Session> {
        self.by_token.get(token)
    }

    pub fn remove(&mut self, token: &str) -> Option<Session> {
        let session = self.by_token.remove(token)?;
        self.by_participant.remove(&session);
        Some(session)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub config: Arc<AppConfig>,
    pub polls: Arc<RwLock<HashMap<Uuid, PollState>>>,
    pub sessions: Arc<RwLock<SessionTable>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: Option<PgPool>, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            polls: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(SessionTable::default())),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::poll::Visibility;
    use crate::poll::grid::GridShape;
    use crate::poll::window::TimeWindow;

    /// In-memory `AppState` with default config and no database.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(None, AppConfig::default())
    }

    /// A public two-week morning poll starting today.
    #[must_use]
    pub fn dummy_poll() -> Poll {
        let now = OffsetDateTime::now_utc();
        let today = now.date();
        Poll {
            id: Uuid::new_v4(),
            title: "Team sync".into(),
            dates: (0..14).map(|i| today + time::Duration::days(i)).collect(),
            window: TimeWindow::Morning,
            shape: GridShape::default(),
            visibility: Visibility::Public,
            deadline: None,
            created_at: now,
        }
    }

    /// Seed a poll with the given location names and return its ID.
    pub async fn seed_poll(state: &AppState, locations: &[&str]) -> Uuid {
        seed_poll_with(state, dummy_poll(), locations).await
    }

    /// Seed a specific poll and return its ID.
    pub async fn seed_poll_with(state: &AppState, poll: Poll, locations: &[&str]) -> Uuid {
        let id = poll.id;
        let mut polls = state.polls.write().await;
        polls.insert(id, PollState::new(poll, Ballot::from_names(locations.iter().copied())));
        id
    }

    /// Participant with an empty grid for the default shape.
    #[must_use]
    pub fn dummy_participant(name: &str) -> Participant {
        Participant {
            name: name.to_owned(),
            password: None,
            grid: AvailabilityGrid::new(GridShape::default()),
            mode: SelectionMode::Available,
            drag: DragState::default(),
            joined_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
