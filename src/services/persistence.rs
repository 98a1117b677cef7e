//! Persistence service — background flush of dirty polls.
//!
//! DESIGN
//! ======
//! Each poll is stored as one row holding a JSON snapshot of its
//! configuration, participants, and ballot. A background task snapshots
//! every dirty poll under the map lock, releases the lock, upserts the rows,
//! then acknowledges the version it wrote. Request handlers never wait on
//! Postgres.
//!
//! ERROR HANDLING
//! ==============
//! A poll is marked clean only after its row was written, and only up to the
//! version that was snapshotted. A failed write leaves the poll dirty for the
//! next cycle; a mutation that lands mid-flush keeps it dirty as well.

use std::time::Duration;

use serde_json::Value;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::poll::Visibility;
use crate::state::{AppState, PollSnapshot, PollState};

/// Spawn the background persistence task. Returns `None` when running
/// without a database.
#[must_use]
pub fn spawn_persistence_task(state: AppState) -> Option<JoinHandle<()>> {
    state.pool.as_ref()?;
    let flush_interval_ms = state.config.flush_interval_ms;
    info!(flush_interval_ms, "poll persistence flush configured");
    Some(tokio::spawn(async move {
        loop {
            flush_all_dirty(&state).await;
            tokio::time::sleep(Duration::from_millis(flush_interval_ms)).await;
        }
    }))
}

#[derive(Debug)]
struct DirtyPoll {
    id: Uuid,
    title: String,
    is_public: bool,
    deadline: Option<OffsetDateTime>,
    snapshot: Value,
    version: u64,
}

async fn flush_all_dirty(state: &AppState) {
    let Some(pool) = &state.pool else {
        return;
    };

    // PHASE: SNAPSHOT DIRTY POLLS
    // WHY: serialize under the read lock, write to Postgres lock-free.
    let batch = {
        let polls = state.polls.read().await;
        polls
            .values()
            .filter(|ps| ps.is_dirty())
            .filter_map(|ps| match serde_json::to_value(ps.snapshot()) {
                Ok(snapshot) => Some(DirtyPoll {
                    id: ps.poll.id,
                    title: ps.poll.title.clone(),
                    is_public: ps.poll.visibility == Visibility::Public,
                    deadline: ps.poll.deadline,
                    snapshot,
                    version: ps.version,
                }),
                Err(e) => {
                    error!(error = %e, poll_id = %ps.poll.id, "poll snapshot serialization failed");
                    None
                }
            })
            .collect::<Vec<_>>()
    };

    // PHASE: UPSERT + ACK
    for dirty in batch {
        match upsert_poll(pool, &dirty).await {
            Ok(()) => ack_flushed(state, dirty.id, dirty.version).await,
            Err(e) => {
                error!(error = %e, poll_id = %dirty.id, "poll persistence flush failed");
            }
        }
    }
}

#[cfg(test)]
pub(crate) async fn flush_all_dirty_for_tests(state: &AppState) {
    flush_all_dirty(state).await;
}

/// Record that `version` of a poll reached the database.
async fn ack_flushed(state: &AppState, poll_id: Uuid, version: u64) {
    let mut polls = state.polls.write().await;
    if let Some(ps) = polls.get_mut(&poll_id) {
        // EDGE: a slower flush of an older snapshot must not move the mark back.
        if version > ps.persisted_version {
            ps.persisted_version = version;
        }
    }
}

async fn upsert_poll(pool: &PgPool, dirty: &DirtyPoll) -> Result<(), sqlx::Error> {
    let version = i64::try_from(dirty.version).unwrap_or(i64::MAX);
    sqlx::query(
        r"INSERT INTO polls (id, title, is_public, deadline, snapshot, version)
           VALUES ($1, $2, $3, $4, $5, $6)
           ON CONFLICT (id) DO UPDATE SET
               title = EXCLUDED.title,
               is_public = EXCLUDED.is_public,
               deadline = EXCLUDED.deadline,
               snapshot = EXCLUDED.snapshot,
               version = EXCLUDED.version,
               updated_at = now()",
    )
    .bind(dirty.id)
    .bind(&dirty.title)
    .bind(dirty.is_public)
    .bind(dirty.deadline)
    .bind(&dirty.snapshot)
    .bind(version)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load every stored poll into memory. Rows whose snapshot no longer
/// deserializes are skipped with a warning.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn hydrate_all(state: &AppState) -> Result<usize, sqlx::Error> {
    let Some(pool) = &state.pool else {
        return Ok(0);
    };

    let rows = sqlx::query("SELECT id, snapshot, version FROM polls")
        .fetch_all(pool)
        .await?;

    let mut loaded = Vec::with_capacity(rows.len());
    for row in rows {
        let id: Uuid = row.get("id");
        let snapshot: Value = row.get("snapshot");
        let version: i64 = row.get("version");
        match serde_json::from_value::<PollSnapshot>(snapshot) {
            Ok(snapshot) => {
                let version = u64::try_from(version).unwrap_or(0);
                loaded.push((id, PollState::from_snapshot(snapshot, version)));
            }
            Err(e) => warn!(error = %e, poll_id = %id, "skipping unreadable poll snapshot"),
        }
    }

    let count = loaded.len();
    let mut polls = state.polls.write().await;
    polls.extend(loaded);
    info!(count, "polls hydrated");
    Ok(count)
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
