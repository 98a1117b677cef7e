//! Scheduling-poll domain model.
//!
//! ARCHITECTURE
//! ============
//! Pure, synchronous types and functions. Nothing in this module touches
//! shared state, I/O, or the clock; callers pass "now" and "today" in.
//! Services wrap these in locking and persistence.

pub mod ballot;
pub mod calendar;
pub mod grid;
pub mod stats;
pub mod theme;
pub mod window;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Weekday};
use uuid::Uuid;

use self::grid::{GridShape, Slot};
use self::window::TimeWindow;

pub const DEFAULT_TITLE: &str = "Untitled poll";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Immutable configuration of a poll, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    /// Candidate dates, ascending. Grid day `i` is `dates[i]`.
    pub dates: Vec<Date>,
    pub window: TimeWindow,
    pub shape: GridShape,
    pub visibility: Visibility,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Poll {
    /// Whether participant edits are no longer accepted.
    #[must_use]
    pub fn is_closed(&self, now: OffsetDateTime) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Human-facing coordinates of a grid cell.
    #[must_use]
    pub fn label(&self, slot: Slot) -> SlotLabel {
        let date = self.dates.get(usize::from(slot.day)).copied();
        SlotLabel {
            day: slot.day,
            hour: slot.hour,
            date,
            weekday: date.map(Date::weekday),
            week: slot.day / 7 + 1,
            time: format!("{:02}:00", slot.hour),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotLabel {
    pub day: u8,
    pub hour: u8,
    pub date: Option<Date>,
    pub weekday: Option<Weekday>,
    /// 1-based week of the poll the day falls in.
    pub week: u8,
    pub time: String,
}
