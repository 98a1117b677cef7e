//! Aggregate statistics across participants.
//!
//! DESIGN
//! ======
//! Everything here is a single pass over a bounded grid (at most
//! 14 days x 24 hours) times the participant count. Rankings use a stable
//! sort, so ties keep iteration order: day-major then hour for slots,
//! insertion order for locations.

use serde::Serialize;
use uuid::Uuid;

use super::ballot::Ballot;
use super::grid::{AvailabilityGrid, GridShape, Slot, TimeStatus};

/// Entries returned by the recommendation rankings.
pub const TOP_N: usize = 3;

/// A named grid contributing to the aggregate.
#[derive(Debug, Clone, Copy)]
pub struct Respondent<'a> {
    pub name: &'a str,
    pub grid: &'a AvailabilityGrid,
}

impl Respondent<'_> {
    fn status(&self, shape: GridShape, slot: Slot) -> TimeStatus {
        self.grid
            .cells()
            .get(shape.index(slot))
            .copied()
            .unwrap_or_default()
    }
}

/// Who marked a cell available or maybe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotTally {
    pub slot: Slot,
    pub available: Vec<String>,
    pub maybe: Vec<String>,
}

impl SlotTally {
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    #[must_use]
    pub fn maybe_count(&self) -> usize {
        self.maybe.len()
    }
}

/// Names of respondents by status for one cell.
#[must_use]
pub fn tally_slot(shape: GridShape, respondents: &[Respondent<'_>], slot: Slot) -> SlotTally {
    let mut tally = SlotTally { slot, available: Vec::new(), maybe: Vec::new() };
    for r in respondents {
        match r.status(shape, slot) {
            TimeStatus::Available => tally.available.push(r.name.to_owned()),
            TimeStatus::Maybe => tally.maybe.push(r.name.to_owned()),
            TimeStatus::Impossible => {}
        }
    }
    tally
}

/// Tally every cell in day-major order.
#[must_use]
pub fn tally_grid(shape: GridShape, respondents: &[Respondent<'_>]) -> Vec<SlotTally> {
    shape.slots().map(|slot| tally_slot(shape, respondents, slot)).collect()
}

// =============================================================================
// SHADE
// =============================================================================

/// Color intensity of a results cell. Tiers follow a 100..=900 palette scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "tone", content = "tier", rename_all = "snake_case")]
pub enum Shade {
    Empty,
    Maybe(u16),
    Available(u16),
}

/// Shade for a cell given its counts and the roster size.
///
/// Maybe-only cells are bucketed on purpose: the ratio `maybe / total` is
/// rounded up to quarters, so the shade is one of 200, 300, 400, or 500
/// rather than the continuous `ceil(400 * ratio) + 100`. Clients map each
/// step to a palette class.
#[must_use]
pub fn shade(available: usize, maybe: usize, total: usize) -> Shade {
    if total == 0 {
        return Shade::Empty;
    }
    if available == 0 {
        if maybe == 0 {
            return Shade::Empty;
        }
        // ceil(4 * ratio) in integer arithmetic, ratio capped at 1.
        let steps = (4 * maybe.min(total)).div_ceil(total);
        return Shade::Maybe(100 + 100 * u16::try_from(steps).unwrap_or(4));
    }

    // Compare available/total against fifths without floating point.
    let fifths = available * 5;
    let tier = if fifths >= total * 4 {
        600
    } else if fifths >= total * 3 {
        500
    } else if fifths >= total * 2 {
        400
    } else if fifths >= total {
        300
    } else {
        200
    };
    Shade::Available(tier)
}

// =============================================================================
// RANKINGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedSlot {
    pub slot: Slot,
    pub count: usize,
}

/// Highest-availability cells, at most `TOP_N`, non-increasing by count.
/// Cells nobody can attend are never recommended.
#[must_use]
pub fn top_slots(tallies: &[SlotTally]) -> Vec<RankedSlot> {
    let mut ranked: Vec<RankedSlot> = tallies
        .iter()
        .filter(|t| t.available_count() > 0)
        .map(|t| RankedSlot { slot: t.slot, count: t.available_count() })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_N);
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedLocation {
    pub id: Uuid,
    pub name: String,
    pub count: usize,
}

/// Most-voted locations, at most `TOP_N`. Empty when nobody has voted.
#[must_use]
pub fn top_locations(ballot: &Ballot) -> Vec<RankedLocation> {
    let mut ranked: Vec<RankedLocation> = ballot
        .options()
        .iter()
        .filter(|o| !o.votes.is_empty())
        .map(|o| RankedLocation { id: o.id, name: o.name.clone(), count: o.votes.len() })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_N);
    ranked
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
