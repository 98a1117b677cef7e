//! Personal availability grid.
//!
//! DESIGN
//! ======
//! A grid is a flat `Vec<TimeStatus>` laid out day-major: the cell for
//! `(day, hour)` lives at `day * hour_count + (hour - start_hour)`. Every
//! operation here is total over a validated `Slot`; coordinates coming from
//! the outside world go through `GridShape::slot` first.
//!
//! Drag-select follows pointer semantics: a press toggles the anchor cell
//! with the active selection mode, every subsequent drag event paints the
//! rectangle between anchor and terminus with the anchor's new status, and
//! release forgets the anchor.

use serde::{Deserialize, Serialize};

/// Maximum number of candidate days a poll grid can hold.
pub const MAX_GRID_DAYS: u8 = 14;

/// Default grid: two weeks, 9:00 through 17:00 starts.
pub const DEFAULT_START_HOUR: u8 = 9;
pub const DEFAULT_END_HOUR: u8 = 18;

// =============================================================================
// STATUS
// =============================================================================

/// Availability of a single participant for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStatus {
    #[default]
    Impossible,
    Maybe,
    Available,
}

/// Which status a click or drag cycles toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Available,
    Maybe,
}

impl SelectionMode {
    #[must_use]
    pub fn target(self) -> TimeStatus {
        match self {
            Self::Available => TimeStatus::Available,
            Self::Maybe => TimeStatus::Maybe,
        }
    }
}

/// Next status for a clicked cell. Toggles between `Impossible` and the
/// mode's target; never jumps straight to the third status.
#[must_use]
pub fn next_status(current: TimeStatus, mode: SelectionMode) -> TimeStatus {
    let target = mode.target();
    if current == target { TimeStatus::Impossible } else { target }
}

// =============================================================================
// SHAPE
// =============================================================================

/// Dimensions of a poll grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub days: u8,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for GridShape {
    fn default() -> Self {
        Self { days: MAX_GRID_DAYS, start_hour: DEFAULT_START_HOUR, end_hour: DEFAULT_END_HOUR }
    }
}

impl GridShape {
    /// Build a shape, returning `None` when the dimensions are empty or out of range.
    #[must_use]
    pub fn new(days: u8, start_hour: u8, end_hour: u8) -> Option<Self> {
        if days == 0 || days > MAX_GRID_DAYS || start_hour >= end_hour || end_hour > 24 {
            return None;
        }
        Some(Self { days, start_hour, end_hour })
    }

    #[must_use]
    pub fn hour_count(&self) -> usize {
        usize::from(self.end_hour - self.start_hour)
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::from(self.days) * self.hour_count()
    }

    /// Validate a `(day, hour)` pair against this shape.
    #[must_use]
    pub fn slot(&self, day: u8, hour: u8) -> Option<Slot> {
        if day < self.days && hour >= self.start_hour && hour < self.end_hour {
            Some(Slot { day, hour })
        } else {
            None
        }
    }

    /// Flat index of a slot.
    #[must_use]
    pub fn index(&self, slot: Slot) -> usize {
        usize::from(slot.day) * self.hour_count() + usize::from(slot.hour - self.start_hour)
    }

    /// All slots in day-major, hour-minor order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.days).flat_map(move |day| (self.start_hour..self.end_hour).map(move |hour| Slot { day, hour }))
    }
}

/// A validated `(day, hour)` cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: u8,
    pub hour: u8,
}

// =============================================================================
// GRID
// =============================================================================

/// Tally of a grid's cells per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub available: usize,
    pub maybe: usize,
    pub impossible: usize,
}

/// One participant's availability over a poll's grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityGrid {
    shape: GridShape,
    cells: Vec<TimeStatus>,
}

impl AvailabilityGrid {
    /// Fresh grid with every cell `Impossible`.
    #[must_use]
    pub fn new(shape: GridShape) -> Self {
        Self { shape, cells: vec![TimeStatus::Impossible; shape.cell_count()] }
    }

    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[must_use]
    pub fn cells(&self) -> &[TimeStatus] {
        &self.cells
    }

    #[must_use]
    pub fn status(&self, slot: Slot) -> TimeStatus {
        self.cells[self.shape.index(slot)]
    }

    pub fn set(&mut self, slot: Slot, status: TimeStatus) {
        let index = self.shape.index(slot);
        self.cells[index] = status;
    }

    /// Click semantics: cycle the cell and return its new status.
    pub fn toggle(&mut self, slot: Slot, mode: SelectionMode) -> TimeStatus {
        let next = next_status(self.status(slot), mode);
        self.set(slot, next);
        next
    }

    /// Paint the rectangle spanned by `anchor` and `terminus` with the
    /// anchor's current status. Returns the number of cells in the span.
    pub fn fill_span(&mut self, anchor: Slot, terminus: Slot) -> usize {
        let status = self.status(anchor);
        let (min_day, max_day) = (anchor.day.min(terminus.day), anchor.day.max(terminus.day));
        let (min_hour, max_hour) = (anchor.hour.min(terminus.hour), anchor.hour.max(terminus.hour));

        let mut painted = 0;
        for day in min_day..=max_day {
            for hour in min_hour..=max_hour {
                self.set(Slot { day, hour }, status);
                painted += 1;
            }
        }
        painted
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for status in &self.cells {
            match status {
                TimeStatus::Available => counts.available += 1,
                TimeStatus::Maybe => counts.maybe += 1,
                TimeStatus::Impossible => counts.impossible += 1,
            }
        }
        counts
    }
}

// =============================================================================
// DRAG STATE
// =============================================================================

/// Pointer-driven editing session over one grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragState {
    anchor: Option<Slot>,
}

impl DragState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// Pointer down: toggle the cell and remember it as the anchor.
    pub fn press(&mut self, grid: &mut AvailabilityGrid, slot: Slot, mode: SelectionMode) -> TimeStatus {
        self.anchor = Some(slot);
        grid.toggle(slot, mode)
    }

    /// Pointer enter: paint the span from the anchor. No-op without a press.
    pub fn drag(&self, grid: &mut AvailabilityGrid, slot: Slot) -> usize {
        match self.anchor {
            Some(anchor) => grid.fill_span(anchor, slot),
            None => 0,
        }
    }

    /// Pointer up or leave.
    pub fn release(&mut self) {
        self.anchor = None;
    }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod tests;
