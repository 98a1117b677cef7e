//! Candidate-date calendar.
//!
//! DESIGN
//! ======
//! The creation form picks candidate dates from a month calendar. Days
//! before "today" cannot be picked. Dragging across days works like the
//! availability grid in one dimension: the press toggles the anchor day,
//! and every day between anchor and pointer takes the anchor's state.
//!
//! A selection never holds more than `MAX_GRID_DAYS` dates. Spans stop
//! walking as soon as that cap is hit, so the work done per gesture is
//! bounded by the cap rather than by the distance between two dates.

use std::collections::BTreeSet;

use serde::Serialize;
use time::{Date, Month, Weekday};

use super::grid::MAX_GRID_DAYS;

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if time::util::is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// Column of the 1st of the month in a Sunday-first week (Sunday = 0).
#[must_use]
pub fn first_weekday(year: i32, month: Month) -> Option<u8> {
    Date::from_calendar_date(year, month, 1)
        .ok()
        .map(|d| d.weekday().number_days_from_sunday())
}

/// Month shown by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: Month,
}

impl MonthCursor {
    #[must_use]
    pub fn containing(date: Date) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self.month {
            Month::December => Self { year: self.year + 1, month: Month::January },
            m => Self { year: self.year, month: m.next() },
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        match self.month {
            Month::January => Self { year: self.year - 1, month: Month::December },
            m => Self { year: self.year, month: m.previous() },
        }
    }
}

// =============================================================================
// MONTH VIEW
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub day: u8,
    pub date: Date,
    pub weekday: Weekday,
    pub is_past: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

/// Renderable month: blank cells before the 1st, then one cell per day.
#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u8,
    pub leading_blanks: u8,
    pub days: Vec<DayCell>,
}

/// Lay out a month relative to `today`, marking already-selected dates.
#[must_use]
pub fn month_view(cursor: MonthCursor, today: Date, selected: &BTreeSet<Date>) -> Option<MonthView> {
    let leading_blanks = first_weekday(cursor.year, cursor.month)?;
    let days = (1..=days_in_month(cursor.year, cursor.month))
        .filter_map(|day| Date::from_calendar_date(cursor.year, cursor.month, day).ok())
        .map(|date| DayCell {
            day: date.day(),
            date,
            weekday: date.weekday(),
            is_past: date < today,
            is_today: date == today,
            is_selected: selected.contains(&date),
        })
        .collect();
    Some(MonthView { year: cursor.year, month: u8::from(cursor.month), leading_blanks, days })
}

/// Year and 1-based month, as sent to and from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u8,
}

impl From<MonthCursor> for MonthRef {
    fn from(cursor: MonthCursor) -> Self {
        Self { year: cursor.year, month: u8::from(cursor.month) }
    }
}

/// A month view rendered against a selection, with navigation targets.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarPage {
    #[serde(flatten)]
    pub view: MonthView,
    pub selected: Vec<Date>,
    /// No further dates can be added.
    pub full: bool,
    pub prev: MonthRef,
    pub next: MonthRef,
}

/// Lay out `cursor`'s month for the picker state in `selection`.
#[must_use]
pub fn calendar_page(cursor: MonthCursor, selection: &DateSelection) -> Option<CalendarPage> {
    let view = month_view(cursor, selection.today, selection.selected())?;
    Some(CalendarPage {
        view,
        selected: selection.selected().iter().copied().collect(),
        full: selection.is_full(),
        prev: cursor.prev().into(),
        next: cursor.next().into(),
    })
}

// =============================================================================
// DATE SELECTION
// =============================================================================

/// Set of picked candidate dates with drag support.
#[derive(Debug, Clone)]
pub struct DateSelection {
    today: Date,
    selected: BTreeSet<Date>,
    anchor: Option<Date>,
}

impl DateSelection {
    #[must_use]
    pub fn new(today: Date) -> Self {
        Self { today, selected: BTreeSet::new(), anchor: None }
    }

    #[must_use]
    pub fn is_past(&self, date: Date) -> bool {
        date < self.today
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.selected.len() >= usize::from(MAX_GRID_DAYS)
    }

    #[must_use]
    pub fn selected(&self) -> &BTreeSet<Date> {
        &self.selected
    }

    #[must_use]
    pub fn into_dates(self) -> Vec<Date> {
        self.selected.into_iter().collect()
    }

    /// Toggle a single date. Returns false for past dates and when adding
    /// it would exceed the cap.
    pub fn toggle(&mut self, date: Date) -> bool {
        if self.is_past(date) {
            return false;
        }
        if self.selected.remove(&date) {
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.selected.insert(date);
        true
    }

    /// Pointer down on a day.
    pub fn press(&mut self, date: Date) -> bool {
        if !self.toggle(date) {
            return false;
        }
        self.anchor = Some(date);
        true
    }

    /// Pointer enter: every non-past day between anchor and `date` takes
    /// the anchor's selected state. Returns false if the cap cut the span
    /// short.
    pub fn drag(&mut self, date: Date) -> bool {
        let Some(anchor) = self.anchor else {
            return true;
        };
        if self.is_past(date) {
            return true;
        }
        let select = self.selected.contains(&anchor);
        self.apply_span(anchor.min(date), anchor.max(date), select)
    }

    pub fn release(&mut self) {
        self.anchor = None;
    }

    /// Select every non-past day in `[from, to]` (order-insensitive).
    /// Returns false if the cap was reached before the span was covered.
    pub fn select_range(&mut self, from: Date, to: Date) -> bool {
        self.apply_span(from.min(to), from.max(to), true)
    }

    fn apply_span(&mut self, start: Date, end: Date, select: bool) -> bool {
        let start = start.max(self.today);
        if start > end {
            return true;
        }
        if !select {
            self.selected.retain(|d| *d < start || *d > end);
            return true;
        }

        let mut cursor = Some(start);
        while let Some(date) = cursor.filter(|d| *d <= end) {
            if !self.selected.contains(&date) {
                if self.is_full() {
                    return false;
                }
                self.selected.insert(date);
            }
            cursor = date.next_day();
        }
        true
    }
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
