//! Time-of-day window for a poll.
//!
//! The grid is hour-granular, so custom windows are widened to whole hours:
//! the start is floored and the end rounded up. An end of `00:00` means
//! midnight at the end of the day.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    /// 9:00 to 18:00.
    #[default]
    Morning,
    /// 18:00 to 24:00.
    Evening,
    Custom { start: String, end: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("malformed time {0:?}, expected HH:MM")]
    Malformed(String),
    #[error("window start {start} is not before end {end}")]
    Empty { start: String, end: String },
}

/// Parse `HH:MM` into minutes since midnight.
fn parse_clock(raw: &str) -> Result<u16, WindowError> {
    let malformed = || WindowError::Malformed(raw.to_owned());
    let (h, m) = raw.trim().split_once(':').ok_or_else(malformed)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(malformed());
    }
    let hour: u16 = h.parse().map_err(|_| malformed())?;
    let minute: u16 = m.parse().map_err(|_| malformed())?;
    if hour > 23 || minute > 59 {
        return Err(malformed());
    }
    Ok(hour * 60 + minute)
}

impl TimeWindow {
    /// Whole-hour bounds `[start_hour, end_hour)` covered by this window.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed custom times or an empty window.
    pub fn hours(&self) -> Result<(u8, u8), WindowError> {
        match self {
            Self::Morning => Ok((9, 18)),
            Self::Evening => Ok((18, 24)),
            Self::Custom { start, end } => {
                let start_min = parse_clock(start)?;
                let mut end_min = parse_clock(end)?;
                if end_min == 0 {
                    end_min = 24 * 60;
                }
                if start_min >= end_min {
                    return Err(WindowError::Empty { start: start.clone(), end: end.clone() });
                }
                let start_hour = start_min / 60;
                let end_hour = end_min.div_ceil(60);
                // Both values are bounded by 24.
                Ok((u8::try_from(start_hour).unwrap_or(23), u8::try_from(end_hour).unwrap_or(24)))
            }
        }
    }
}

#[cfg(test)]
#[path = "window_test.rs"]
mod tests;
