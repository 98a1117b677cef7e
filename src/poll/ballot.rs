//! Location ballot: candidate places and who voted for them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Voter names shown inline before collapsing into an overflow count.
pub const VOTER_PREVIEW_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOption {
    pub id: Uuid,
    pub name: String,
    /// Participant names, in voting order.
    pub votes: Vec<String>,
}

impl LocationOption {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { id: Uuid::new_v4(), name: name.to_owned(), votes: Vec::new() }
    }

    #[must_use]
    pub fn has_vote(&self, voter: &str) -> bool {
        self.votes.iter().any(|v| v == voter)
    }

    /// Add or remove `voter`. Returns true when the voter now has a vote.
    pub fn toggle_vote(&mut self, voter: &str) -> bool {
        if self.has_vote(voter) {
            self.votes.retain(|v| v != voter);
            false
        } else {
            self.votes.push(voter.to_owned());
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BallotError {
    #[error("location name is empty")]
    EmptyName,
    #[error("location already exists: {0}")]
    Duplicate(String),
    #[error("location not found: {0}")]
    NotFound(Uuid),
}

/// Ordered list of location candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    options: Vec<LocationOption>,
}

impl Ballot {
    /// Build from the creation form's location list. Blank entries and
    /// repeated names are dropped.
    #[must_use]
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ballot = Self::default();
        for name in names {
            let _ = ballot.push(name);
        }
        ballot
    }

    #[must_use]
    pub fn options(&self) -> &[LocationOption] {
        &self.options
    }

    fn push(&mut self, name: &str) -> Result<usize, BallotError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BallotError::EmptyName);
        }
        if self.options.iter().any(|o| o.name == name) {
            return Err(BallotError::Duplicate(name.to_owned()));
        }
        self.options.push(LocationOption::new(name));
        Ok(self.options.len() - 1)
    }

    /// Add a candidate on behalf of `voter`, who votes for it immediately.
    ///
    /// # Errors
    ///
    /// Returns an error for blank or already-listed names.
    pub fn add(&mut self, name: &str, voter: &str) -> Result<&LocationOption, BallotError> {
        let idx = self.push(name)?;
        self.options[idx].toggle_vote(voter);
        Ok(&self.options[idx])
    }

    /// Toggle `voter`'s vote on option `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown option.
    pub fn toggle_vote(&mut self, id: Uuid, voter: &str) -> Result<bool, BallotError> {
        let option = self
            .options
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(BallotError::NotFound(id))?;
        Ok(option.toggle_vote(voter))
    }

    /// Names of the options `voter` has voted for.
    #[must_use]
    pub fn votes_of(&self, voter: &str) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| o.has_vote(voter))
            .map(|o| o.name.clone())
            .collect()
    }
}

/// Display form of a location option.
#[derive(Debug, Clone, Serialize)]
pub struct LocationView {
    pub id: Uuid,
    pub name: String,
    pub vote_count: usize,
    pub voters_preview: Vec<String>,
    /// Voters beyond the preview.
    pub more_voters: usize,
    pub voted_by_me: bool,
}

impl LocationView {
    #[must_use]
    pub fn new(option: &LocationOption, me: Option<&str>) -> Self {
        let vote_count = option.votes.len();
        Self {
            id: option.id,
            name: option.name.clone(),
            vote_count,
            voters_preview: option.votes.iter().take(VOTER_PREVIEW_LEN).cloned().collect(),
            more_voters: vote_count.saturating_sub(VOTER_PREVIEW_LEN),
            voted_by_me: me.is_some_and(|name| option.has_vote(name)),
        }
    }
}

#[cfg(test)]
#[path = "ballot_test.rs"]
mod tests;
