//! Data types shared between the ranking service and its callers.
//!
//! The leaderboard always has [`LEADERBOARD_SIZE`] slots; slots that no real
//! player occupies hold the sentinel entry produced by [`TopEntry::sentinel`].

use serde::{Deserialize, Serialize};

pub mod properties;

pub use properties::{decode_records, encode_records, DecodeError};

/// Number of slots on the leaderboard
pub const LEADERBOARD_SIZE: usize = 3;
/// Username shown in leaderboard slots no player has reached yet
pub const SENTINEL_USERNAME: &str = "empty";

/// A username paired with a score.
///
/// Used both for the per-player best score map and for leaderboard slots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct ScoreRecord {
    /// Player name, any string including the empty one
    pub username: String,
    /// Best score reached, never negative
    pub score: u64,
}

/// Leaderboard slot content; same shape as a stored score.
pub type TopEntry = ScoreRecord;

impl ScoreRecord {
    /// Creates a record for `username` with the given score
    pub fn new(username: impl Into<String>, score: u64) -> Self {
        Self {
            username: username.into(),
            score,
        }
    }

    /// Placeholder for an unfilled leaderboard slot
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_USERNAME, 0)
    }

    /// True for the placeholder of an unfilled slot.
    ///
    /// A real player named `empty` only matches while their score is 0.
    pub fn is_sentinel(&self) -> bool {
        self.username == SENTINEL_USERNAME && self.score == 0
    }
}

/// A leaderboard made only of sentinel entries
pub fn empty_leaderboard() -> [TopEntry; LEADERBOARD_SIZE] {
    [
        TopEntry::sentinel(),
        TopEntry::sentinel(),
        TopEntry::sentinel(),
    ]
}
