//! Fixed three-slot leaderboard of the best scores
//!
//! Slots are kept sorted by score, highest first. Equal scores are ordered
//! with real players ahead of empty slots, then by the sequence number at
//! which each entry reached its current score (earliest first), which makes
//! the order deterministic for the lifetime of the process.

use crate::error::Result;
use crate::score_store::ScoreStore;
use crate::storage::write_records;
use log::{debug, info, warn};
use shared::{ScoreRecord, TopEntry, LEADERBOARD_SIZE};
use std::cmp::Ordering;
use std::path::Path;

const SNAPSHOT_FILE_HEADER: &str = "top 3 snapshot";
const LAST_SLOT: usize = LEADERBOARD_SIZE - 1;

#[derive(Debug, Clone)]
struct Slot {
    entry: TopEntry,
    /// False for the `empty` placeholder
    filled: bool,
    seq: u64,
}

impl Slot {
    fn filled(entry: TopEntry, seq: u64) -> Self {
        Self {
            entry,
            filled: true,
            seq,
        }
    }

    fn sentinel(seq: u64) -> Self {
        Self {
            entry: TopEntry::sentinel(),
            filled: false,
            seq,
        }
    }

    fn rank(a: &Slot, b: &Slot) -> Ordering {
        b.entry
            .score
            .cmp(&a.entry.score)
            .then_with(|| b.filled.cmp(&a.filled))
            .then_with(|| a.seq.cmp(&b.seq))
    }
}

/// Tracks the top scores and persists them as a snapshot file
#[derive(Debug)]
pub struct LeaderboardTracker {
    /// Always sorted by [`Slot::rank`]
    slots: [Slot; LEADERBOARD_SIZE],
    /// Next sequence number handed to a slot whose score changes
    next_seq: u64,
    /// Set by [`LeaderboardTracker::initialize`]
    loaded: bool,
}

impl Default for LeaderboardTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardTracker {
    /// Creates a board of three empty slots, not yet initialized from disk
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|i| Slot::sentinel(i as u64)),
            next_seq: LEADERBOARD_SIZE as u64,
            loaded: false,
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Rebuilds the slots from a snapshot file's records.
    ///
    /// Snapshot scores are ignored; each username is ranked by its best
    /// score in `scores`. Usernames without a stored score are dropped, and
    /// the board is padded with empty slots when fewer than three remain.
    pub fn initialize(&mut self, scores: &ScoreStore, snapshot: &[ScoreRecord]) {
        let mut candidates: Vec<Slot> = Vec::with_capacity(snapshot.len().max(LEADERBOARD_SIZE));

        for record in snapshot {
            if candidates
                .iter()
                .any(|slot| slot.entry.username == record.username)
            {
                continue;
            }

            match scores.peek(&record.username) {
                Some(score) => {
                    let seq = self.take_seq();
                    candidates.push(Slot::filled(
                        TopEntry::new(record.username.clone(), score),
                        seq,
                    ));
                }
                None => warn!(
                    "Leaderboard entry {} has no stored score, leaving its slot empty",
                    record.username
                ),
            }
        }

        while candidates.len() < LEADERBOARD_SIZE {
            let seq = self.take_seq();
            candidates.push(Slot::sentinel(seq));
        }

        candidates.sort_by(Slot::rank);
        for (slot, candidate) in self.slots.iter_mut().zip(candidates) {
            *slot = candidate;
        }
        self.loaded = true;

        debug!("Leaderboard initialized: {:?}", self.snapshot());
    }

    /// Score a newcomer has to beat to enter the board
    pub fn lowest_score(&self) -> u64 {
        self.slots[LAST_SLOT].entry.score
    }

    /// Offers a new best score to the board.
    ///
    /// A player already on the board has their slot raised in place. Anyone
    /// else replaces the last slot only with a strictly higher score. Returns
    /// true if the board changed.
    pub fn try_insert(&mut self, username: &str, score: u64) -> bool {
        match self.position(username) {
            Some(pos) => {
                if score <= self.slots[pos].entry.score {
                    return false;
                }
                let seq = self.take_seq();
                self.slots[pos] = Slot::filled(TopEntry::new(username, score), seq);
            }
            None => {
                if score <= self.lowest_score() {
                    return false;
                }
                let seq = self.take_seq();
                let displaced = std::mem::replace(
                    &mut self.slots[LAST_SLOT],
                    Slot::filled(TopEntry::new(username, score), seq),
                );
                if displaced.filled {
                    debug!(
                        "{} ({}) displaced {} ({}) from the leaderboard",
                        username, score, displaced.entry.username, displaced.entry.score
                    );
                }
            }
        }

        self.slots.sort_by(Slot::rank);
        info!("Leaderboard changed: {}", self.describe());
        true
    }

    /// Writes the occupied slots to the snapshot file; empty slots are omitted
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let records: Vec<&TopEntry> = self
            .slots
            .iter()
            .filter(|slot| slot.filled)
            .map(|slot| &slot.entry)
            .collect();

        write_records(path.as_ref(), SNAPSHOT_FILE_HEADER, records).await
    }

    /// Copies the slots out, highest score first.
    ///
    /// Empty slots appear as the `empty` placeholder with a score of 0.
    pub fn snapshot(&self) -> [TopEntry; LEADERBOARD_SIZE] {
        std::array::from_fn(|i| self.slots[i].entry.clone())
    }

    /// True if `username` occupies one of the slots
    pub fn contains(&self, username: &str) -> bool {
        self.position(username).is_some()
    }

    /// True once the board was built from a snapshot file
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn position(&self, username: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.filled && slot.entry.username == username)
    }

    fn describe(&self) -> String {
        self.slots
            .iter()
            .map(|slot| format!("{}={}", slot.entry.username, slot.entry.score))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
