//! Per-player best score map and its backing file
//!
//! Every player who has ever been looked up has an entry; looking up an
//! unknown username registers it with a score of zero.

use crate::error::Result;
use crate::storage::{read_records, write_records};
use log::{debug, info};
use shared::ScoreRecord;
use std::collections::HashMap;
use std::path::Path;

const SCORE_FILE_HEADER: &str = "ranking scores";

/// Username to best score, loaded once from disk
#[derive(Debug, Default)]
pub struct ScoreStore {
    /// Best score of every registered player
    scores: HashMap<String, u64>,
    /// Set by the first successful [`ScoreStore::load`]
    loaded: bool,
}

impl ScoreStore {
    /// Creates an empty, unloaded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the backing file into memory.
    ///
    /// Returns false without touching the file if the store was already
    /// loaded.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if self.loaded {
            debug!("Score store already loaded, ignoring {}", path.display());
            return Ok(false);
        }

        let records = read_records(path).await?;
        self.scores = records
            .into_iter()
            .map(|record| (record.username, record.score))
            .collect();
        self.loaded = true;

        info!("Loaded {} scores from {}", self.scores.len(), path.display());
        Ok(true)
    }

    /// Returns the best score for `username`, registering unknown players at 0
    pub fn get(&mut self, username: &str) -> u64 {
        if let Some(score) = self.scores.get(username) {
            return *score;
        }

        debug!("Registered new player {}", username);
        self.scores.insert(username.to_string(), 0);
        0
    }

    /// Looks up a score without registering the player
    pub fn peek(&self, username: &str) -> Option<u64> {
        self.scores.get(username).copied()
    }

    /// Overwrites the stored score; callers only pass improvements
    pub fn set(&mut self, username: &str, score: u64) {
        self.scores.insert(username.to_string(), score);
    }

    /// Rewrites the whole backing file from memory
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut records: Vec<ScoreRecord> = self
            .scores
            .iter()
            .map(|(username, score)| ScoreRecord::new(username.clone(), *score))
            .collect();
        // Sorted by username so repeated saves of the same map are identical
        records.sort_by(|a, b| a.username.cmp(&b.username));

        write_records(path, SCORE_FILE_HEADER, &records).await?;
        debug!("Persisted {} scores to {}", records.len(), path.display());
        Ok(())
    }

    /// Iterates over every registered player and their best score.
    ///
    /// The order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.scores
            .iter()
            .map(|(username, score)| (username.as_str(), *score))
    }

    /// Number of registered players, including those still at 0
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if no player has been registered
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// True once the backing file has been read
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}
