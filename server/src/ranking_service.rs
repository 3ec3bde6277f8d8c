//! Process-wide ranking service shared by every game session
//!
//! All state lives behind one [`tokio::sync::RwLock`]. Loading and score
//! submissions hold the write lock from the first check until both backing
//! files are written; queries take the read lock. A submission whose file
//! write fails returns the error, but the in-memory update it already made is
//! kept.

use crate::error::{RankingError, Result};
use crate::leaderboard::LeaderboardTracker;
use crate::score_store::ScoreStore;
use crate::storage::{create_if_missing, read_records};
use log::{debug, error, info};
use shared::{TopEntry, LEADERBOARD_SIZE};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::sync::RwLock;

static INSTANCE: OnceLock<RankingService> = OnceLock::new();

/// Outcome of a score submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreUpdate {
    /// Not higher than the player's best score, which is carried along
    Unchanged { best: u64 },
    /// New best score that did not reach the leaderboard
    PersonalBest,
    /// New best score that changed the leaderboard
    TopThree,
}

impl ScoreUpdate {
    /// True when the submission was stored as a new best score
    pub fn is_improvement(self) -> bool {
        !matches!(self, ScoreUpdate::Unchanged { .. })
    }
}

/// Backing files captured by a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingPaths {
    /// Every registered player's best score
    pub score_file: PathBuf,
    /// Players currently on the leaderboard
    pub top3_file: PathBuf,
}

#[derive(Debug, Default)]
struct RankingState {
    scores: ScoreStore,
    leaderboard: LeaderboardTracker,
    paths: Option<RankingPaths>,
}

/// Best scores and the top-3 leaderboard
///
/// Construct one with [`RankingService::new`] and share it behind an `Arc`,
/// or use the lazily created [`RankingService::instance`].
#[derive(Debug, Default)]
pub struct RankingService {
    state: RwLock<RankingState>,
}

impl RankingService {
    /// Creates an unloaded service
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide service, created unloaded on first use
    pub fn instance() -> &'static RankingService {
        INSTANCE.get_or_init(RankingService::new)
    }

    /// Loads the score file and the leaderboard snapshot.
    ///
    /// Returns false, without reading anything, if rankings were already
    /// loaded. Both files are read before any state changes, so a failed load
    /// leaves the service unloaded and can be retried.
    pub async fn load_rankings(
        &self,
        score_file: impl AsRef<Path>,
        top3_file: impl AsRef<Path>,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.scores.is_loaded() || state.leaderboard.is_loaded() {
            debug!("Rankings already loaded, ignoring load request");
            return Ok(false);
        }

        let score_file = score_file.as_ref();
        let top3_file = top3_file.as_ref();

        let mut scores = ScoreStore::new();
        scores.load(score_file).await?;
        let snapshot = read_records(top3_file).await?;

        // Players registered by lookups before the load keep their entry
        for (username, score) in state.scores.iter() {
            if scores.peek(username).is_none() {
                scores.set(username, score);
            }
        }

        let mut leaderboard = LeaderboardTracker::new();
        leaderboard.initialize(&scores, &snapshot);

        info!(
            "Rankings loaded: {} players from {}, leaderboard from {}",
            scores.len(),
            score_file.display(),
            top3_file.display()
        );

        *state = RankingState {
            scores,
            leaderboard,
            paths: Some(RankingPaths {
                score_file: score_file.to_path_buf(),
                top3_file: top3_file.to_path_buf(),
            }),
        };
        Ok(true)
    }

    /// Current leaderboard, highest score first.
    ///
    /// Always returns three entries; unfilled slots hold the `empty`
    /// placeholder with a score of 0. Works before loading, returning an
    /// all-placeholder board.
    pub async fn get_top3(&self) -> [TopEntry; LEADERBOARD_SIZE] {
        self.state.read().await.leaderboard.snapshot()
    }

    /// Best score for `username`; unknown players are registered with 0
    pub async fn get_user_highscore(&self, username: &str) -> u64 {
        let known = self.state.read().await.scores.peek(username);
        if let Some(score) = known {
            return score;
        }

        self.state.write().await.scores.get(username)
    }

    /// Records `score` if it beats the player's best and persists the change.
    ///
    /// Returns false when the score is not an improvement.
    pub async fn refresh_user_highscore(&self, username: &str, score: u64) -> Result<bool> {
        self.submit_score(username, score)
            .await
            .map(ScoreUpdate::is_improvement)
    }

    /// Same as [`refresh_user_highscore`](Self::refresh_user_highscore), also
    /// reporting whether the leaderboard changed.
    ///
    /// The snapshot file is written before the score file. Either write
    /// failing fails the call.
    pub async fn submit_score(&self, username: &str, score: u64) -> Result<ScoreUpdate> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let paths = state.paths.clone().ok_or(RankingError::NotLoaded)?;

        let best = state.scores.get(username);
        if score <= best {
            return Ok(ScoreUpdate::Unchanged { best });
        }
        state.scores.set(username, score);
        debug!("New best score for {}: {}", username, score);

        let on_board = state.leaderboard.try_insert(username, score);
        if on_board {
            if let Err(e) = state.leaderboard.persist(&paths.top3_file).await {
                error!("Score {} for {} not saved: {}", score, username, e);
                return Err(e);
            }
        }

        if let Err(e) = state.scores.persist(&paths.score_file).await {
            error!("Score {} for {} not saved: {}", score, username, e);
            return Err(e);
        }

        Ok(if on_board {
            ScoreUpdate::TopThree
        } else {
            ScoreUpdate::PersonalBest
        })
    }

    /// True once a call to [`load_rankings`](Self::load_rankings) succeeded
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.paths.is_some()
    }

    /// Backing files updates are written to.
    ///
    /// `None` until rankings are loaded. Later load requests never change
    /// these paths.
    pub async fn paths(&self) -> Option<RankingPaths> {
        self.state.read().await.paths.clone()
    }

    /// Number of registered players
    pub async fn player_count(&self) -> usize {
        self.state.read().await.scores.len()
    }

    /// Creates empty backing files that do not exist yet.
    ///
    /// Existing files are never truncated. Returns the files that were created.
    pub async fn ensure_backing_files(
        score_file: impl AsRef<Path>,
        top3_file: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for path in [score_file.as_ref(), top3_file.as_ref()] {
            if create_if_missing(path).await? {
                info!("Created {}", path.display());
                created.push(path.to_path_buf());
            }
        }
        Ok(created)
    }
}
