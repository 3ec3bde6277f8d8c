//! # Ranking Server Library
//!
//! This library provides the persistent ranking subsystem used by the game
//! server. It tracks the best score every registered player has ever reached
//! and maintains a live top-3 leaderboard derived from those scores.
//!
//! ## Core Responsibilities
//!
//! ### Best Scores
//! Every username that has been looked up has exactly one best score. Scores
//! only ever move up; a submission that does not beat the stored value is
//! ignored. Looking up an unknown player registers them with a score of zero.
//!
//! ### Leaderboard
//! The leaderboard always has exactly three slots, highest score first. Slots
//! no player has reached yet hold the `empty` placeholder with a score of
//! zero. A new score enters the board only if it is strictly higher than the
//! lowest tracked score.
//!
//! ### Persistence
//! Both data sets are stored as `username=score` text files: one holding
//! every player, one holding the players currently on the leaderboard. Each
//! change rewrites the affected files in full.
//!
//! ## Module Organization
//!
//! ### Score Store (`score_store`)
//! The in-memory username to best score map and its backing file.
//!
//! ### Leaderboard (`leaderboard`)
//! The fixed three-slot board, its ordering rules and its snapshot file.
//!
//! ### Ranking Service (`ranking_service`)
//! The single entry point game sessions use. Owns both of the above behind
//! one lock so that concurrent sessions never observe a half-applied update.
//!
//! ### Storage (`storage`)
//! Whole-file reads and writes shared by the two backing files.
//!
//! ## Concurrency
//!
//! Any number of session tasks may share one [`RankingService`]. Score
//! submissions and the initial load are serialized behind an exclusive lock
//! held until the backing files are written; queries share a read lock.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::RankingService;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rankings = Arc::new(RankingService::new());
//!     rankings.load_rankings("ranking.data", "top3.data").await?;
//!
//!     // Each game session reports its final score
//!     let session = {
//!         let rankings = Arc::clone(&rankings);
//!         tokio::spawn(async move { rankings.refresh_user_highscore("alice", 50).await })
//!     };
//!     session.await??;
//!
//!     for entry in rankings.get_top3().await {
//!         println!("{} : {}", entry.username, entry.score);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod leaderboard;
pub mod ranking_service;
pub mod score_store;
pub mod storage;

pub use error::{RankingError, Result};
pub use leaderboard::LeaderboardTracker;
pub use ranking_service::{RankingPaths, RankingService, ScoreUpdate};
pub use score_store::ScoreStore;
