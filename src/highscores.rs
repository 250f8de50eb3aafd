//! Verified high score leaderboard
//!
//! Tracks the top 10 runs. A run only gets in with its replay, and only if
//! re-simulating that replay reproduces the claimed score.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{Replay, ReplayError};
use crate::settings::{GameConfig, GameMode, ScoringConfig};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single verified run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
    /// Blocks stacked on the base
    pub blocks: u32,
    pub max_combo: u32,
    pub mode: GameMode,
    pub replay: Replay,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: i64) -> bool {
        if score <= 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: i64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Verify a run by re-simulating its replay, then rank it.
    ///
    /// Returns the rank achieved, `Ok(None)` for a genuine score that doesn't
    /// make the table, or the verification error.
    pub fn submit(
        &mut self,
        name: impl Into<String>,
        claimed_score: i64,
        replay: Replay,
        config: &GameConfig,
        scoring: &ScoringConfig,
    ) -> Result<Option<usize>, ReplayError> {
        if !self.qualifies(claimed_score) {
            return Ok(None);
        }
        let result = replay.verify(claimed_score, config.clone(), scoring.clone())?;
        let entry = LeaderboardEntry {
            name: name.into(),
            score: result.score,
            blocks: result.block_count,
            max_combo: result.max_combo,
            mode: replay.mode,
            replay,
        };
        Ok(self.insert(entry))
    }

    fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        (rank <= MAX_HIGH_SCORES).then_some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load a leaderboard file; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No high scores found, starting fresh");
            return Ok(Self::new());
        }
        let board: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded {} high scores", board.entries.len());
        Ok(board)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
