//! Tower Stack - deterministic core of a block-stacking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (fixed-point math, geometry, tick state machine)
//! - `persistence`: Replay codec and verifiable replay envelope
//! - `settings`: Data-driven game and scoring configuration
//! - `highscores`: Leaderboard of re-simulated runs

pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use highscores::Leaderboard;
pub use persistence::{Replay, ReplayError};
pub use settings::{GameConfig, GameMode, ScoringConfig, Settings};
pub use sim::{DropInput, GameResult, GameSimulation, GameState};

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Fixed-point position scale (1.0 == 1000)
    pub const POS_SCALE: i64 = crate::sim::fixed::SCALE;
    /// Angle scale (1° == 1000 millidegrees)
    pub const ANGLE_SCALE: i64 = 1000;
}
