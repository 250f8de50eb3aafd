//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed-point integers only, no floats
//! - Seeded xorshift RNG only
//! - One `step_simulation` call per tick, in order
//! - No rendering or platform dependencies

pub mod drop;
pub mod fixed;
pub mod geometry;
pub mod motion;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod tick;

pub use drop::{DropOutcome, calculate_drop};
pub use geometry::{Aabb, Point, clip_polygon_to_aabb};
pub use motion::{Tuning, calculate_slide_position};
pub use rng::Xorshift32;
pub use scoring::{ScoreResult, calculate_score};
pub use state::{
    Block, DropInput, GameOverReason, GameResult, GameState, PlacementOutcome, SlideAxis,
    TrimEffect, TrimPiece,
};
pub use tick::{GameSimulation, LogObserver, MAX_SIMULATION_TICKS, NullObserver, SimObserver};
