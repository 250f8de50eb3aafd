//! Game state and core simulation types
//!
//! Everything a replay needs to reproduce a run lives here. All positions and
//! sizes are fixed-point (`SCALE` = 1000), angles are millidegrees.

use serde::{Deserialize, Serialize};

use super::geometry::{self, Aabb, Point};
use crate::settings::{GameConfig, GameMode};

/// Horizontal axis a block slides along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideAxis {
    X,
    Z,
}

impl SlideAxis {
    /// Axis for the n-th dropped block (0-based, base excluded): even slides
    /// on X, odd on Z
    pub fn for_placement(index: usize) -> Self {
        if index % 2 == 0 { SlideAxis::X } else { SlideAxis::Z }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    /// Legacy rule set ended narrow landings with this; current rules report `Fall`
    Width,
    /// Dropped block missed or was trimmed below the survivable width
    Fall,
    /// Ended by the host (quit, or replay tick ceiling)
    Manual,
}

/// A placed or moving cuboid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    /// Rotation about the vertical axis (millidegrees)
    pub rotation: i64,
    /// Extent along X
    pub width: i64,
    /// Extent along Z
    pub depth: i64,
    pub height: i64,
    /// Downward speed while falling (fixed-point units per second)
    pub velocity_y: i64,
    pub is_falling: bool,
    /// Cosmetic colour index, drawn from the run RNG
    pub palette: u8,
}

impl Block {
    /// Top surface height
    #[inline]
    pub fn top(&self) -> i64 {
        self.bottom() + self.height
    }

    /// Bottom surface height
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y - self.height.div_euclid(2)
    }

    /// Axis-aligned footprint in the X/Z plane (rotation ignored)
    pub fn footprint(&self) -> Aabb {
        geometry::create_aabb(self.x, self.z, self.width, self.depth)
    }

    /// Rotated footprint corners in the X/Z plane
    pub fn rotated_footprint(&self) -> [Point; 4] {
        geometry::create_rotated_rect(self.x, self.z, self.width, self.depth, self.rotation)
    }

    /// Centre coordinate along an axis
    pub fn center_on(&self, axis: SlideAxis) -> i64 {
        match axis {
            SlideAxis::X => self.x,
            SlideAxis::Z => self.z,
        }
    }

    /// Extent along an axis
    pub fn extent_on(&self, axis: SlideAxis) -> i64 {
        match axis {
            SlideAxis::X => self.width,
            SlideAxis::Z => self.depth,
        }
    }

    /// Copy with the centre moved along an axis
    pub fn with_center_on(self, axis: SlideAxis, value: i64) -> Self {
        match axis {
            SlideAxis::X => Self { x: value, ..self },
            SlideAxis::Z => Self { z: value, ..self },
        }
    }

    /// Copy with the extent changed along an axis
    pub fn with_extent_on(self, axis: SlideAxis, value: i64) -> Self {
        match axis {
            SlideAxis::X => Self { width: value, ..self },
            SlideAxis::Z => Self { depth: value, ..self },
        }
    }

    /// Copy resting with its bottom on `surface`
    pub fn resting_on(self, surface: i64) -> Self {
        Self {
            y: surface + self.height.div_euclid(2),
            velocity_y: 0,
            is_falling: false,
            ..self
        }
    }
}

/// A piece cut off a dropped block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimPiece {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub width: i64,
    pub depth: i64,
    pub height: i64,
    /// Initial velocity (fixed-point units per second)
    pub vx: i64,
    pub vy: i64,
    pub vz: i64,
}

/// Visual record of a trim: what was dropped and what fell away
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimEffect {
    pub tick: u32,
    /// The dropped block as it landed, before trimming
    pub original: Block,
    pub trimmed_pieces: Vec<TrimPiece>,
}

/// Outcome of the most recent placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementOutcome {
    pub perfect: bool,
    pub no_trim: bool,
    pub combo_after: u32,
    /// Points awarded for this placement
    pub points: i64,
}

/// A scheduled drop: takes effect on the given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DropInput {
    pub tick: u32,
}

impl DropInput {
    pub fn at(tick: u32) -> Self {
        Self { tick }
    }
}

/// Complete game state snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Simulation tick counter
    pub tick: u32,
    pub score: i64,
    /// Consecutive perfect placements
    pub combo: u32,
    pub max_combo: u32,
    pub perfect_count: u32,
    /// Placed blocks, base first (never empty)
    pub blocks: Vec<Block>,
    /// Block currently sliding or falling
    pub current_block: Option<Block>,
    pub is_game_over: bool,
    pub game_over_reason: Option<GameOverReason>,
    /// Run seed for reproducibility
    pub seed: u32,
    pub mode: GameMode,
    /// Raw xorshift state after the last draw
    pub rng_state: u32,
    pub recent_trim_effects: Vec<TrimEffect>,
    pub last_placement: Option<PlacementOutcome>,
    /// Tick the active block was spawned on (its slide phase origin)
    #[serde(default)]
    pub spawn_tick: u32,
}

impl GameState {
    /// Topmost placed block
    pub fn top_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Blocks stacked on top of the base
    pub fn stacked_count(&self) -> usize {
        self.blocks.len().saturating_sub(1)
    }

    /// Axis the current block slides along
    pub fn active_axis(&self) -> SlideAxis {
        SlideAxis::for_placement(self.stacked_count())
    }
}

/// Base block every tower starts from
pub fn base_block(config: &GameConfig) -> Block {
    Block {
        x: 0,
        y: config.block_height.div_euclid(2),
        z: 0,
        rotation: 0,
        width: config.base_width,
        depth: config.base_depth,
        height: config.block_height,
        velocity_y: 0,
        is_falling: false,
        palette: 0,
    }
}

/// Summary of a finished (or ceiling-capped) run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub score: i64,
    /// Blocks stacked on the base
    pub block_count: u32,
    pub max_combo: u32,
    pub perfect_count: u32,
    pub game_over_reason: Option<GameOverReason>,
    pub final_state: GameState,
}

impl GameResult {
    pub fn from_state(state: GameState) -> Self {
        Self {
            score: state.score,
            block_count: state.stacked_count() as u32,
            max_combo: state.max_combo,
            perfect_count: state.perfect_count,
            game_over_reason: state.game_over_reason,
            final_state: state,
        }
    }
}
