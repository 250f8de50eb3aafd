//! Game and scoring configuration
//!
//! Both configs are immutable once a simulation is built. They deserialize
//! with `#[serde(default)]`, so a JSON file only needs the fields it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ANGLE_SCALE, POS_SCALE, TICK_RATE};
use crate::sim::fixed::FULL_TURN;

/// Rule set for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Axis-aligned blocks
    #[default]
    Classic,
    /// Blocks spin while sliding on X; landings clip the rotated footprint
    Rotating,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Rotating => "rotating",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "rotating" | "rotate" => Some(GameMode::Rotating),
            _ => None,
        }
    }

    /// Whether the sliding block rotates
    pub fn rotates(&self) -> bool {
        matches!(self, GameMode::Rotating)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("{field} must be {expected}, got {actual}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        actual: i64,
    },
}

/// Simulation tuning constants (fixed-point unless noted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Ticks per second
    pub tick_rate: u32,
    /// Position scale (1.0 == pos_scale)
    pub pos_scale: i64,
    /// Angle scale (1° == angle_scale)
    pub angle_scale: i64,
    pub base_width: i64,
    pub base_depth: i64,
    pub block_height: i64,
    /// Narrowest extent a landed block may keep
    pub min_width_threshold: i64,
    /// Slide range either side of the tower centre
    pub slide_bounds: i64,
    /// Distance per tick at a speed multiplier of 1.0
    pub slide_speed: i64,
    /// Speed multiplier for an empty tower
    pub slide_base_speed: i64,
    /// Multiplier growth per ln(1 + stacked blocks)
    pub slide_acceleration: i64,
    /// Optional cap on the speed multiplier
    pub slide_max_speed: Option<i64>,
    /// Rotation speed (angle units per second)
    pub rotation_speed: i64,
    /// Downward acceleration (units / s²)
    pub gravity: i64,
    /// Maximum fall speed (units / s)
    pub terminal_velocity: i64,
    pub fall_speed_multiplier: i64,
    /// Gap between the tower top and a fresh block's bottom
    pub spawn_gap: i64,
    /// Place on the drop tick instead of falling
    pub instant_place: bool,
    /// Added to the stacked count when computing slide speed
    pub speed_count_offset: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            pos_scale: POS_SCALE,
            angle_scale: ANGLE_SCALE,
            base_width: 8000,
            base_depth: 8000,
            block_height: 1000,
            min_width_threshold: 300,
            slide_bounds: 6000,
            slide_speed: 100,
            slide_base_speed: 1000,
            slide_acceleration: 150,
            slide_max_speed: Some(3000),
            rotation_speed: 90_000,
            gravity: 60_000,
            terminal_velocity: 30_000,
            fall_speed_multiplier: 1000,
            spawn_gap: 3000,
            instant_place: false,
            speed_count_offset: 0,
        }
    }
}

impl GameConfig {
    /// Parse a (partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the fixed-point tables cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |field: &'static str, ok: bool, expected: &'static str, actual: i64| {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    expected,
                    actual,
                })
            }
        };
        check("posScale", self.pos_scale == POS_SCALE, "1000", self.pos_scale)?;
        check(
            "angleScale",
            self.angle_scale.checked_mul(360) == Some(FULL_TURN),
            "1000",
            self.angle_scale,
        )?;
        check("tickRate", self.tick_rate > 0, "positive", self.tick_rate as i64)?;
        check("baseWidth", self.base_width > 0, "positive", self.base_width)?;
        check("baseDepth", self.base_depth > 0, "positive", self.base_depth)?;
        check("blockHeight", self.block_height > 0, "positive", self.block_height)?;
        check(
            "terminalVelocity",
            self.terminal_velocity > 0,
            "positive",
            self.terminal_velocity,
        )?;
        Ok(())
    }

    /// Length of one tick in fixed-point seconds
    pub fn tick_dt(&self) -> i64 {
        self.pos_scale / self.tick_rate.max(1) as i64
    }
}

/// A flat bonus paid when the stacked count reaches `blocks`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub blocks: u32,
    pub bonus: i64,
}

/// Points, perfect windows and combo multipliers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub base_points: i64,
    /// Misalignment tolerated for a perfect placement (before the 20% clamp)
    pub position_perfect_window: i64,
    /// Rotation tolerated for the angle bonus (rotating mode)
    pub angle_perfect_window: i64,
    pub position_perfect_bonus: i64,
    pub angle_perfect_bonus: i64,
    /// Per-combo stacking multiplier (fixed-point)
    pub combined_perfect_multiplier: i64,
    /// Cap on the stacked multiplier (fixed-point, 100x)
    pub max_perfect_multiplier: i64,
    /// Linear combo step (fixed-point; 1.1 adds 0.1 per combo)
    pub combo_step_multiplier: i64,
    pub max_combo_multiplier: i64,
    pub milestones: Vec<Milestone>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: 10,
            position_perfect_window: 150,
            angle_perfect_window: 3000,
            position_perfect_bonus: 25,
            angle_perfect_bonus: 15,
            combined_perfect_multiplier: 1600,
            max_perfect_multiplier: 100 * POS_SCALE,
            combo_step_multiplier: 1100,
            max_combo_multiplier: 3000,
            milestones: vec![
                Milestone { blocks: 10, bonus: 100 },
                Milestone { blocks: 25, bonus: 300 },
                Milestone { blocks: 50, bonus: 750 },
                Milestone { blocks: 100, bonus: 2000 },
            ],
        }
    }
}

impl ScoringConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Bonus for reaching exactly `stacked` blocks
    pub fn milestone_bonus(&self, stacked: u32) -> i64 {
        self.milestones
            .iter()
            .filter(|m| m.blocks == stacked)
            .map(|m| m.bonus)
            .sum()
    }
}

/// Both configs together, as stored in a settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub scoring: ScoringConfig,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.game.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip_str() {
        for mode in [GameMode::Classic, GameMode::Rotating] {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(GameMode::from_str("ROTATE"), Some(GameMode::Rotating));
        assert_eq!(GameMode::from_str("zen"), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "baseWidth": 6000, "instantPlace": true }"#).unwrap();
        assert_eq!(config.base_width, 6000);
        assert!(config.instant_place);
        assert_eq!(config.block_height, GameConfig::default().block_height);
    }

    #[test]
    fn test_validate_rejects_foreign_scale() {
        let err = GameConfig::from_json(r#"{ "posScale": 100 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "posScale", .. }));
    }

    #[test]
    fn test_validate_rejects_overflowing_angle_scale() {
        let err = GameConfig::from_json(r#"{ "angleScale": 9223372036854775807 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "angleScale", .. }));
    }

    #[test]
    fn test_tick_dt() {
        assert_eq!(GameConfig::default().tick_dt(), 16);
    }

    #[test]
    fn test_milestone_bonus_exact_match_only() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.milestone_bonus(10), 100);
        assert_eq!(scoring.milestone_bonus(11), 0);
    }

    #[test]
    fn test_settings_file_sections() {
        let settings = Settings::from_json(r#"{ "scoring": { "basePoints": 5 } }"#).unwrap();
        assert_eq!(settings.scoring.base_points, 5);
        assert_eq!(settings.game, GameConfig::default());
    }
}
