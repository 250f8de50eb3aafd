//! Placement scoring and combo factors
//!
//! A perfect placement pays a flat bonus and then compounds two multipliers:
//! - stacking: `combined_perfect_multiplier ^ combo`, capped (100x default)
//! - linear: `1 + combo * (combo_step - 1)`, capped at `max_combo_multiplier`
//!
//! Milestone bonuses are added last and are never multiplied.

use super::fixed::{self, SCALE};
use crate::settings::ScoringConfig;

/// Height growth per combo step on a perfect placement (0.07)
const HEIGHT_FACTOR_STEP: i64 = 70;
const HEIGHT_FACTOR_MAX: i64 = 1900;
/// Slide speed growth per combo step past 3 (0.02)
const SPEED_FACTOR_STEP: i64 = 20;
const SPEED_FACTOR_MAX: i64 = 1300;
const SPEED_FACTOR_MIN_COMBO: u32 = 4;

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Total points for the placement
    pub points: i64,
    /// Combo after this placement
    pub combo: u32,
    /// Stacking multiplier applied (fixed-point, 1000 when not perfect)
    pub perfect_multiplier: i64,
    /// Linear combo multiplier applied (fixed-point)
    pub combo_multiplier: i64,
    pub milestone_bonus: i64,
}

/// `combined_perfect_multiplier ^ combo` by repeated fixed-point
/// multiplication, capped at `max_perfect_multiplier`
pub fn perfect_multiplier(combo: u32, scoring: &ScoringConfig) -> i64 {
    let mut mult = SCALE;
    for _ in 0..combo {
        mult = fixed::multiply(mult, scoring.combined_perfect_multiplier, SCALE);
        if mult >= scoring.max_perfect_multiplier {
            return scoring.max_perfect_multiplier;
        }
    }
    mult
}

/// Linear combo multiplier `1 + combo * (step - 1)`, capped
pub fn combo_multiplier(combo: u32, scoring: &ScoringConfig) -> i64 {
    if combo == 0 {
        return SCALE;
    }
    let step = scoring.combo_step_multiplier - SCALE;
    let mult = SCALE.saturating_add(step.saturating_mul(combo as i64));
    fixed::clamp(mult, SCALE.min(scoring.max_combo_multiplier), scoring.max_combo_multiplier)
}

/// Height multiplier for a perfect block: `min(1 + 0.07 * combo, 1.9)`
pub fn height_factor(combo: u32) -> i64 {
    (SCALE + HEIGHT_FACTOR_STEP * combo as i64).min(HEIGHT_FACTOR_MAX)
}

/// Slide speed multiplier: `min(1 + 0.02 * (combo - 3), 1.3)` from combo 4 on
pub fn speed_factor(combo: u32) -> i64 {
    if combo < SPEED_FACTOR_MIN_COMBO {
        return SCALE;
    }
    (SCALE + SPEED_FACTOR_STEP * (combo as i64 - 3)).min(SPEED_FACTOR_MAX)
}

/// Score a placement.
///
/// `angle_aligned` only matters for perfect placements in rotating mode; the
/// caller passes `false` otherwise. `stacked_after` is the stacked count once
/// the new block is on the tower.
pub fn calculate_score(
    previous_combo: u32,
    perfect: bool,
    angle_aligned: bool,
    stacked_after: u32,
    scoring: &ScoringConfig,
) -> ScoreResult {
    let mut points = scoring.base_points;

    let combo = if perfect { previous_combo.saturating_add(1) } else { 0 };

    let perfect_mult = if perfect {
        points += scoring.position_perfect_bonus;
        if angle_aligned {
            points += scoring.angle_perfect_bonus;
        }
        let mult = perfect_multiplier(combo, scoring);
        points = fixed::multiply(points, mult, SCALE);
        mult
    } else {
        SCALE
    };

    let combo_mult = combo_multiplier(combo, scoring);
    if combo > 0 {
        points = fixed::multiply(points, combo_mult, SCALE);
    }

    let milestone_bonus = scoring.milestone_bonus(stacked_after);
    points += milestone_bonus;

    log::debug!(
        "score: perfect={} combo={} perfect_mult={} combo_mult={} milestone={} -> {}",
        perfect,
        combo,
        perfect_mult,
        combo_mult,
        milestone_bonus,
        points
    );

    ScoreResult {
        points,
        combo,
        perfect_multiplier: perfect_mult,
        combo_multiplier: combo_mult,
        milestone_bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_perfect_resets_combo() {
        let scoring = ScoringConfig::default();
        let result = calculate_score(5, false, false, 3, &scoring);
        assert_eq!(result.combo, 0);
        assert_eq!(result.points, scoring.base_points);
        assert_eq!(result.perfect_multiplier, SCALE);
    }

    #[test]
    fn test_first_perfect() {
        let scoring = ScoringConfig::default();
        let result = calculate_score(0, true, false, 1, &scoring);
        assert_eq!(result.combo, 1);
        // (10 + 25) * 1.6 = 56, then * 1.1 = 61.6 -> 61
        assert_eq!(result.points, 61);
    }

    #[test]
    fn test_angle_bonus_only_with_perfect() {
        let scoring = ScoringConfig::default();
        let aligned = calculate_score(0, true, true, 1, &scoring);
        let plain = calculate_score(0, true, false, 1, &scoring);
        assert!(aligned.points > plain.points);
        let miss = calculate_score(0, false, true, 1, &scoring);
        assert_eq!(miss.points, scoring.base_points);
    }

    #[test]
    fn test_perfect_multiplier_compounds_and_caps() {
        let scoring = ScoringConfig::default();
        assert_eq!(perfect_multiplier(0, &scoring), 1000);
        assert_eq!(perfect_multiplier(1, &scoring), 1600);
        assert_eq!(perfect_multiplier(2, &scoring), 2560);
        assert_eq!(perfect_multiplier(50, &scoring), 100_000);
    }

    #[test]
    fn test_combo_multiplier_caps() {
        let scoring = ScoringConfig::default();
        assert_eq!(combo_multiplier(0, &scoring), 1000);
        assert_eq!(combo_multiplier(3, &scoring), 1300);
        assert_eq!(combo_multiplier(100, &scoring), 3000);
    }

    #[test]
    fn test_milestone_added_after_multipliers() {
        let scoring = ScoringConfig::default();
        let result = calculate_score(0, false, false, 10, &scoring);
        assert_eq!(result.points, scoring.base_points + 100);
        assert_eq!(result.milestone_bonus, 100);
    }

    #[test]
    fn test_height_and_speed_factors() {
        assert_eq!(height_factor(0), 1000);
        assert_eq!(height_factor(1), 1070);
        assert_eq!(height_factor(20), 1900);
        assert_eq!(speed_factor(3), 1000);
        assert_eq!(speed_factor(4), 1020);
        assert_eq!(speed_factor(40), 1300);
    }
}
