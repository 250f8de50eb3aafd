//! Block motion: slide oscillation, spin, and falling physics
//!
//! Slide position is a pure function of the ticks elapsed since spawn, so a
//! block's position on any tick can be recomputed from scratch without
//! accumulating rounding error.

use super::fixed::{self, SCALE};
use super::rng::Xorshift32;
use super::scoring;
use super::state::{Block, SlideAxis};
use crate::settings::GameConfig;

/// Number of cosmetic palette entries a block can draw
pub const PALETTE_SIZE: i64 = 12;

/// Live-adjustable motion knobs, seeded from `GameConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    pub slide_speed: i64,
    pub slide_base_speed: i64,
    pub slide_acceleration: i64,
    pub slide_max_speed: Option<i64>,
    pub slide_bounds: i64,
    pub fall_speed_multiplier: i64,
    pub instant_place: bool,
    pub speed_count_offset: u32,
}

impl Tuning {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            slide_speed: config.slide_speed,
            slide_base_speed: config.slide_base_speed,
            slide_acceleration: config.slide_acceleration,
            slide_max_speed: config.slide_max_speed,
            slide_bounds: config.slide_bounds,
            fall_speed_multiplier: config.fall_speed_multiplier,
            instant_place: config.instant_place,
            speed_count_offset: config.speed_count_offset,
        }
    }
}

/// Slide speed multiplier: `base + accel * ln(1 + count)`, scaled by the combo
/// speed factor and clamped to the optional maximum
pub fn speed_multiplier(count: u32, combo: u32, tuning: &Tuning) -> i64 {
    let log_term = fixed::ln(SCALE * (1 + count as i64), SCALE);
    let mut mult = tuning.slide_base_speed + fixed::multiply(tuning.slide_acceleration, log_term, SCALE);
    mult = fixed::multiply(mult, scoring::speed_factor(combo), SCALE);
    if let Some(max) = tuning.slide_max_speed {
        mult = mult.min(max);
    }
    mult.max(0)
}

/// Position along the slide axis after `elapsed` ticks.
///
/// Ping-pongs between `center ± slide_bounds`. The first block (nothing
/// stacked yet) starts centred heading outward; later blocks start at
/// `-bounds` when `stacked % 4 < 2`, otherwise at `+bounds`.
pub fn calculate_slide_position(
    center: i64,
    elapsed: u32,
    stacked: u32,
    combo: u32,
    tuning: &Tuning,
) -> i64 {
    let bounds = tuning.slide_bounds.max(0);
    if bounds == 0 {
        return center;
    }
    let span = 2 * bounds;
    let cycle = 2 * span;

    let start_phase = if stacked == 0 {
        bounds
    } else if stacked % 4 < 2 {
        0
    } else {
        span
    };

    let count = stacked.saturating_add(tuning.speed_count_offset);
    let per_tick = fixed::multiply(tuning.slide_speed, speed_multiplier(count, combo, tuning), SCALE);
    let travel = per_tick.saturating_mul(elapsed as i64).rem_euclid(cycle);
    let phase = (start_phase + travel) % cycle;

    // Rising half then falling half of a triangle wave over [-bounds, bounds]
    let t = if phase < span { phase } else { cycle - phase };
    center + fixed::lerp(-bounds, bounds, t, span)
}

/// Spin angle after `elapsed` ticks (millidegrees, normalized)
pub fn calculate_rotation(elapsed: u32, config: &GameConfig) -> i64 {
    let per_tick = config.rotation_speed / config.tick_rate.max(1) as i64;
    fixed::normalize_angle(per_tick.saturating_mul(elapsed as i64))
}

/// One tick of gravity for a falling block
pub fn integrate_fall(block: Block, config: &GameConfig, tuning: &Tuning) -> Block {
    let dt = config.tick_dt();
    let accel = fixed::multiply(
        fixed::multiply(config.gravity, dt, SCALE),
        tuning.fall_speed_multiplier,
        SCALE,
    );
    let terminal = config.terminal_velocity.abs();
    let velocity_y = fixed::clamp(block.velocity_y.saturating_add(accel), -terminal, terminal);
    Block {
        y: block.y - fixed::multiply(velocity_y, dt, SCALE),
        velocity_y,
        ..block
    }
}

/// A fresh sliding block above `top`, at its starting slide position
pub fn spawn_block(
    top: &Block,
    stacked: u32,
    combo: u32,
    config: &GameConfig,
    tuning: &Tuning,
    rng: &mut Xorshift32,
) -> Block {
    let axis = SlideAxis::for_placement(stacked as usize);
    let height = config.block_height;
    let block = Block {
        x: top.x,
        y: top.top() + config.spawn_gap + height.div_euclid(2),
        z: top.z,
        rotation: 0,
        width: top.width,
        depth: top.depth,
        height,
        velocity_y: 0,
        is_falling: false,
        palette: rng.range(0, PALETTE_SIZE) as u8,
    };
    let start = calculate_slide_position(top.center_on(axis), 0, stacked, combo, tuning);
    block.with_center_on(axis, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::base_block;
    use proptest::prelude::*;

    fn tuning() -> Tuning {
        Tuning::from_config(&GameConfig::default())
    }

    #[test]
    fn test_first_block_starts_centered_and_moves_out() {
        let t = tuning();
        assert_eq!(calculate_slide_position(0, 0, 0, 0, &t), 0);
        assert!(calculate_slide_position(0, 1, 0, 0, &t) > 0);
    }

    #[test]
    fn test_later_blocks_start_at_alternating_bounds() {
        let t = tuning();
        assert_eq!(calculate_slide_position(0, 0, 1, 0, &t), -6000);
        assert_eq!(calculate_slide_position(0, 0, 2, 0, &t), 6000);
        assert_eq!(calculate_slide_position(0, 0, 3, 0, &t), 6000);
        assert_eq!(calculate_slide_position(0, 0, 4, 0, &t), -6000);
    }

    #[test]
    fn test_speed_offset_leaves_start_phase_alone() {
        let offset = Tuning {
            speed_count_offset: 5,
            ..tuning()
        };
        assert_eq!(calculate_slide_position(0, 0, 0, 0, &offset), 0);
        assert_eq!(calculate_slide_position(0, 0, 1, 0, &offset), -6000);
        assert_eq!(calculate_slide_position(0, 0, 2, 0, &offset), 6000);
        // but it does speed the block up
        assert!(calculate_slide_position(0, 1, 0, 0, &offset) > calculate_slide_position(0, 1, 0, 0, &tuning()));
    }

    #[test]
    fn test_slide_is_relative_to_center() {
        let t = tuning();
        assert_eq!(calculate_slide_position(1500, 0, 0, 0, &t), 1500);
        assert_eq!(calculate_slide_position(1500, 0, 1, 0, &t), -4500);
    }

    #[test]
    fn test_slide_reverses_at_bounds() {
        let t = tuning();
        // 100 per tick at multiplier 1.0; 60 ticks from centre reaches +6000
        assert_eq!(calculate_slide_position(0, 60, 0, 0, &t), 6000);
        assert_eq!(calculate_slide_position(0, 61, 0, 0, &t), 5900);
    }

    #[test]
    fn test_speed_grows_with_stack_and_caps() {
        let t = tuning();
        assert_eq!(speed_multiplier(0, 0, &t), 1000);
        assert!(speed_multiplier(10, 0, &t) > speed_multiplier(1, 0, &t));
        let capped = Tuning {
            slide_max_speed: Some(1100),
            ..tuning()
        };
        assert_eq!(speed_multiplier(1000, 0, &capped), 1100);
    }

    #[test]
    fn test_speed_factor_applies_from_combo_four() {
        let t = tuning();
        assert_eq!(speed_multiplier(0, 3, &t), 1000);
        assert_eq!(speed_multiplier(0, 4, &t), 1020);
    }

    #[test]
    fn test_rotation_wraps() {
        let config = GameConfig::default();
        assert_eq!(calculate_rotation(0, &config), 0);
        assert_eq!(calculate_rotation(1, &config), 1500);
        assert_eq!(calculate_rotation(240, &config), 0);
    }

    #[test]
    fn test_fall_accelerates_to_terminal() {
        let config = GameConfig::default();
        let t = tuning();
        let mut block = Block {
            is_falling: true,
            y: 100_000,
            ..base_block(&config)
        };
        let start_y = block.y;
        block = integrate_fall(block, &config, &t);
        assert_eq!(block.velocity_y, 960);
        assert!(block.y < start_y);
        for _ in 0..200 {
            block = integrate_fall(block, &config, &t);
        }
        assert_eq!(block.velocity_y, config.terminal_velocity);
    }

    #[test]
    fn test_spawn_block_inherits_top_footprint() {
        let config = GameConfig::default();
        let t = tuning();
        let top = Block {
            width: 5000,
            depth: 7000,
            x: 300,
            ..base_block(&config)
        };
        let mut rng = Xorshift32::new(7);
        let spawned = spawn_block(&top, 1, 0, &config, &t, &mut rng);
        assert_eq!(spawned.width, 5000);
        assert_eq!(spawned.depth, 7000);
        // stacked=1 slides on Z, starting at -bounds
        assert_eq!(spawned.x, 300);
        assert_eq!(spawned.z, -6000);
        assert_eq!(spawned.bottom(), top.top() + config.spawn_gap);
        assert!((spawned.palette as i64) < PALETTE_SIZE);
    }

    proptest! {
        #[test]
        fn prop_slide_stays_within_bounds(
            elapsed in 0u32..100_000,
            stacked in 0u32..200,
            combo in 0u32..50,
        ) {
            let t = tuning();
            let p = calculate_slide_position(0, elapsed, stacked, combo, &t);
            prop_assert!((-6000..=6000).contains(&p));
        }
    }
}
