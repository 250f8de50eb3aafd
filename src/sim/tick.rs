//! Fixed timestep simulation tick
//!
//! `GameSimulation` advances a `GameState` snapshot one tick at a time. Every
//! step returns a fresh snapshot; the only state kept between calls is the
//! small `Bridge` below (last produced tick and same-tick landing marker),
//! which a host never sees. Everything motion depends on, including the
//! active block's spawn tick, lives in the snapshot, so a deserialized
//! `GameState` resumes exactly.
//!
//! Order of work inside a tick:
//! 1. game over short-circuits
//! 2. tick counter advances
//! 3. a drop scheduled for this tick starts the fall (or places at once)
//! 4. the active block slides, spins or falls
//! 5. stale trim effects expire
//! 6. a landing detected in step 4 is finalised

use std::collections::BTreeSet;

use super::drop::{self, DropOutcome};
use super::fixed::{self, SCALE};
use super::motion::{self, Tuning};
use super::rng::Xorshift32;
use super::scoring;
use super::state::{
    base_block, Block, DropInput, GameOverReason, GameResult, GameState, PlacementOutcome,
    SlideAxis, TrimEffect,
};
use crate::settings::{GameConfig, GameMode, ScoringConfig};

/// Tick ceiling for batch replays (60 s at 60 Hz)
pub const MAX_SIMULATION_TICKS: u32 = 3600;
/// Trim effects older than this many ticks are pruned
pub const TRIM_EFFECT_TTL: u32 = 60;

/// Observability sink for simulation events.
///
/// Observers see results after they are computed and cannot change them.
pub trait SimObserver: Send {
    fn on_spawn(&mut self, _tick: u32, _block: &Block) {}
    fn on_placement(&mut self, _tick: u32, _block: &Block, _outcome: &PlacementOutcome) {}
    fn on_game_over(&mut self, _tick: u32, _reason: GameOverReason, _score: i64) {}
}

/// Default sink: ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimObserver for NullObserver {}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SimObserver for LogObserver {
    fn on_spawn(&mut self, tick: u32, block: &Block) {
        log::debug!("tick {}: spawned block at ({}, {}, {})", tick, block.x, block.y, block.z);
    }

    fn on_placement(&mut self, tick: u32, block: &Block, outcome: &PlacementOutcome) {
        log::debug!(
            "tick {}: placed {}x{} perfect={} combo={} +{}",
            tick,
            block.width,
            block.depth,
            outcome.perfect,
            outcome.combo_after,
            outcome.points
        );
    }

    fn on_game_over(&mut self, tick: u32, reason: GameOverReason, score: i64) {
        log::info!("Game over at tick {}: {:?}, score {}", tick, reason, score);
    }
}

/// Cross-tick bookkeeping that is not part of `GameState`
#[derive(Debug, Clone, Default)]
struct Bridge {
    /// Tick of the last snapshot this simulation produced
    last_tick: Option<u32>,
    /// Block that touched down during the current tick
    landed: Option<Block>,
}

impl Bridge {
    fn reset(&mut self, tick: u32) {
        self.last_tick = Some(tick);
        self.landed = None;
    }

    /// Re-anchor when handed a snapshot this simulation did not just produce
    fn sync(&mut self, tick: u32) {
        if self.last_tick != Some(tick) {
            log::debug!(
                "Resuming from foreign snapshot (last tick {:?}, got {})",
                self.last_tick,
                tick
            );
            self.reset(tick);
        }
    }
}

/// Deterministic tower simulation for one run
pub struct GameSimulation {
    seed: u32,
    mode: GameMode,
    config: GameConfig,
    scoring: ScoringConfig,
    tuning: Tuning,
    bridge: Bridge,
    observer: Box<dyn SimObserver>,
}

impl GameSimulation {
    /// Simulation with default configs
    pub fn new(seed: u32, mode: GameMode) -> Self {
        Self::with_config(seed, mode, GameConfig::default(), ScoringConfig::default())
    }

    pub fn with_config(seed: u32, mode: GameMode, config: GameConfig, scoring: ScoringConfig) -> Self {
        Self {
            seed,
            mode,
            tuning: Tuning::from_config(&config),
            config,
            scoring,
            bridge: Bridge::default(),
            observer: Box::new(NullObserver),
        }
    }

    /// Replace the event sink
    pub fn with_observer(mut self, observer: impl SimObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn set_slide_speed(&mut self, speed: i64) {
        self.tuning.slide_speed = speed;
    }

    pub fn set_slide_acceleration(&mut self, acceleration: i64) {
        self.tuning.slide_acceleration = acceleration;
    }

    pub fn set_slide_max_speed(&mut self, max: Option<i64>) {
        self.tuning.slide_max_speed = max;
    }

    pub fn set_slide_bounds(&mut self, bounds: i64) {
        self.tuning.slide_bounds = bounds;
    }

    pub fn set_fall_speed_multiplier(&mut self, multiplier: i64) {
        self.tuning.fall_speed_multiplier = multiplier;
    }

    pub fn set_instant_place(&mut self, enabled: bool) {
        self.tuning.instant_place = enabled;
    }

    pub fn set_speed_count_offset(&mut self, offset: u32) {
        self.tuning.speed_count_offset = offset;
    }

    /// Tick 0: the base block plus the first sliding block
    pub fn create_initial_state(&mut self) -> GameState {
        let base = base_block(&self.config);
        let mut rng = Xorshift32::new(self.seed);
        let first = motion::spawn_block(&base, 0, 0, &self.config, &self.tuning, &mut rng);

        self.bridge.reset(0);
        self.observer.on_spawn(0, &first);

        GameState {
            tick: 0,
            score: 0,
            combo: 0,
            max_combo: 0,
            perfect_count: 0,
            blocks: vec![base],
            current_block: Some(first),
            is_game_over: false,
            game_over_reason: None,
            seed: self.seed,
            mode: self.mode,
            rng_state: rng.state(),
            recent_trim_effects: Vec::new(),
            last_placement: None,
            spawn_tick: 0,
        }
    }

    /// Advance one tick. `input` takes effect only if scheduled for the new tick.
    pub fn step_simulation(&mut self, state: &GameState, input: Option<DropInput>) -> GameState {
        if state.is_game_over {
            return state.clone();
        }
        self.bridge.sync(state.tick);

        let mut next = state.clone();
        next.tick = next.tick.saturating_add(1);
        self.bridge.last_tick = Some(next.tick);

        let dropping = input.is_some_and(|i| i.tick == next.tick);
        if dropping {
            if let Some(block) = next.current_block.filter(|b| !b.is_falling) {
                if self.tuning.instant_place {
                    let surface = next.top_block().map_or(0, Block::top);
                    self.finalize_placement(&mut next, block.resting_on(surface));
                } else {
                    next.current_block = Some(Block {
                        is_falling: true,
                        velocity_y: 0,
                        ..block
                    });
                }
                return next;
            }
        }

        if let Some(block) = next.current_block {
            next.current_block = Some(if block.is_falling {
                self.fall(&next, block)
            } else {
                self.slide(&next, block)
            });
        }

        let tick = next.tick;
        next.recent_trim_effects
            .retain(|effect| tick.saturating_sub(effect.tick) <= TRIM_EFFECT_TTL);

        if let Some(landed) = self.bridge.landed.take() {
            self.finalize_placement(&mut next, landed);
        }
        next
    }

    /// End the run on the host's behalf
    pub fn end_run(&mut self, state: &GameState) -> GameState {
        if state.is_game_over {
            return state.clone();
        }
        let mut next = state.clone();
        self.game_over(&mut next, GameOverReason::Manual);
        next
    }

    /// Replay `inputs` from `seed` until game over or the tick ceiling.
    ///
    /// A run still alive at the ceiling is ended with `Manual`.
    pub fn simulate_game(
        seed: u32,
        inputs: &[DropInput],
        mode: GameMode,
        config: GameConfig,
        scoring: ScoringConfig,
    ) -> GameResult {
        let mut sim = Self::with_config(seed, mode, config, scoring);
        let drop_ticks: BTreeSet<u32> = inputs.iter().map(|i| i.tick).collect();

        let mut state = sim.create_initial_state();
        while !state.is_game_over && state.tick < MAX_SIMULATION_TICKS {
            let upcoming = state.tick + 1;
            let input = drop_ticks.contains(&upcoming).then(|| DropInput::at(upcoming));
            state = sim.step_simulation(&state, input);
        }
        if !state.is_game_over {
            state = sim.end_run(&state);
        }
        GameResult::from_state(state)
    }

    fn slide(&self, state: &GameState, block: Block) -> Block {
        let axis = state.active_axis();
        let stacked = state.stacked_count() as u32;
        let elapsed = state.tick.saturating_sub(state.spawn_tick);
        let center = state.top_block().map_or(0, |top| top.center_on(axis));

        let position =
            motion::calculate_slide_position(center, elapsed, stacked, state.combo, &self.tuning);
        let rotation = if self.mode.rotates() && axis == SlideAxis::X {
            motion::calculate_rotation(elapsed, &self.config)
        } else {
            0
        };
        Block {
            rotation,
            ..block.with_center_on(axis, position)
        }
    }

    fn fall(&mut self, state: &GameState, block: Block) -> Block {
        let fallen = motion::integrate_fall(block, &self.config, &self.tuning);
        match state.top_block() {
            Some(top) if fallen.bottom() <= top.top() => {
                let landed = fallen.resting_on(top.top());
                self.bridge.landed = Some(landed);
                landed
            }
            _ => fallen,
        }
    }

    fn finalize_placement(&mut self, state: &mut GameState, landed: Block) {
        let Some(top) = state.top_block().copied() else {
            state.current_block = None;
            return;
        };
        let axis = state.active_axis();

        let (block, perfect, angle_aligned, trimmed) =
            match drop::calculate_drop(&landed, &top, axis, self.mode, &self.config, &self.scoring) {
                DropOutcome::Placed {
                    block,
                    perfect,
                    angle_aligned,
                    trimmed,
                } => (block, perfect, angle_aligned, trimmed),
                DropOutcome::Missed => {
                    state.recent_trim_effects.push(TrimEffect {
                        tick: state.tick,
                        original: landed,
                        trimmed_pieces: vec![drop::miss_piece(&landed)],
                    });
                    self.game_over(state, GameOverReason::Fall);
                    return;
                }
            };

        let stacked_after = state.stacked_count() as u32 + 1;
        let result = scoring::calculate_score(
            state.combo,
            perfect,
            angle_aligned,
            stacked_after,
            &self.scoring,
        );

        let block = if perfect {
            let height = fixed::multiply(block.height, scoring::height_factor(result.combo), SCALE);
            Block { height, ..block }.resting_on(top.top())
        } else {
            block
        };

        let no_trim = trimmed.is_empty();
        if !no_trim {
            state.recent_trim_effects.push(TrimEffect {
                tick: state.tick,
                original: landed,
                trimmed_pieces: trimmed,
            });
        }

        let outcome = PlacementOutcome {
            perfect,
            no_trim,
            combo_after: result.combo,
            points: result.points,
        };
        state.score = state.score.saturating_add(result.points);
        state.combo = result.combo;
        state.max_combo = state.max_combo.max(result.combo);
        if perfect {
            state.perfect_count += 1;
        }
        state.blocks.push(block);
        state.last_placement = Some(outcome);
        self.observer.on_placement(state.tick, &block, &outcome);

        let mut rng = Xorshift32::from_state(state.rng_state);
        let spawned = motion::spawn_block(
            &block,
            stacked_after,
            state.combo,
            &self.config,
            &self.tuning,
            &mut rng,
        );
        state.rng_state = rng.state();
        state.current_block = Some(spawned);
        state.spawn_tick = state.tick;
        self.observer.on_spawn(state.tick, &spawned);
    }

    fn game_over(&mut self, state: &mut GameState, reason: GameOverReason) {
        state.is_game_over = true;
        state.game_over_reason = Some(reason);
        state.current_block = None;
        self.bridge.landed = None;
        self.observer.on_game_over(state.tick, reason, state.score);
    }
}
