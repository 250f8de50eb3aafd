//! Replay envelope
//!
//! `(seed, mode, inputs)` is enough to reproduce a run exactly; the metadata
//! lets a reader sanity-check the payload before re-simulating it.

use serde::{Deserialize, Serialize};

use super::ReplayError;
use super::codec;
use crate::settings::{GameConfig, GameMode, ScoringConfig};
use crate::sim::{DropInput, GameResult, GameSimulation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetadata {
    pub tick_rate: u32,
    /// Tick the recorded run ended on
    pub total_ticks: u32,
    pub input_count: u32,
}

/// A stored run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u32,
    pub mode: GameMode,
    /// Encoded drop schedule (see [`codec::compress_inputs`])
    pub inputs: String,
    pub metadata: ReplayMetadata,
}

impl Replay {
    pub fn new(
        seed: u32,
        mode: GameMode,
        inputs: &[DropInput],
        tick_rate: u32,
        total_ticks: u32,
    ) -> Result<Self, ReplayError> {
        Ok(Self {
            seed,
            mode,
            inputs: codec::compress_inputs(inputs)?,
            metadata: ReplayMetadata {
                tick_rate,
                total_ticks,
                input_count: inputs.len() as u32,
            },
        })
    }

    /// Capture a finished run together with the inputs that drove it
    pub fn record(
        result: &GameResult,
        inputs: &[DropInput],
        config: &GameConfig,
    ) -> Result<Self, ReplayError> {
        let state = &result.final_state;
        Self::new(state.seed, state.mode, inputs, config.tick_rate, state.tick)
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decoded drop schedule, checked against the metadata count
    pub fn inputs(&self) -> Result<Vec<DropInput>, ReplayError> {
        let inputs = codec::decompress_inputs(&self.inputs)?;
        if inputs.len() != self.metadata.input_count as usize {
            return Err(ReplayError::InputCountMismatch {
                expected: self.metadata.input_count,
                actual: inputs.len(),
            });
        }
        Ok(inputs)
    }

    /// Re-run the replay from scratch
    pub fn simulate(
        &self,
        config: GameConfig,
        scoring: ScoringConfig,
    ) -> Result<GameResult, ReplayError> {
        let inputs = self.inputs()?;
        Ok(GameSimulation::simulate_game(
            self.seed, &inputs, self.mode, config, scoring,
        ))
    }

    /// Re-run the replay and require it to reproduce `claimed_score`
    pub fn verify(
        &self,
        claimed_score: i64,
        config: GameConfig,
        scoring: ScoringConfig,
    ) -> Result<GameResult, ReplayError> {
        let result = self.simulate(config, scoring)?;
        if result.score != claimed_score {
            log::warn!(
                "Replay (seed {}) claimed {} but scored {}",
                self.seed,
                claimed_score,
                result.score
            );
            return Err(ReplayError::ScoreMismatch {
                claimed: claimed_score,
                actual: result.score,
            });
        }
        log::info!(
            "Verified replay: seed {}, {} blocks, score {}",
            self.seed,
            result.block_count,
            result.score
        );
        Ok(result)
    }
}
