//! Tower Stack replay verifier
//!
//! Re-simulates a stored replay and prints the run summary as JSON.
//! Set `RUST_LOG=debug` to trace every placement.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tower_stack::sim::{GameOverReason, GameSimulation};
use tower_stack::{Replay, Settings};

/// Re-simulate a Tower Stack replay and print its result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Replay JSON file
    replay: PathBuf,
    /// Settings JSON file (game and scoring overrides)
    settings: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    seed: u32,
    mode: &'static str,
    score: i64,
    block_count: u32,
    max_combo: u32,
    perfect_count: u32,
    game_over_reason: Option<GameOverReason>,
    final_tick: u32,
    recorded_ticks: u32,
}

fn run(replay_path: &Path, settings_path: Option<&Path>) -> Result<Summary, Box<dyn Error>> {
    let replay = Replay::from_json(&std::fs::read_to_string(replay_path)?)?;
    let settings = match settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let inputs = replay.inputs()?;
    log::info!(
        "Replaying seed {} ({}) with {} drops",
        replay.seed,
        replay.mode.as_str(),
        inputs.len()
    );
    let result = GameSimulation::simulate_game(
        replay.seed,
        &inputs,
        replay.mode,
        settings.game,
        settings.scoring,
    );
    if result.final_state.tick != replay.metadata.total_ticks {
        log::warn!(
            "Replay recorded {} ticks, re-simulation ran {}",
            replay.metadata.total_ticks,
            result.final_state.tick
        );
    }

    Ok(Summary {
        seed: replay.seed,
        mode: replay.mode.as_str(),
        score: result.score,
        block_count: result.block_count,
        max_combo: result.max_combo,
        perfect_count: result.perfect_count,
        game_over_reason: result.game_over_reason,
        final_tick: result.final_state.tick,
        recorded_ticks: replay.metadata.total_ticks,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::init();

    match run(&args.replay, args.settings.as_deref())
        .and_then(|summary| Ok(serde_json::to_string_pretty(&summary)?))
    {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Verification failed: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tower_stack::sim::DropInput;
    use tower_stack::{GameConfig, GameMode, ScoringConfig};

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_positional_paths() {
        let args = Args::try_parse_from(["tower-verify", "run.json", "tuned.json"]).unwrap();
        assert_eq!(args.replay, PathBuf::from("run.json"));
        assert_eq!(args.settings, Some(PathBuf::from("tuned.json")));

        let args = Args::try_parse_from(["tower-verify", "run.json"]).unwrap();
        assert!(args.settings.is_none());
    }

    #[test]
    fn test_help_and_missing_replay_are_not_paths() {
        let help = Args::try_parse_from(["tower-verify", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        let missing = Args::try_parse_from(["tower-verify"]).unwrap_err();
        assert_eq!(missing.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_run_summarizes_replay_file() {
        let inputs = [DropInput::at(1)];
        let config = GameConfig::default();
        let result = GameSimulation::simulate_game(
            42,
            &inputs,
            GameMode::Classic,
            config.clone(),
            ScoringConfig::default(),
        );
        let replay = Replay::record(&result, &inputs, &config).unwrap();
        let path = std::env::temp_dir().join(format!("tower-verify-{}.json", std::process::id()));
        std::fs::write(&path, replay.to_json().unwrap()).unwrap();

        let summary = run(&path, None).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(summary.score, 61);
        assert_eq!(summary.block_count, 1);
        assert_eq!(summary.final_tick, summary.recorded_ticks);
    }
}
