//! Replay persistence
//!
//! Features:
//! - Compact input codec (delta ticks, u32 LE, zlib, base64)
//! - JSON replay envelope (seed, mode, encoded inputs, metadata)
//! - Verification by re-simulation

pub mod codec;
pub mod envelope;

pub use codec::{compress_inputs, decompress_inputs};
pub use envelope::{Replay, ReplayMetadata};

use thiserror::Error;

/// Anything that can go wrong reading, writing or checking a replay
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to compress inputs: {0}")]
    Deflate(#[source] std::io::Error),
    #[error("corrupt deflate stream: {0}")]
    Inflate(#[source] std::io::Error),
    #[error("input payload is {0} bytes, not a multiple of 4")]
    Truncated(usize),
    #[error("invalid replay json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("replay file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata lists {expected} inputs but the payload holds {actual}")]
    InputCountMismatch { expected: u32, actual: usize },
    #[error("claimed score {claimed} but re-simulation scored {actual}")]
    ScoreMismatch { claimed: i64, actual: i64 },
}
