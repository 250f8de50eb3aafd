//! Drop input codec
//!
//! Ticks are delta-encoded (first tick, then gaps), packed as u32
//! little-endian, zlib-compressed at the best level and base64 encoded.
//! Deltas wrap, so any tick sequence round-trips, sorted or not.

use std::io::{Read, Write};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::ReplayError;
use crate::sim::DropInput;

/// Encode a drop schedule as a base64 string
pub fn compress_inputs(inputs: &[DropInput]) -> Result<String, ReplayError> {
    let mut raw = Vec::with_capacity(inputs.len() * 4);
    let mut previous = 0u32;
    for input in inputs {
        raw.extend_from_slice(&input.tick.wrapping_sub(previous).to_le_bytes());
        previous = input.tick;
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&raw).map_err(ReplayError::Deflate)?;
    let compressed = encoder.finish().map_err(ReplayError::Deflate)?;
    Ok(STANDARD.encode(compressed))
}

/// Decode a string produced by [`compress_inputs`]
pub fn decompress_inputs(encoded: &str) -> Result<Vec<DropInput>, ReplayError> {
    let compressed = STANDARD.decode(encoded.trim())?;

    let mut raw = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut raw)
        .map_err(ReplayError::Inflate)?;
    if raw.len() % 4 != 0 {
        return Err(ReplayError::Truncated(raw.len()));
    }

    let mut tick = 0u32;
    Ok(raw
        .chunks_exact(4)
        .map(|chunk| {
            let delta = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            tick = tick.wrapping_add(delta);
            DropInput::at(tick)
        })
        .collect())
}
