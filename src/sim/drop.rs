//! Landing resolution: how much of a dropped block survives
//!
//! Blocks only ever slide along one axis per placement, so the overlap is
//! resolved along that axis. Rotated drops (rotating mode, X axis) clip the
//! spun footprint against the block beneath and keep the clipped bounding box.
//! Placed blocks are always axis-aligned.

use super::fixed;
use super::geometry;
use super::state::{Block, SlideAxis, TrimPiece};
use crate::settings::{GameConfig, GameMode, ScoringConfig};

/// Horizontal launch speed of a trimmed piece (units / s)
pub const TRIM_OUTWARD_SPEED: i64 = 2000;
/// Upward launch bias of a trimmed piece (units / s)
pub const TRIM_UPWARD_SPEED: i64 = 1500;

/// Fraction of the top block's extent the grace band may cover (1/5)
const GRACE_BAND_DIVISOR: i64 = 5;

/// What a landing produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Placed {
        /// The retained block, resting on the tower
        block: Block,
        perfect: bool,
        /// Rotation within the angle window (rotating mode only)
        angle_aligned: bool,
        /// Cut-off pieces; empty for perfect placements
        trimmed: Vec<TrimPiece>,
    },
    /// Not enough overlap to stay on the tower
    Missed,
}

/// Perfect-placement tolerance for a top block extent
pub fn grace_band(top_extent: i64, scoring: &ScoringConfig) -> i64 {
    scoring
        .position_perfect_window
        .min(top_extent / GRACE_BAND_DIVISOR)
        .max(0)
}

/// Resolve a landed block against the top of the tower.
///
/// `dropped` must already rest on `top`'s surface.
pub fn calculate_drop(
    dropped: &Block,
    top: &Block,
    axis: SlideAxis,
    mode: GameMode,
    config: &GameConfig,
    scoring: &ScoringConfig,
) -> DropOutcome {
    let top_center = top.center_on(axis);
    let misalignment = (dropped.center_on(axis) - top_center).abs();
    let angle_aligned = mode.rotates()
        && fixed::signed_angle(dropped.rotation).abs() <= scoring.angle_perfect_window;

    if misalignment <= grace_band(top.extent_on(axis), scoring) {
        let block = Block {
            rotation: 0,
            ..dropped.with_center_on(axis, top_center)
        };
        return DropOutcome::Placed {
            block,
            perfect: true,
            angle_aligned,
            trimmed: Vec::new(),
        };
    }

    let rotated = mode.rotates() && axis == SlideAxis::X && fixed::normalize_angle(dropped.rotation) != 0;
    let span = if rotated {
        rotated_overlap(dropped, top)
    } else {
        axis_overlap(dropped, top, axis)
    };

    let Some((lo, hi)) = span else {
        return DropOutcome::Missed;
    };
    let extent = hi - lo;
    if extent <= 0 || extent < config.min_width_threshold {
        return DropOutcome::Missed;
    }

    let block = Block {
        rotation: 0,
        ..dropped
            .with_center_on(axis, (lo + hi).div_euclid(2))
            .with_extent_on(axis, extent)
    };
    DropOutcome::Placed {
        block,
        perfect: false,
        angle_aligned,
        trimmed: trim_pieces(dropped, axis, lo, hi),
    }
}

/// `[min, max)` of a block along an axis (rotation ignored)
fn axis_span(block: &Block, axis: SlideAxis) -> (i64, i64) {
    let extent = block.extent_on(axis);
    let lo = block.center_on(axis) - extent.div_euclid(2);
    (lo, lo + extent)
}

fn axis_overlap(dropped: &Block, top: &Block, axis: SlideAxis) -> Option<(i64, i64)> {
    let a = dropped.footprint();
    let b = top.footprint();
    let overlap = geometry::aabb_intersection(&a, &b)?;
    Some(match axis {
        SlideAxis::X => (overlap.min.x, overlap.max.x),
        SlideAxis::Z => (overlap.min.y, overlap.max.y),
    })
}

/// X span of the rotated footprint clipped to the top block.
///
/// The span is clamped to the dropped block's own width, since a spun
/// rectangle's bounding box can be wider than the rectangle.
fn rotated_overlap(dropped: &Block, top: &Block) -> Option<(i64, i64)> {
    let reach = geometry::bounding_radius(dropped.width, dropped.depth)
        + geometry::bounding_radius(top.width, top.depth);
    let centers = geometry::distance(
        geometry::Point::new(dropped.x, dropped.z),
        geometry::Point::new(top.x, top.z),
    );
    if centers > reach {
        return None;
    }

    let clipped = geometry::clip_polygon_to_aabb(&dropped.rotated_footprint(), &top.footprint());
    if geometry::polygon_area(&clipped) == 0 {
        return None;
    }
    let bounds = geometry::polygon_bounds(&clipped)?;
    let (mut lo, mut hi) = (bounds.min.x, bounds.max.x);
    if hi - lo > dropped.width {
        let center = (lo + hi).div_euclid(2);
        lo = center - dropped.width.div_euclid(2);
        hi = lo + dropped.width;
    }
    Some((lo, hi))
}

/// Pieces of `dropped` outside `[lo, hi]` along `axis`
fn trim_pieces(dropped: &Block, axis: SlideAxis, lo: i64, hi: i64) -> Vec<TrimPiece> {
    let (d_lo, d_hi) = axis_span(dropped, axis);
    let mut pieces = Vec::with_capacity(2);

    let mut push = |start: i64, end: i64, direction: i64| {
        if end <= start {
            return;
        }
        let center = (start + end).div_euclid(2);
        let size = end - start;
        let (x, z, width, depth, vx, vz) = match axis {
            SlideAxis::X => (
                center,
                dropped.z,
                size,
                dropped.depth,
                direction * TRIM_OUTWARD_SPEED,
                0,
            ),
            SlideAxis::Z => (
                dropped.x,
                center,
                dropped.width,
                size,
                0,
                direction * TRIM_OUTWARD_SPEED,
            ),
        };
        pieces.push(TrimPiece {
            x,
            y: dropped.y,
            z,
            width,
            depth,
            height: dropped.height,
            vx,
            vy: TRIM_UPWARD_SPEED,
            vz,
        });
    };

    push(d_lo, lo.min(d_hi), -1);
    push(hi.max(d_lo), d_hi, 1);
    pieces
}

/// The whole block as a single piece, for a landing that missed the tower
pub fn miss_piece(dropped: &Block) -> TrimPiece {
    TrimPiece {
        x: dropped.x,
        y: dropped.y,
        z: dropped.z,
        width: dropped.width,
        depth: dropped.depth,
        height: dropped.height,
        vx: 0,
        vy: 0,
        vz: 0,
    }
}
