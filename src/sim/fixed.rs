//! Fixed-point arithmetic
//!
//! Every game-significant quantity is an `i64` scaled by [`SCALE`] (three
//! decimal digits). Angles are millidegrees. Nothing here touches the host FPU,
//! so identical integer input gives bit-identical output on every platform.
//!
//! Intermediate products go through `i128` and results saturate to the `i64`
//! range, which keeps every function total.

use std::sync::LazyLock;

/// Default fixed-point scale (1.0 == 1000)
pub const SCALE: i64 = 1000;

/// Millidegrees in a full turn
pub const FULL_TURN: i64 = 360_000;
/// Millidegrees in a quarter turn
pub const QUARTER_TURN: i64 = 90_000;
const HALF_TURN: i64 = 180_000;

/// Sine table entries (0.1° resolution)
const TABLE_SIZE: usize = 3600;
/// Millidegrees covered by one table entry
const TABLE_STEP: i64 = FULL_TURN / TABLE_SIZE as i64;

/// Fractional bits used while building the sine table and evaluating `ln`
const Q: u32 = 40;
const Q_ONE: i128 = 1 << Q;
/// π · 2^40
const PI_Q: i128 = 3_454_217_652_358;
/// ln(2) · 2^40
const LN2_Q: i128 = 762_123_384_786;

static SIN_TABLE: LazyLock<[i64; TABLE_SIZE]> = LazyLock::new(build_sin_table);

/// Convert whole units to fixed-point
#[inline]
pub const fn from_units(units: i64) -> i64 {
    units * SCALE
}

/// Scaled multiply: `a * b / scale`, rounded toward negative infinity.
pub fn multiply(a: i64, b: i64, scale: i64) -> i64 {
    if scale == 0 {
        return 0;
    }
    floor_div(a as i128 * b as i128, scale as i128)
}

/// Scaled divide: `a * scale / b`, rounded toward negative infinity.
///
/// Division by zero yields 0.
pub fn divide(a: i64, b: i64, scale: i64) -> i64 {
    if b == 0 {
        return 0;
    }
    floor_div(a as i128 * scale as i128, b as i128)
}

fn floor_div(n: i128, d: i128) -> i64 {
    let q = n / d;
    let q = if n % d != 0 && ((n < 0) != (d < 0)) {
        q - 1
    } else {
        q
    };
    saturate(q)
}

#[inline]
fn saturate(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Fixed-point square root (Newton's method on the integer root of
/// `value * scale`). Non-positive input returns 0.
pub fn sqrt(value: i64, scale: i64) -> i64 {
    if value <= 0 || scale <= 0 {
        return 0;
    }
    let n = value as i128 * scale as i128;
    let mut x = n;
    loop {
        let next = (x + n / x) / 2;
        if (x - next).abs() <= 1 {
            x = x.min(next);
            break;
        }
        x = next;
    }
    // Land exactly on the floor root
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    saturate(x)
}

/// Normalize an angle into `[0, 360000)` millidegrees
#[inline]
pub fn normalize_angle(angle: i64) -> i64 {
    angle.rem_euclid(FULL_TURN)
}

/// Normalize an angle into `(-180000, 180000]` millidegrees
pub fn signed_angle(angle: i64) -> i64 {
    let a = normalize_angle(angle);
    if a > HALF_TURN { a - FULL_TURN } else { a }
}

/// Sine of an angle in millidegrees, scaled by [`SCALE`]
pub fn sin(angle: i64) -> i64 {
    let idx = (normalize_angle(angle) / TABLE_STEP) as usize;
    SIN_TABLE[idx]
}

/// Cosine of an angle in millidegrees, scaled by [`SCALE`]
pub fn cos(angle: i64) -> i64 {
    sin(normalize_angle(angle) + QUARTER_TURN)
}

pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation from `a` to `b`; `t` is scaled by `scale`
pub fn lerp(a: i64, b: i64, t: i64, scale: i64) -> i64 {
    a.saturating_add(multiply(b.saturating_sub(a), t, scale))
}

/// Natural logarithm of a fixed-point value.
///
/// Range-reduces to `m · 2^k` with `m` in `[1, 2)`, then sums the atanh series
/// `ln(m) = 2 · atanh((m - 1) / (m + 1))`. Non-positive input returns 0.
pub fn ln(value: i64, scale: i64) -> i64 {
    if value <= 0 || scale <= 0 {
        return 0;
    }
    let mut m = ((value as i128) << Q) / scale as i128;
    if m == 0 {
        // below 2^-40 of a unit; clamp rather than loop forever
        m = 1;
    }
    let mut k: i128 = 0;
    while m >= 2 * Q_ONE {
        m >>= 1;
        k += 1;
    }
    while m < Q_ONE {
        m <<= 1;
        k -= 1;
    }

    let z = ((m - Q_ONE) << Q) / (m + Q_ONE);
    let z2 = (z * z) >> Q;
    let mut term = z;
    let mut sum: i128 = 0;
    let mut n: i128 = 1;
    while term != 0 {
        sum += term / n;
        term = (term * z2) >> Q;
        n += 2;
    }

    let total = LN2_Q * k + 2 * sum;
    saturate((total * scale as i128) >> Q)
}

fn build_sin_table() -> [i64; TABLE_SIZE] {
    let mut table = [0i64; TABLE_SIZE];
    for (i, slot) in table.iter_mut().enumerate() {
        let tenths = i as i64;
        let (reduced, negate) = match tenths {
            0..=900 => (tenths, false),
            901..=1800 => (1800 - tenths, false),
            1801..=2700 => (tenths - 1800, true),
            _ => (3600 - tenths, true),
        };
        let v = sin_first_quadrant(reduced);
        *slot = if negate { -v } else { v };
    }
    table
}

/// Sine for `[0°, 90°]` given in tenths of a degree (Taylor series in Q40)
fn sin_first_quadrant(tenths: i64) -> i64 {
    let x = tenths as i128 * PI_Q / 1800;
    let x2 = (x * x) >> Q;
    let mut term = x;
    let mut sum: i128 = 0;
    let mut n: i128 = 1;
    while term != 0 {
        sum += term;
        term = -((term * x2) >> Q) / ((n + 1) * (n + 2));
        n += 2;
    }
    // round to nearest
    ((sum * SCALE as i128 + (Q_ONE >> 1)) >> Q) as i64
}
