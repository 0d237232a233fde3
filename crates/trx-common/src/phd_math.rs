// phd_math.rs — fixed-point trigonometry and integer helpers
//
// Angles are 16-bit: PHD_360 wraps to zero. Trig results are scaled by
// W2V_SCALE (1 << 14), the same scale the matrix stack stores rotations in.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use crate::types::PhdAngle;

pub const PHD_360: i32 = 0x10000;
pub const PHD_180: i32 = 0x8000;
pub const PHD_90: i32 = 0x4000;
pub const PHD_45: i32 = 0x2000;
pub const PHD_DEGREE: i32 = PHD_360 / 360;

/// Fixed-point shift between world units and matrix scale. Projection math
/// depends on this exact value.
pub const W2V_SHIFT: i32 = 14;
pub const W2V_SCALE: i32 = 1 << W2V_SHIFT;

const SIN_TABLE_SIZE: usize = 0x401;
const ATAN_TABLE_SIZE: usize = 0x801;

// ============================================================
// Lookup tables
// ============================================================

fn sin_table() -> &'static [i16; SIN_TABLE_SIZE] {
    static TABLE: OnceLock<[i16; SIN_TABLE_SIZE]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0i16; SIN_TABLE_SIZE];
        for (i, v) in table.iter_mut().enumerate() {
            let rad = i as f64 * FRAC_PI_2 / 1024.0;
            *v = (rad.sin() * W2V_SCALE as f64).round() as i16;
        }
        table
    })
}

fn atan_table() -> &'static [i16; ATAN_TABLE_SIZE] {
    static TABLE: OnceLock<[i16; ATAN_TABLE_SIZE]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0i16; ATAN_TABLE_SIZE];
        for (i, v) in table.iter_mut().enumerate() {
            let rad = (i as f64 / 2048.0).atan();
            *v = (rad * PHD_180 as f64 / PI).round() as i16;
        }
        table
    })
}

// ============================================================
// Trigonometry
// ============================================================

/// Sine of a 16-bit angle, scaled by W2V_SCALE.
pub fn sin(angle: i32) -> i32 {
    let a = ((angle as u32 & 0xFFFF) >> 4) as usize;
    let table = sin_table();
    match a {
        0..=0x400 => table[a] as i32,
        0x401..=0x7FF => table[0x800 - a] as i32,
        0x800..=0xC00 => -(table[a - 0x800] as i32),
        _ => -(table[0x1000 - a] as i32),
    }
}

/// Cosine of a 16-bit angle, scaled by W2V_SCALE.
pub fn cos(angle: i32) -> i32 {
    sin(angle.wrapping_add(PHD_90))
}

/// Angle whose cosine follows `x` and whose sine follows `y`.
///
/// `atan(dz, dx)` gives the yaw that points +z towards (dx, dz).
pub fn atan(x: i32, y: i32) -> i32 {
    if x == 0 && y == 0 {
        return 0;
    }

    let ax = (x as i64).abs();
    let ay = (y as i64).abs();
    let table = atan_table();

    let base = if ay > ax {
        PHD_90 - table[((ax << 11) / ay) as usize] as i32
    } else {
        table[((ay << 11) / ax) as usize] as i32
    };

    let angle = if x < 0 { PHD_180 - base } else { base };
    let angle = if y < 0 { -angle } else { angle };
    angle as PhdAngle as i32
}

/// Integer square root (floor).
pub fn sqrt(n: i32) -> i32 {
    if n <= 0 {
        return 0;
    }

    let mut n = n as u32;
    let mut base: u32 = 0x4000_0000;
    let mut result: u32 = 0;
    while base != 0 {
        let based = result + base;
        result >>= 1;
        if based <= n {
            n -= based;
            result |= base;
        }
        base >>= 2;
    }
    result as i32
}

#[inline]
pub fn trig_mult2(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64) >> W2V_SHIFT) as i32
}

#[inline]
pub fn trig_mult3(a: i32, b: i32, c: i32) -> i32 {
    trig_mult2(trig_mult2(a, b), c)
}

/// Yaw and pitch that aim along (x, y, z). Positive y points down, so the
/// pitch sign is the opposite of y.
pub fn get_vector_angles(mut x: i32, mut y: i32, mut z: i32) -> (PhdAngle, PhdAngle) {
    let yaw = atan(z, x) as PhdAngle;

    while x as i16 as i32 != x || y as i16 as i32 != y || z as i16 as i32 != z {
        x >>= 2;
        y >>= 2;
        z >>= 2;
    }

    let horizontal = (x as i64 * x as i64 + z as i64 * z as i64).min(i32::MAX as i64) as i32;
    let mut pitch = atan(sqrt(horizontal), y) as PhdAngle;
    if (y > 0 && pitch > 0) || (y < 0 && pitch < 0) {
        pitch = -pitch;
    }

    (yaw, pitch)
}
