// random.rs — seedable 15-bit random streams
//
// Two independent streams: `control` for game logic and `draw` for purely
// cosmetic jitter, so rendering never perturbs replayed logic.

use parking_lot::Mutex;

const LCG_MUL: i32 = 0x41C6_4E6D;
const LCG_ADD: i32 = 0x3039;

/// Upper bound (exclusive) of every value a `RandomSource` returns.
pub const RANDOM_RANGE: i32 = 0x8000;

pub trait RandomSource {
    /// Next value in `[0, 0x8000)` from the game-logic stream.
    fn get_control(&mut self) -> i32;
    /// Next value in `[0, 0x8000)` from the cosmetic stream.
    fn get_draw(&mut self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcgRandom {
    control_seed: i32,
    draw_seed: i32,
}

#[inline]
fn lcg_next(seed: &mut i32) -> i32 {
    *seed = seed.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
    (*seed >> 10) & 0x7FFF
}

impl LcgRandom {
    pub const fn new(control_seed: i32, draw_seed: i32) -> Self {
        Self { control_seed, draw_seed }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random::<i32>(), rand::random::<i32>())
    }

    pub fn seed_control(&mut self, seed: i32) {
        self.control_seed = seed;
    }

    pub fn seed_draw(&mut self, seed: i32) {
        self.draw_seed = seed;
    }
}

impl Default for LcgRandom {
    fn default() -> Self {
        Self::new(0xD371_F947u32 as i32, 0xD371_F947u32 as i32)
    }
}

impl RandomSource for LcgRandom {
    fn get_control(&mut self) -> i32 {
        lcg_next(&mut self.control_seed)
    }

    fn get_draw(&mut self) -> i32 {
        lcg_next(&mut self.draw_seed)
    }
}

// ============================================================
// Process-wide stream
// ============================================================

static SHARED_RANDOM: Mutex<LcgRandom> =
    parking_lot::const_mutex(LcgRandom::new(0xD371_F947u32 as i32, 0xD371_F947u32 as i32));

/// Reseed the process-wide stream (level start, replay playback).
pub fn seed_shared(control_seed: i32, draw_seed: i32) {
    let mut rng = SHARED_RANDOM.lock();
    rng.seed_control(control_seed);
    rng.seed_draw(draw_seed);
}

pub fn seed_shared_from_entropy() {
    *SHARED_RANDOM.lock() = LcgRandom::from_entropy();
}

/// Handle onto the process-wide stream; every handle draws from the same
/// sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedRandom;

impl RandomSource for SharedRandom {
    fn get_control(&mut self) -> i32 {
        SHARED_RANDOM.lock().get_control()
    }

    fn get_draw(&mut self) -> i32 {
        SHARED_RANDOM.lock().get_draw()
    }
}
