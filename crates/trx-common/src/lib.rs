#![allow(clippy::too_many_arguments, clippy::identity_op, clippy::needless_range_loop,
         clippy::manual_range_contains, clippy::new_without_default)]
// Fixed-point transform core shared by the renderer and game crates

pub mod types;
pub mod phd_math;
pub mod matrix;
pub mod anims;
pub mod random;
pub mod cvar;
pub mod config;
