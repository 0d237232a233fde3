#![allow(clippy::too_many_arguments, clippy::identity_op, clippy::needless_range_loop,
         clippy::manual_range_contains)]
// Items, effects and the draw/control routines that drive the transform pipeline

pub mod level_import;
pub mod items;
pub mod effects;
pub mod g_local;
pub mod draw;
pub mod exploding_death;
pub mod lightning;
pub mod thors_hammer;
pub mod setup;

#[cfg(test)]
mod test_support;

pub use g_local::GameContext;
