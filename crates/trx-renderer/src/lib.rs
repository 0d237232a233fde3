#![allow(clippy::too_many_arguments, clippy::identity_op, clippy::manual_range_contains)]
// Projection, visibility and primitive submission for the fixed-point pipeline

pub mod viewport;
pub mod output;
pub mod context;
pub mod shadow;

pub use context::RenderContext;
pub use output::{ClipFlags, DrawCall, LightningVertex, NullBackend, PhdVbuf, RecordingBackend, RenderBackend, Visibility};
pub use viewport::Viewport;
