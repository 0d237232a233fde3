// context.rs — per-frame render state threaded through every draw call

use log::debug;

use trx_common::config::Config;
use trx_common::matrix::MatrixStack;
use trx_common::types::{Bounds16, Xyz32};

use crate::output::{PhdVbuf, RenderBackend, Visibility};
use crate::viewport::Viewport;

/// Owns the matrix stack and the view window for one rendering session.
/// Draw routines borrow it mutably for the length of one traversal.
pub struct RenderContext {
    pub matrices: MatrixStack,
    pub viewport: Viewport,
    pub config: Config,
    vbuf: Vec<PhdVbuf>,
}

impl RenderContext {
    pub fn new(width: i32, height: i32, config: Config) -> Self {
        Self {
            matrices: MatrixStack::new(),
            viewport: Viewport::new(width, height, &config),
            config,
            vbuf: Vec::with_capacity(32),
        }
    }

    /// Adopt new settings; the window size is kept.
    pub fn apply_config(&mut self, config: Config) {
        self.viewport.set_draw_distance(config.draw_distance);
        self.viewport.alter_fov(config.fov);
        debug!("draw distance {} fov {} persp {}", config.draw_distance, config.fov, self.viewport.persp);
        self.config = config;
    }

    pub fn set_window(&mut self, width: i32, height: i32) {
        self.viewport = Viewport::new(width, height, &self.config);
        debug!("window {}x{} persp {}", width, height, self.viewport.persp);
    }

    /// Classify `bounds` under the current top of stack.
    pub fn classify_bounds(&self, bounds: &Bounds16) -> Visibility {
        self.viewport.classify_bounds(self.matrices.top(), bounds)
    }

    /// Transform vertices under the current top of stack into the shared
    /// vertex buffer.
    pub fn calc_object_vertices(&mut self, vertices: &[Xyz32]) -> bool {
        self.viewport.calc_object_vertices(self.matrices.top(), vertices, &mut self.vbuf)
    }

    /// Output of the last `calc_object_vertices`.
    pub fn vertices(&self) -> &[PhdVbuf] {
        &self.vbuf
    }

    pub fn draw_lightning_segment(
        &self,
        backend: &mut dyn RenderBackend,
        a: &Xyz32,
        b: &Xyz32,
        width: i32,
    ) -> bool {
        self.viewport.draw_lightning_segment(backend, a, b, width)
    }
}
