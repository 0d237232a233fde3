// viewport.rs — view window, perspective constant and clip planes

use log::warn;

use trx_common::config::Config;
use trx_common::phd_math::{cos, sin, PHD_DEGREE, W2V_SHIFT};
use trx_common::types::WALL_L;

/// Near clip distance in world units.
pub const NEAR_CLIP: i32 = 20;

/// Resolution the UI layout is authored for.
pub const UI_BASE_WIDTH: i32 = 640;
pub const UI_BASE_HEIGHT: i32 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub center_x: i32,
    pub center_y: i32,
    pub persp: i32,
    /// Clip depths in matrix scale (world units << W2V_SHIFT).
    pub near_z: i32,
    pub far_z: i32,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32, config: &Config) -> Self {
        let mut vp = Self {
            width,
            height,
            center_x: width / 2,
            center_y: height / 2,
            persp: 1,
            near_z: NEAR_CLIP << W2V_SHIFT,
            far_z: 0,
            left: 0,
            top: 0,
            right: width - 1,
            bottom: height - 1,
        };
        vp.set_draw_distance(config.draw_distance);
        vp.alter_fov(config.fov);
        vp
    }

    pub fn max_x(&self) -> i32 {
        self.width - 1
    }

    pub fn max_y(&self) -> i32 {
        self.height - 1
    }

    /// Far plane at `sectors` floor sectors.
    pub fn set_draw_distance(&mut self, sectors: i32) {
        self.far_z = (sectors * WALL_L) << W2V_SHIFT;
    }

    /// Recompute the perspective constant for a horizontal FOV in degrees.
    pub fn alter_fov(&mut self, fov_degrees: i32) {
        let half = fov_degrees * PHD_DEGREE / 2;
        let s = sin(half);
        if s == 0 {
            warn!("fov {} gives no perspective, keeping {}", fov_degrees, self.persp);
            return;
        }
        let persp = (self.width / 2) as i64 * cos(half) as i64 / s as i64;
        self.persp = (persp as i32).max(1);
    }

    /// Perspective divisor for a view-space depth. None in front of the
    /// near plane or when the divisor would be zero.
    pub fn perspective_divisor(&self, zv: i64) -> Option<i64> {
        if zv < self.near_z as i64 {
            return None;
        }
        let zp = zv / self.persp as i64;
        (zp != 0).then_some(zp)
    }

    /// Project a view-space point (matrix scale) to screen coordinates.
    /// Depths outside the clip planes, or too shallow to divide by, give None.
    pub fn project_point(&self, xv: i32, yv: i32, zv: i32) -> Option<(i32, i32)> {
        if zv > self.far_z {
            return None;
        }
        let zp = self.perspective_divisor(zv as i64)?;
        Some((self.center_x + (xv as i64 / zp) as i32, self.center_y + (yv as i64 / zp) as i32))
    }

    // ============================================================
    // UI scaling
    // ============================================================

    /// Scale a UI unit from the 640x480 base resolution, never shrinking
    /// below `unit * factor`.
    pub fn render_scale(&self, unit: i32, factor: f32) -> i32 {
        let base = unit as f64 * factor as f64;
        let scale_x = if self.width > UI_BASE_WIDTH {
            base * self.width as f64 / UI_BASE_WIDTH as f64
        } else {
            base
        };
        let scale_y = if self.height > UI_BASE_HEIGHT {
            base * self.height as f64 / UI_BASE_HEIGHT as f64
        } else {
            base
        };
        scale_x.min(scale_y) as i32
    }

    /// Screen size expressed in unscaled UI units.
    pub fn render_scale_inverse(&self, factor: f32) -> (i32, i32) {
        let unit = 0x10000;
        let scale = self.render_scale(unit, factor).max(1) as i64;
        (
            (self.width as i64 * unit as i64 / scale) as i32,
            (self.height as i64 * unit as i64 / scale) as i32,
        )
    }
}
