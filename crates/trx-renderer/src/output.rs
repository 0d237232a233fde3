// output.rs — projection, visibility classification and backend submission
//
// Everything here works on view-space coordinates in matrix scale (world
// units << W2V_SHIFT) read off the top of the matrix stack. The backend
// only ever receives screen-space primitives.

use trx_common::matrix::Matrix;
use trx_common::phd_math::W2V_SHIFT;
use trx_common::types::{Bounds16, Xyz32};

use crate::viewport::Viewport;

/// Result of projecting an object's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Nothing of the box reaches the screen; skip the object.
    Offscreen,
    /// Partly outside the depth range or the window; polygons need clipping.
    Clipped,
    /// Every corner projects inside the window.
    Visible,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self != Visibility::Offscreen
    }
}

bitflags::bitflags! {
    /// Per-vertex screen clip state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ClipFlags: u16 {
        const LEFT   = 0x0001;
        const RIGHT  = 0x0002;
        const TOP    = 0x0004;
        const BOTTOM = 0x0008;
        const FAR    = 0x0010;
        /// In front of the near plane; screen coordinates are meaningless.
        const BEHIND = 0x8000;
    }
}

/// A transformed vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhdVbuf {
    pub xv: i32,
    pub yv: i32,
    pub zv: i32,
    pub xs: i32,
    pub ys: i32,
    pub clip: ClipFlags,
}

/// One projected end of a lightning segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightningVertex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub thickness: i32,
}

/// The rasterizing side of the pipeline.
pub trait RenderBackend {
    /// Draw one mesh with the given top-of-stack transform.
    fn put_polygons(&mut self, mesh: usize, matrix: &Matrix, visibility: Visibility);

    fn draw_lightning_segment(&mut self, a: LightningVertex, b: LightningVertex);

    /// Flat shadow polygon; `clipped` is set when any vertex touches a window edge.
    fn print_shadow(&mut self, vertices: &[PhdVbuf], clipped: bool);
}

/// Backend that discards everything.
#[derive(Debug, Default)]
pub struct NullBackend;

impl RenderBackend for NullBackend {
    fn put_polygons(&mut self, _mesh: usize, _matrix: &Matrix, _visibility: Visibility) {}
    fn draw_lightning_segment(&mut self, _a: LightningVertex, _b: LightningVertex) {}
    fn print_shadow(&mut self, _vertices: &[PhdVbuf], _clipped: bool) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Mesh { mesh: usize, matrix: Matrix, visibility: Visibility },
    Lightning(LightningVertex, LightningVertex),
    Shadow { vertices: Vec<PhdVbuf>, clipped: bool },
}

/// Backend that keeps every submission, for inspection.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn meshes(&self) -> impl Iterator<Item = usize> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Mesh { mesh, .. } => Some(*mesh),
            _ => None,
        })
    }

    pub fn lightning_segments(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Lightning(..))).count()
    }

    pub fn shadows(&self) -> impl Iterator<Item = (&[PhdVbuf], bool)> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Shadow { vertices, clipped } => Some((vertices.as_slice(), *clipped)),
            _ => None,
        })
    }
}

impl RenderBackend for RecordingBackend {
    fn put_polygons(&mut self, mesh: usize, matrix: &Matrix, visibility: Visibility) {
        self.calls.push(DrawCall::Mesh { mesh, matrix: *matrix, visibility });
    }

    fn draw_lightning_segment(&mut self, a: LightningVertex, b: LightningVertex) {
        self.calls.push(DrawCall::Lightning(a, b));
    }

    fn print_shadow(&mut self, vertices: &[PhdVbuf], clipped: bool) {
        self.calls.push(DrawCall::Shadow { vertices: vertices.to_vec(), clipped });
    }
}

// ============================================================
// Classification and projection
// ============================================================

impl Viewport {
    /// Project the eight corners of `bounds` through `m` and classify the
    /// resulting screen rectangle.
    pub fn classify_bounds(&self, m: &Matrix, bounds: &Bounds16) -> Visibility {
        if m.m23 >= self.far_z {
            return Visibility::Offscreen;
        }

        let mut num_z = 0;
        let mut x_min = i64::MAX;
        let mut y_min = i64::MAX;
        let mut x_max = i64::MIN;
        let mut y_max = i64::MIN;

        for corner in bounds.corners() {
            let [xv, yv, zv] = m.apply(&corner);
            if zv >= self.far_z as i64 {
                continue;
            }
            let Some(zp) = self.perspective_divisor(zv) else {
                continue;
            };
            num_z += 1;

            let xs = xv / zp;
            let ys = yv / zp;
            x_min = x_min.min(xs);
            x_max = x_max.max(xs);
            y_min = y_min.min(ys);
            y_max = y_max.max(ys);
        }

        if num_z == 0 {
            return Visibility::Offscreen;
        }

        let x_min = x_min + self.center_x as i64;
        let x_max = x_max + self.center_x as i64;
        let y_min = y_min + self.center_y as i64;
        let y_max = y_max + self.center_y as i64;

        if x_min > self.right as i64
            || y_min > self.bottom as i64
            || x_max < self.left as i64
            || y_max < self.top as i64
        {
            return Visibility::Offscreen;
        }

        if num_z < 8
            || x_min < 0
            || y_min < 0
            || x_max > self.max_x() as i64
            || y_max > self.max_y() as i64
        {
            return Visibility::Clipped;
        }

        Visibility::Visible
    }

    /// Transform object-space vertices through `m` into `out`. Returns
    /// false when every vertex is clipped against the same edge.
    pub fn calc_object_vertices(&self, m: &Matrix, vertices: &[Xyz32], out: &mut Vec<PhdVbuf>) -> bool {
        out.clear();
        let mut total_clip = ClipFlags::all();

        for v in vertices {
            let [xv, yv, zv] = m.apply(v);
            let mut vbuf = PhdVbuf {
                xv: xv as i32,
                yv: yv as i32,
                zv: zv as i32,
                ..Default::default()
            };

            if let Some(zp) = self.perspective_divisor(zv) {
                if zv > self.far_z as i64 {
                    vbuf.clip |= ClipFlags::FAR;
                }
                let xs = self.center_x as i64 + xv / zp;
                let ys = self.center_y as i64 + yv / zp;

                if xs < self.left as i64 {
                    vbuf.clip |= ClipFlags::LEFT;
                } else if xs > self.right as i64 {
                    vbuf.clip |= ClipFlags::RIGHT;
                }
                if ys < self.top as i64 {
                    vbuf.clip |= ClipFlags::TOP;
                } else if ys > self.bottom as i64 {
                    vbuf.clip |= ClipFlags::BOTTOM;
                }

                vbuf.xs = xs.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                vbuf.ys = ys.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            } else {
                vbuf.clip = ClipFlags::BEHIND;
            }

            total_clip &= vbuf.clip;
            out.push(vbuf);
        }

        !vertices.is_empty() && total_clip.is_empty()
    }

    /// Project a view-space segment and submit it with per-end thickness.
    /// Segments with either end outside the depth range are dropped.
    pub fn draw_lightning_segment(
        &self,
        backend: &mut dyn RenderBackend,
        a: &Xyz32,
        b: &Xyz32,
        width: i32,
    ) -> bool {
        let (Some(va), Some(vb)) = (self.lightning_vertex(a, width), self.lightning_vertex(b, width)) else {
            return false;
        };
        backend.draw_lightning_segment(va, vb);
        true
    }

    fn lightning_vertex(&self, p: &Xyz32, width: i32) -> Option<LightningVertex> {
        let (x, y) = self.project_point(p.x, p.y, p.z)?;
        let zp = self.perspective_divisor(p.z as i64)?;
        Some(LightningVertex { x, y, z: p.z, thickness: (((width as i64) << W2V_SHIFT) / zp) as i32 })
    }
}
