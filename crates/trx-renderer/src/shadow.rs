// shadow.rs — flat shadow blob under an item

use trx_common::phd_math::{cos, sin, PHD_180, PHD_360, PHD_90};
use trx_common::types::{Bounds16, Pos3d, Xyz32};

use crate::context::RenderContext;
use crate::output::{ClipFlags, PhdVbuf, RenderBackend};

pub const SHADOW_OCTAGON_VERTICES: usize = 8;
pub const SHADOW_ROUND_VERTICES: usize = 32;

/// Ring of vertices around the horizontal centre of `bounds`, on the y = 0
/// plane. `size` scales the box extents, 1024 being 1:1.
pub fn shadow_ring(bounds: &Bounds16, size: i32, round: bool) -> Vec<Xyz32> {
    let count = (if round { SHADOW_ROUND_VERTICES } else { SHADOW_OCTAGON_VERTICES }) as i32;

    let (x0, x1) = (bounds.min.x as i32, bounds.max.x as i32);
    let (z0, z1) = (bounds.min.z as i32, bounds.max.z as i32);
    let x_mid = (x0 + x1) / 2;
    let z_mid = (z0 + z1) / 2;
    let x_add = (x1 - x0) * size / 1024;
    let z_add = (z1 - z0) * size / 1024;

    (0..count)
        .map(|i| {
            let angle = (PHD_180 + i * PHD_360) / count;
            Xyz32::new(
                x_mid + (x_add * 2) * sin(angle) / PHD_90,
                0,
                z_mid + (z_add * 2) * cos(angle) / PHD_90,
            )
        })
        .collect()
}

/// Decide whether a projected ring is drawn. `Some(clipped)` when it is.
///
/// The ring is rejected when all vertices share a clip edge, any vertex is
/// behind the near plane, or the sample triangle faces away.
pub fn shadow_visibility(vbuf: &[PhdVbuf]) -> Option<bool> {
    if vbuf.len() < 3 {
        return None;
    }

    let mut clip_and = ClipFlags::all();
    let mut clip_or = ClipFlags::empty();
    for v in vbuf {
        clip_and &= v.clip;
        clip_or |= v.clip;
    }
    if !clip_and.is_empty() || clip_or.contains(ClipFlags::BEHIND) {
        return None;
    }

    // a quarter of the way round on both rings
    let step = (vbuf.len() / SHADOW_OCTAGON_VERTICES).max(1);
    let (v1, v2, v3) = (&vbuf[0], &vbuf[step], &vbuf[step * 2]);
    let area = (v3.xs as i64 - v2.xs as i64) * (v1.ys as i64 - v2.ys as i64)
        - (v1.xs as i64 - v2.xs as i64) * (v3.ys as i64 - v2.ys as i64);
    if area < 0 {
        return None;
    }

    Some(!clip_or.is_empty())
}

impl RenderContext {
    /// Draw the shadow of an item standing at `pos` over floor height `floor`.
    /// Returns whether a polygon was submitted.
    pub fn print_shadow(
        &mut self,
        backend: &mut dyn RenderBackend,
        size: i32,
        bounds: &Bounds16,
        pos: &Pos3d,
        floor: i32,
    ) -> bool {
        let ring = shadow_ring(bounds, size, self.config.enable_round_shadow);

        if !self.matrices.push() {
            return false;
        }
        self.matrices.translate_abs(pos.x, floor, pos.z);
        self.matrices.rot_y(pos.y_rot);

        let mut drawn = false;
        if self.calc_object_vertices(&ring) {
            if let Some(clipped) = shadow_visibility(self.vertices()) {
                backend.print_shadow(self.vertices(), clipped);
                drawn = true;
            }
        }

        self.matrices.pop();
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{DrawCall, RecordingBackend};
    use trx_common::config::Config;
    use trx_common::types::Xyz16;

    fn item_bounds() -> Bounds16 {
        Bounds16::new(Xyz16::new(-100, -700, -100), Xyz16::new(100, 0, 100))
    }

    /// Camera 1000 units up, pitched straight down.
    fn overhead(config: Config) -> RenderContext {
        let mut ctx = RenderContext::new(640, 480, config);
        ctx.matrices.reset_stack();
        ctx.matrices
            .generate_w2v(&Xyz32::new(0, -1000, 0), &Xyz16::new(-(PHD_90 as i16), 0, 0));
        ctx
    }

    #[test]
    fn test_ring_vertex_count_follows_round_flag() {
        let b = item_bounds();
        assert_eq!(shadow_ring(&b, 1024, false).len(), 8);
        assert_eq!(shadow_ring(&b, 1024, true).len(), 32);
    }

    #[test]
    fn test_ring_is_flat_and_centered() {
        let b = Bounds16::new(Xyz16::new(100, -50, 300), Xyz16::new(300, 0, 500));
        let ring = shadow_ring(&b, 1024, true);
        assert!(ring.iter().all(|v| v.y == 0));
        let sum_x: i32 = ring.iter().map(|v| v.x).sum();
        let sum_z: i32 = ring.iter().map(|v| v.z).sum();
        assert!((sum_x / 32 - 200).abs() <= 2);
        assert!((sum_z / 32 - 400).abs() <= 2);
    }

    #[test]
    fn test_ring_radius_scales_with_size() {
        let b = item_bounds();
        let max_x = |size| shadow_ring(&b, size, false).iter().map(|v| v.x).max().unwrap_or(0);
        assert!(max_x(2048) > max_x(1024));
    }

    #[test]
    fn test_visibility_rejects_shared_edge() {
        let v = PhdVbuf { clip: ClipFlags::LEFT, ..Default::default() };
        assert_eq!(shadow_visibility(&[v; 8]), None);
    }

    #[test]
    fn test_visibility_rejects_behind_vertex() {
        let mut ring = [PhdVbuf::default(); 8];
        ring[3].clip = ClipFlags::BEHIND;
        assert_eq!(shadow_visibility(&ring), None);
    }

    #[test]
    fn test_visibility_winding() {
        let at = |xs, ys| PhdVbuf { xs, ys, ..Default::default() };
        let mut ring = [PhdVbuf::default(); 8];
        ring[0] = at(0, 10);
        ring[1] = at(0, 0);
        ring[2] = at(10, 0);
        assert_eq!(shadow_visibility(&ring), Some(false));

        ring.swap(0, 2);
        assert_eq!(shadow_visibility(&ring), None);
    }

    #[test]
    fn test_print_shadow_submits_and_balances_stack() {
        for round in [false, true] {
            let mut ctx = overhead(Config { enable_round_shadow: round, ..Config::default() });
            let mut backend = RecordingBackend::default();
            let depth = ctx.matrices.depth();

            let drawn = ctx.print_shadow(&mut backend, 1024, &item_bounds(), &Pos3d::at(0, 0, 0), 0);
            assert!(drawn);
            assert_eq!(ctx.matrices.depth(), depth);

            let DrawCall::Shadow { vertices, clipped } = &backend.calls[0] else {
                panic!("expected a shadow call");
            };
            assert_eq!(vertices.len(), if round { 32 } else { 8 });
            assert!(!clipped);
        }
    }

    #[test]
    fn test_print_shadow_skipped_when_behind_camera() {
        let mut ctx = RenderContext::new(640, 480, Config::default());
        ctx.matrices.generate_w2v(&Xyz32::ZERO, &Xyz16::ZERO);
        let mut backend = RecordingBackend::default();
        let drawn = ctx.print_shadow(&mut backend, 1024, &item_bounds(), &Pos3d::at(0, 0, -3000), 0);
        assert!(!drawn);
        assert!(backend.calls.is_empty());
        assert_eq!(ctx.matrices.depth(), 0);
    }
}
