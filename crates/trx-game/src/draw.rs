// draw.rs — view setup and the generic skinned-item draw routine

use log::warn;

use trx_common::types::{PhdAngle, Xyz32};
use trx_renderer::RenderBackend;

use crate::g_local::GameContext;

/// Camera placement for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    pub pos: Xyz32,
    pub target: Xyz32,
    pub roll: PhdAngle,
}

impl GameContext {
    /// Reset the matrix stack and aim the world-to-view matrix.
    pub fn setup_view(&mut self, camera: &Camera) {
        let stack = &mut self.render.matrices;
        stack.reset_stack();
        stack.look_at(&camera.pos, &camera.target, camera.roll);
    }

    /// Walk an item's bone list and submit every surviving mesh. Between
    /// keyframes both poses are transformed and blended per mesh.
    pub fn draw_animating_item(&mut self, backend: &mut dyn RenderBackend, idx: usize) {
        let item_pos = self.items[idx].pos;
        let item_floor = self.items[idx].floor;
        let mesh_bits = self.items[idx].mesh_bits;
        let object = *self.object(self.items[idx].object_type);

        let pair = self.anims.get_frames(self.items[idx].anim_number, self.items[idx].frame_number);
        let frame = self.anims.frame(pair.frames[0]).clone();
        let next = self.anims.frame(pair.frames[1]).clone();
        let interpolated = pair.frac != 0;

        let entry = self.render.matrices.depth();
        if !self.render.matrices.push() {
            return;
        }
        self.render.matrices.translate_abs(item_pos.x, item_pos.y, item_pos.z);
        self.render.matrices.rot_yxz(item_pos.y_rot, item_pos.x_rot, item_pos.z_rot);

        let clip = self.render.classify_bounds(&frame.bounds);
        if !clip.is_visible() {
            self.render.matrices.pop_to(entry);
            return;
        }

        {
            let stack = &mut self.render.matrices;
            if interpolated {
                stack.init_interpolate(pair.frac, pair.rate);
                stack.translate_rel_id(&to_xyz32(frame.offset), &to_xyz32(next.offset));
                stack.rot_xyz16_i(&frame.mesh_rot(0), &next.mesh_rot(0));
            } else {
                let o = frame.offset;
                stack.translate_rel(o.x as i32, o.y as i32, o.z as i32);
                stack.rot_xyz16(&frame.mesh_rot(0));
            }
        }
        if mesh_bits & 1 != 0 {
            self.put_mesh(backend, object.mesh_index, clip, interpolated);
        }

        let mut bit = 1u32;
        for i in 1..object.mesh_count {
            let Some(bone) = self.bones.get(object.bone_index + i - 1).copied() else {
                warn!("{:?} has {} meshes but bone data ends at {}", self.items[idx].object_type, object.mesh_count, i);
                break;
            };
            self.apply_bone(&bone, entry + 1, interpolated);
            if interpolated {
                self.render.matrices.rot_xyz16_i(&frame.mesh_rot(i), &next.mesh_rot(i));
            } else {
                self.render.matrices.rot_xyz16(&frame.mesh_rot(i));
            }

            bit = bit.checked_shl(1).unwrap_or(0);
            if mesh_bits & bit != 0 {
                self.put_mesh(backend, object.mesh_index + i, clip, interpolated);
            }
        }

        self.restore_stack(entry, entry + 1);

        if object.shadow_size > 0 {
            self.render.print_shadow(backend, object.shadow_size, &frame.bounds, &item_pos, item_floor);
        }
    }

    fn put_mesh(
        &mut self,
        backend: &mut dyn RenderBackend,
        mesh: usize,
        clip: trx_renderer::Visibility,
        interpolated: bool,
    ) {
        let stack = &mut self.render.matrices;
        if !interpolated {
            backend.put_polygons(mesh, stack.top(), clip);
            return;
        }
        if !stack.push() {
            return;
        }
        stack.interpolate();
        backend.put_polygons(mesh, stack.top(), clip);
        stack.pop();
    }
}

fn to_xyz32(v: trx_common::types::Xyz16) -> Xyz32 {
    Xyz32::new(v.x as i32, v.y as i32, v.z as i32)
}
