// exploding_death.rs — break an item into flying body-part effects

use log::debug;

use trx_common::types::Pos3d;

use crate::g_local::GameContext;
use crate::items::ObjectType;

/// Outcome of one explosion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explosion {
    /// The item's surviving mesh bits after this step.
    pub remaining: u32,
    /// Every mesh of the object's type is gone.
    pub finished: bool,
}

impl GameContext {
    /// Spawn a body-part effect for every mesh set in both `mesh_bits` and
    /// the item's surviving meshes, and clear those bits on the item.
    ///
    /// Bits are cleared even when the effect pool is full; the mesh is gone
    /// either way.
    pub fn explode_item(&mut self, idx: usize, mesh_bits: u32, damage: i16) -> Explosion {
        let object = *self.object(self.items[idx].object_type);
        let item_pos = self.items[idx].pos;
        let frame = self
            .anims
            .best_frame(self.items[idx].anim_number, self.items[idx].frame_number)
            .clone();

        let entry = self.render.matrices.depth();
        if !self.render.matrices.push_unit() {
            let remaining = self.items[idx].mesh_bits;
            return Explosion { remaining, finished: remaining & object.mesh_mask() == 0 };
        }
        {
            let stack = &mut self.render.matrices;
            stack.top_mut().clear_translation();
            stack.rot_yxz(item_pos.y_rot, item_pos.x_rot, item_pos.z_rot);
            stack.translate_rel(frame.offset.x as i32, frame.offset.y as i32, frame.offset.z as i32);
            stack.rot_xyz16(&frame.mesh_rot(0));
        }

        let mut bit = 1u32;
        self.spawn_body_part(idx, bit, mesh_bits, damage, object.mesh_index);

        for i in 1..object.mesh_count {
            let Some(bone) = self.bones.get(object.bone_index + i - 1).copied() else {
                break;
            };
            self.apply_bone(&bone, entry + 1, false);
            self.render.matrices.rot_xyz16(&frame.mesh_rot(i));

            bit = bit.checked_shl(1).unwrap_or(0);
            self.spawn_body_part(idx, bit, mesh_bits, damage, object.mesh_index + i);
        }

        self.restore_stack(entry, entry + 1);

        let remaining = self.items[idx].mesh_bits;
        let finished = remaining & object.mesh_mask() == 0;
        if finished {
            debug!("item {} fully exploded", idx);
        }
        Explosion { remaining, finished }
    }

    fn spawn_body_part(&mut self, idx: usize, bit: u32, mesh_bits: u32, damage: i16, mesh: usize) {
        let item = &self.items[idx];
        if bit & mesh_bits == 0 || bit & item.mesh_bits == 0 {
            return;
        }
        let room = item.room;
        let weak = item.object_type == ObjectType::Torso;
        let local = self.render.matrices.top().translation();
        let origin = item.pos;

        if let Some(fx_idx) = self.effects.create(room) {
            let y_rot = ((self.rng.get_control() - 0x4000) * 2) as i16;
            let (speed, fall_speed) = if weak {
                (self.rng.get_control() >> 7, (-self.rng.get_control()) >> 7)
            } else {
                (self.rng.get_control() >> 8, (-self.rng.get_control()) >> 8)
            };

            if let Some(fx) = self.effects.get_mut(fx_idx) {
                fx.pos = Pos3d {
                    x: origin.x + local.x,
                    y: origin.y + local.y,
                    z: origin.z + local.z,
                    x_rot: 0,
                    y_rot,
                    z_rot: 0,
                };
                fx.room = room;
                fx.speed = speed as i16;
                fx.fall_speed = fall_speed as i16;
                fx.counter = damage;
                fx.frame_number = mesh;
                fx.object_type = ObjectType::BodyPart;
            }
        }

        self.items[idx].mesh_bits &= !bit;
    }
}
