// lightning.rs — lightning emitter: strike timing, targeting and bolt geometry
//
// The emitter idles until triggered, then alternates between a short
// strike and a random cooldown. While striking, every bolt sample carries
// a wobble offset that keeps accumulating from frame to frame.

use log::{debug, warn};

use trx_common::types::{Xyz32, WALL_L};
use trx_renderer::RenderBackend;

use crate::g_local::{GameContext, LARA_HIT_FRAME_MAX};
use crate::items::{ItemData, ItemStatus};

pub const LIGHTNING_DAMAGE: i16 = 400;
pub const LIGHTNING_STEPS: usize = 8;
/// Wobble step per random draw, in matrix scale.
pub const LIGHTNING_RND: i32 = 32;
pub const LIGHTNING_SHOOTS: usize = 2;

const STRIKE_FRAMES: i32 = 20;
const COOLDOWN_MIN: i32 = 35;
const COOLDOWN_SPREAD: i32 = 45;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightningState {
    pub on: bool,
    pub count: i32,
    pub zapped: bool,
    /// No dedicated target mesh; strikes go to the floor.
    pub no_target: bool,
    pub target: Xyz32,
    /// View-space sample points of the main bolt from the last draw.
    pub main: [Xyz32; LIGHTNING_STEPS],
    pub wibble: [Xyz32; LIGHTNING_STEPS],
    pub start: [usize; LIGHTNING_SHOOTS],
    pub end: [Xyz32; LIGHTNING_SHOOTS],
    pub shoot: [[Xyz32; LIGHTNING_STEPS]; LIGHTNING_SHOOTS],
}

/// Add one random step to each wobble offset. The last sample's vertical
/// offset is pinned to zero.
pub fn advance_wobble(wibble: &mut [Xyz32], mut draw: impl FnMut() -> i32) {
    let last = wibble.len().saturating_sub(1);
    for (i, w) in wibble.iter_mut().enumerate() {
        w.x = w.x.wrapping_add((draw() - 0x4000) * LIGHTNING_RND);
        w.y = w.y.wrapping_add((draw() - 0x4000) * LIGHTNING_RND);
        w.z = w.z.wrapping_add((draw() - 0x4000) * LIGHTNING_RND);
        if i == last {
            w.y = 0;
        }
    }
}

impl GameContext {
    fn take_lightning(&mut self, idx: usize) -> Option<Box<LightningState>> {
        match std::mem::take(&mut self.items[idx].data) {
            ItemData::Lightning(l) => Some(l),
            other => {
                warn!("item {} has no lightning state", idx);
                self.items[idx].data = other;
                None
            }
        }
    }

    fn put_lightning(&mut self, idx: usize, l: Box<LightningState>) {
        self.items[idx].data = ItemData::Lightning(l);
    }

    fn draw_segment(&self, backend: &mut dyn RenderBackend, a: Xyz32, b: Xyz32, width: i32) {
        self.render.draw_lightning_segment(backend, &a, &b, width);
    }

    /// Draw `steps` wobbled segments from `from` towards `to`, writing the
    /// perturbed sample points into `samples`.
    fn draw_bolt(
        &mut self,
        backend: &mut dyn RenderBackend,
        from: Xyz32,
        to: Xyz32,
        wibble: &mut [Xyz32],
        mut samples: Option<&mut [Xyz32; LIGHTNING_STEPS]>,
        width: i32,
    ) {
        let steps = wibble.len() as i32;
        if steps == 0 {
            return;
        }
        let dx = (to.x - from.x) / steps;
        let dy = (to.y - from.y) / steps;
        let dz = (to.z - from.z) / steps;

        let rng = &mut self.rng;
        advance_wobble(wibble, || rng.get_draw());

        let (mut x1, mut y1, mut z1) = (from.x, from.y, from.z);
        for i in 0..wibble.len() {
            let w = wibble[i];
            let p2 = Xyz32::new(x1 + dx + w.x, y1 + dy + w.y, z1 + dz + w.z);
            let start_y = if i > 0 { y1 + wibble[i - 1].y } else { y1 };
            self.draw_segment(backend, Xyz32::new(x1, start_y, z1), p2, width);

            x1 = p2.x;
            y1 += dy;
            z1 = p2.z;
            if let Some(samples) = samples.as_deref_mut() {
                samples[i] = p2;
            }
        }
    }
}

// ============================================================
// Object routines
// ============================================================

pub fn initialise_lightning(ctx: &mut GameContext, idx: usize) {
    let multi_mesh = ctx.object(ctx.items[idx].object_type).mesh_count > 1;
    if multi_mesh {
        ctx.items[idx].mesh_bits = 1;
    }

    ctx.items[idx].data = ItemData::Lightning(Box::new(LightningState {
        count: 1,
        no_target: !multi_mesh,
        ..Default::default()
    }));
}

pub fn lightning_control(ctx: &mut GameContext, idx: usize) {
    let Some(mut l) = ctx.take_lightning(idx) else {
        return;
    };

    if !ctx.trigger_active(idx) {
        l.count = 1;
        l.on = false;
        l.zapped = false;
        if ctx.flip_status {
            ctx.flip_map();
        }
        ctx.put_lightning(idx, l);
        ctx.remove_active_item(idx);
        ctx.items[idx].status = ItemStatus::NotActive;
        return;
    }

    l.count -= 1;
    if l.count > 0 {
        ctx.put_lightning(idx, l);
        return;
    }

    if l.on {
        l.on = false;
        l.count = COOLDOWN_MIN + ctx.rng.get_control() * COOLDOWN_SPREAD / 0x8000;
        l.zapped = false;
        debug!("lightning {} cooling down for {} frames", idx, l.count);
        if ctx.flip_status {
            ctx.flip_map();
        }
    } else {
        l.on = true;
        l.count = STRIKE_FRAMES;
        l.wibble = [Xyz32::ZERO; LIGHTNING_STEPS];

        let pos = ctx.items[idx].pos;
        let radius = if l.no_target { WALL_L } else { WALL_L * 5 / 2 };
        let lara_idx = ctx.lara.item_number.filter(|_| ctx.item_near_lara(&pos, radius));

        if let Some(lara_idx) = lara_idx {
            let lara = &mut ctx.items[lara_idx];
            l.target = lara.pos.xyz();
            lara.hit_points = lara.hit_points.saturating_sub(LIGHTNING_DAMAGE);
            lara.hit_status = true;
            l.zapped = true;
        } else if l.no_target {
            let mut room = ctx.items[idx].room;
            let floor = ctx.level.floor_height(pos.x, pos.y, pos.z, &mut room);
            ctx.items[idx].room = room;
            l.target = Xyz32::new(pos.x, floor, pos.z);
            l.zapped = false;
        } else {
            let joint = 1 + (ctx.rng.get_control() * 5 / 0x7FFF) as usize;
            l.target = ctx.get_joint_abs_position(idx, Xyz32::ZERO, joint);
            l.zapped = false;
        }

        for i in 0..LIGHTNING_SHOOTS {
            l.start[i] = (ctx.rng.get_control() * (LIGHTNING_STEPS as i32 - 1) / 0x7FFF) as usize;
            l.end[i] = Xyz32::new(
                l.target.x + ctx.rng.get_control() * WALL_L / 0x7FFF,
                l.target.y,
                l.target.z + ctx.rng.get_control() * WALL_L / 0x7FFF,
            );
            l.shoot[i] = [Xyz32::ZERO; LIGHTNING_STEPS];
        }

        debug!("lightning {} strikes {:?} (zapped {})", idx, l.target, l.zapped);
        if !ctx.flip_status {
            ctx.flip_map();
        }
    }

    ctx.put_lightning(idx, l);
}

pub fn lightning_collision(ctx: &mut GameContext, idx: usize) {
    let zapped = matches!(&ctx.items[idx].data, ItemData::Lightning(l) if l.zapped);
    if !zapped {
        return;
    }

    ctx.lara.hit_direction = 1 + ctx.rng.get_control() * 4 / 0x7FFF;
    ctx.lara.hit_frame = (ctx.lara.hit_frame + 1).min(LARA_HIT_FRAME_MAX);
}

pub fn draw_lightning(ctx: &mut GameContext, backend: &mut dyn RenderBackend, idx: usize) {
    let item_pos = ctx.items[idx].pos;
    let object = *ctx.object(ctx.items[idx].object_type);
    let pair = ctx.anims.get_frames(ctx.items[idx].anim_number, ctx.items[idx].frame_number);
    let frame = ctx.anims.frame(pair.frames[0]).clone();

    let entry = ctx.render.matrices.depth();
    if !ctx.render.matrices.push() {
        return;
    }
    ctx.render.matrices.translate_abs(item_pos.x, item_pos.y, item_pos.z);
    ctx.render.matrices.rot_yxz(item_pos.y_rot, item_pos.x_rot, item_pos.z_rot);

    let clip = ctx.render.classify_bounds(&frame.bounds);
    if !clip.is_visible() {
        ctx.render.matrices.pop_to(entry);
        return;
    }

    ctx.render.matrices.translate_rel(frame.offset.x as i32, frame.offset.y as i32, frame.offset.z as i32);
    let origin = {
        let m = ctx.render.matrices.top();
        Xyz32::new(m.m03, m.m13, m.m23)
    };
    backend.put_polygons(object.mesh_index, ctx.render.matrices.top(), clip);
    ctx.render.matrices.pop_to(entry);

    let Some(mut l) = ctx.take_lightning(idx) else {
        return;
    };
    if !l.on {
        ctx.put_lightning(idx, l);
        return;
    }

    let main_width = ctx.render.viewport.width / 6;
    let branch_width = ctx.render.viewport.width / 16;

    if ctx.render.matrices.push() {
        let target = ctx.view_position(&l.target, &item_pos);
        let LightningState { main, wibble, .. } = &mut *l;
        ctx.draw_bolt(backend, origin, target, wibble, Some(main), main_width);
    }

    for i in 0..LIGHTNING_SHOOTS {
        let start = l.start[i].min(LIGHTNING_STEPS - 1);
        let from = l.main[start];
        let steps = LIGHTNING_STEPS - start;

        ctx.render.matrices.pop_to(entry);
        if !ctx.render.matrices.push() {
            break;
        }
        let end = ctx.view_position(&l.end[i], &item_pos);
        ctx.draw_bolt(backend, from, end, &mut l.shoot[i][..steps], None, branch_width);
    }

    ctx.render.matrices.pop_to(entry);
    ctx.put_lightning(idx, l);
}

impl GameContext {
    /// View-space translation of a world point under the item's rotation.
    fn view_position(&mut self, world: &Xyz32, item_pos: &trx_common::types::Pos3d) -> Xyz32 {
        let stack = &mut self.render.matrices;
        stack.translate_abs(world.x, world.y, world.z);
        stack.rot_yxz(item_pos.y_rot, item_pos.x_rot, item_pos.z_rot);
        let m = stack.top();
        Xyz32::new(m.m03, m.m13, m.m23)
    }
}
