// g_local.rs — game state shared by every control and draw routine

use log::{debug, warn};

use trx_common::anims::{AnimStore, Bone, BoneFlags};
use trx_common::config::Config;
use trx_common::cvar::CvarContext;
use trx_common::random::{seed_shared, seed_shared_from_entropy, RandomSource, SharedRandom};
use trx_common::types::{Pos3d, Xyz32, WALL_L};
use trx_renderer::{RenderBackend, RenderContext};

use crate::effects::EffectPool;
use crate::items::{trigger_active, Item, ItemFlags, ItemStatus, ObjectInfo, ObjectType, MAX_ITEMS};
use crate::level_import::LevelImport;

pub const LARA_HIT_FRAME_MAX: i32 = 34;

/// Player-side state that effects poke at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaraInfo {
    pub item_number: Option<usize>,
    pub hit_direction: i32,
    pub hit_frame: i32,
}

/// All game state for one level, passed by `&mut` instead of globals.
pub struct GameContext {
    pub items: Vec<Item>,
    pub objects: [ObjectInfo; ObjectType::COUNT],
    pub bones: Vec<Bone>,
    pub anims: AnimStore,
    pub effects: EffectPool,
    pub lara: LaraInfo,
    pub rng: Box<dyn RandomSource>,
    pub level: Box<dyn LevelImport>,
    pub render: RenderContext,
    pub cvars: CvarContext,
    pub flip_status: bool,
    pub level_item_count: usize,
}

impl GameContext {
    pub fn new(level: Box<dyn LevelImport>, rng: Box<dyn RandomSource>, width: i32, height: i32) -> Self {
        let mut cvars = CvarContext::new();
        Config::register(&mut cvars);
        let config = Config::from_cvars(&cvars);

        Self {
            items: Vec::with_capacity(MAX_ITEMS),
            objects: [ObjectInfo::default(); ObjectType::COUNT],
            bones: Vec::new(),
            anims: AnimStore::default(),
            effects: EffectPool::default(),
            lara: LaraInfo::default(),
            rng,
            level,
            render: RenderContext::new(width, height, config),
            cvars,
            flip_status: false,
            level_item_count: 0,
        }
    }

    /// Context drawing from the process-wide stream, freshly seeded from
    /// system entropy.
    pub fn with_level(level: Box<dyn LevelImport>, width: i32, height: i32) -> Self {
        seed_shared_from_entropy();
        Self::new(level, Box::new(SharedRandom), width, height)
    }

    /// Reseed the process-wide stream, for replays.
    pub fn seed_random(&mut self, control_seed: i32, draw_seed: i32) {
        seed_shared(control_seed, draw_seed);
    }

    pub fn object(&self, ty: ObjectType) -> &ObjectInfo {
        &self.objects[ty.index()]
    }

    pub fn object_mut(&mut self, ty: ObjectType) -> &mut ObjectInfo {
        &mut self.objects[ty.index()]
    }

    /// Run a config script and push the resulting settings to the renderer.
    pub fn exec_config(&mut self, text: &str) {
        self.cvars.exec_config(text);
        self.render.apply_config(Config::from_cvars(&self.cvars));
    }

    // ============================================================
    // Item lifecycle
    // ============================================================

    pub fn create_item(&mut self) -> Option<usize> {
        if self.items.len() >= MAX_ITEMS {
            warn!("item limit of {} reached", MAX_ITEMS);
            return None;
        }
        self.items.push(Item::default());
        Some(self.items.len() - 1)
    }

    /// Apply per-type defaults, place the item on the floor, then run the
    /// type's own initialiser.
    pub fn initialise_item(&mut self, idx: usize) {
        let object = *self.object(self.items[idx].object_type);
        let frame_base = self
            .anims
            .anims
            .get(object.anim_index)
            .map_or(0, |anim| anim.frame_base);

        let item = &mut self.items[idx];
        item.anim_number = object.anim_index;
        item.frame_number = frame_base;
        item.mesh_bits = u32::MAX;
        item.hit_points = object.hit_points;
        item.hit_status = false;
        item.timer = 0;
        item.active = false;
        item.status = ItemStatus::NotActive;
        item.data = Default::default();

        if item.flags.contains(ItemFlags::CODE_BITS) {
            item.flags.remove(ItemFlags::CODE_BITS);
            item.flags.insert(ItemFlags::REVERSE);
            item.active = true;
            item.status = ItemStatus::Active;
        }

        let mut room = item.room;
        item.floor = self.level.floor_height(item.pos.x, item.pos.y, item.pos.z, &mut room);
        item.room = room;

        if let Some(init) = object.initialise {
            init(self, idx);
        }
    }

    pub fn add_active_item(&mut self, idx: usize) {
        let item = &mut self.items[idx];
        item.status = ItemStatus::Active;
        item.active = true;
    }

    pub fn remove_active_item(&mut self, idx: usize) {
        self.items[idx].active = false;
    }

    pub fn trigger_active(&mut self, idx: usize) -> bool {
        trigger_active(&mut self.items[idx])
    }

    pub fn flip_map(&mut self) {
        self.level.flip_map();
        self.flip_status = !self.flip_status;
        debug!("flip map -> {}", self.flip_status);
    }

    // ============================================================
    // Per-frame phases
    // ============================================================

    /// Run the control routine of every active item.
    pub fn control_active_items(&mut self) {
        for idx in 0..self.items.len() {
            if !self.items[idx].active {
                continue;
            }
            let control = self.object(self.items[idx].object_type).control;
            if let Some(control) = control {
                control(self, idx);
            }
        }
    }

    /// Collision routines of every item, as tested against Lara.
    pub fn collide_items(&mut self) {
        for idx in 0..self.items.len() {
            if Some(idx) == self.lara.item_number {
                continue;
            }
            let collision = self.object(self.items[idx].object_type).collision;
            if let Some(collision) = collision {
                collision(self, idx);
            }
        }
    }

    /// Draw every visible item through its type's routine.
    pub fn draw_items(&mut self, backend: &mut dyn RenderBackend) {
        for idx in 0..self.items.len() {
            if self.items[idx].status == ItemStatus::Invisible {
                continue;
            }
            let object = *self.object(self.items[idx].object_type);
            if !object.loaded {
                continue;
            }
            match object.draw {
                Some(draw) => draw(self, backend, idx),
                None => self.draw_animating_item(backend, idx),
            }
        }
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Whether Lara stands within `radius` of `pos` horizontally, within
    /// three sectors vertically, and inside her own frame's height.
    pub fn item_near_lara(&self, pos: &Pos3d, radius: i32) -> bool {
        let Some(lara_idx) = self.lara.item_number else {
            return false;
        };
        let lara = &self.items[lara_idx];

        let x = pos.x as i64 - lara.pos.x as i64;
        let y = pos.y as i64 - lara.pos.y as i64;
        let z = pos.z as i64 - lara.pos.z as i64;
        let r = radius as i64;

        if x < -r || x > r || z < -r || z > r {
            return false;
        }
        if y < -(WALL_L as i64) * 3 || y > WALL_L as i64 * 3 {
            return false;
        }
        if x * x + z * z > r * r {
            return false;
        }

        let bounds = self.anims.best_frame(lara.anim_number, lara.frame_number).bounds;
        y >= bounds.min.y as i64 && y <= bounds.max.y as i64 + 100
    }

    /// Apply one bone's stack flags and offset. Pops never go below
    /// `floor_depth`, so malformed flag sequences cannot unwind the caller.
    pub(crate) fn apply_bone(&mut self, bone: &Bone, floor_depth: usize, interpolated: bool) {
        let stack = &mut self.render.matrices;
        if bone.flags.contains(BoneFlags::POP) {
            if stack.depth() > floor_depth {
                if interpolated {
                    stack.pop_i();
                } else {
                    stack.pop();
                }
            } else {
                warn!("bone pop below traversal base at depth {}", stack.depth());
            }
        }
        if bone.flags.contains(BoneFlags::PUSH) {
            if interpolated {
                stack.push_i();
            } else {
                stack.push();
            }
        }

        let Xyz32 { x, y, z } = bone.offset;
        if interpolated {
            stack.translate_rel_i(x, y, z);
        } else {
            stack.translate_rel(x, y, z);
        }
    }

    /// Unwind the matrix stack to `depth`, warning when a traversal left
    /// extra entries behind.
    pub(crate) fn restore_stack(&mut self, depth: usize, expected: usize) {
        let stack = &mut self.render.matrices;
        if stack.depth() != expected {
            warn!("unbalanced bone traversal: depth {} expected {}", stack.depth(), expected);
        }
        stack.pop_to(depth);
    }

    /// World position of `offset` in the local frame of mesh `joint`.
    pub fn get_joint_abs_position(&mut self, idx: usize, offset: Xyz32, joint: usize) -> Xyz32 {
        let item_pos = self.items[idx].pos;
        let object = *self.object(self.items[idx].object_type);
        let frame = self.anims.best_frame(self.items[idx].anim_number, self.items[idx].frame_number).clone();

        let entry = self.render.matrices.depth();
        if !self.render.matrices.push_unit() {
            return item_pos.xyz();
        }
        {
            let stack = &mut self.render.matrices;
            stack.top_mut().clear_translation();
            stack.rot_yxz(item_pos.y_rot, item_pos.x_rot, item_pos.z_rot);
            stack.translate_rel(frame.offset.x as i32, frame.offset.y as i32, frame.offset.z as i32);
            stack.rot_xyz16(&frame.mesh_rot(0));
        }

        let joint = joint.min(object.mesh_count.saturating_sub(1));
        for i in 0..joint {
            let Some(bone) = self.bones.get(object.bone_index + i).copied() else {
                warn!("joint {} beyond bone data of {:?}", i + 1, self.items[idx].object_type);
                break;
            };
            self.apply_bone(&bone, entry + 1, false);
            self.render.matrices.rot_xyz16(&frame.mesh_rot(i + 1));
        }

        self.render.matrices.translate_rel(offset.x, offset.y, offset.z);
        let local = self.render.matrices.top().translation();
        self.render.matrices.pop_to(entry);

        Xyz32::new(local.x + item_pos.x, local.y + item_pos.y, local.z + item_pos.z)
    }
}
