// test_support.rs — a small flat level with one object of every type

use trx_common::anims::{Anim, BoneFlags};
use trx_common::random::RandomSource;
use trx_common::types::Pos3d;

use crate::g_local::GameContext;
use crate::items::ObjectType;
use crate::level_import::StubLevelImport;
use crate::setup::ObjectLayout;

pub const FLOOR: i32 = 0;
pub const TORSO_RATE: i32 = 4;
/// Root height change between the torso's two keyframes.
pub const TORSO_LIFT: i32 = 100;

/// Both streams always return the same value.
pub struct FixedRandom(i32);

impl FixedRandom {
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

impl RandomSource for FixedRandom {
    fn get_control(&mut self) -> i32 {
        self.0
    }

    fn get_draw(&mut self) -> i32 {
        self.0
    }
}

/// Each stream cycles through the same list independently.
pub struct SequenceRandom {
    values: Vec<i32>,
    control: usize,
    draw: usize,
}

impl SequenceRandom {
    pub fn new(values: &[i32]) -> Self {
        assert!(!values.is_empty());
        Self { values: values.to_vec(), control: 0, draw: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn get_control(&mut self) -> i32 {
        let v = self.values[self.control % self.values.len()];
        self.control += 1;
        v
    }

    fn get_draw(&mut self) -> i32 {
        let v = self.values[self.draw % self.values.len()];
        self.draw += 1;
        v
    }
}

fn push_frame(data: &mut Vec<i16>, bounds: [i16; 6], offset_y: i16, meshes: usize) -> usize {
    let start = data.len();
    data.extend_from_slice(&bounds);
    data.extend_from_slice(&[0, offset_y, 0]);
    data.push(meshes as i16);
    data.extend(std::iter::repeat(0).take(meshes * 2));
    start
}

fn push_bones(data: &mut Vec<i32>, count: usize, y: i32) -> usize {
    let start = data.len() / 4;
    for _ in 0..count {
        data.extend_from_slice(&[BoneFlags::empty().bits(), 0, y, 0]);
    }
    start
}

fn layouts(bone_data: &mut Vec<i32>) -> [ObjectLayout; 5] {
    let torso_bones = push_bones(bone_data, 2, -TORSO_LIFT);
    let emitter_bones = push_bones(bone_data, 5, -200);
    let head_bones = push_bones(bone_data, 5, -50);

    let layout = |object_type, mesh_index, mesh_count, bone_index, anim_index, hit_points| ObjectLayout {
        object_type,
        mesh_count,
        mesh_index,
        bone_index,
        anim_index,
        hit_points,
        shadow_size: 0,
    };
    [
        layout(ObjectType::Lara, 0, 1, 0, 0, 1000),
        layout(ObjectType::Torso, 1, 3, torso_bones, 1, 500),
        layout(ObjectType::LightningEmitter, 4, 6, emitter_bones, 2, 0),
        layout(ObjectType::ThorsHandle, 10, 1, 0, 3, 0),
        layout(ObjectType::ThorsHead, 11, 6, head_bones, 4, 0),
    ]
}

pub fn context<R: RandomSource + 'static>(rng: R) -> GameContext {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut ctx = GameContext::new(Box::new(StubLevelImport::with_floor(FLOOR)), Box::new(rng), 640, 480);

    let mut frames = Vec::new();
    let lara = push_frame(&mut frames, [-100, 100, -762, 0, -100, 100], 0, 1);
    let torso = push_frame(&mut frames, [-200, 200, -400, 0, -200, 200], 0, 3);
    push_frame(&mut frames, [-200, 200, -400, 0, -200, 200], -TORSO_LIFT as i16, 3);
    let emitter = push_frame(&mut frames, [-100, 100, -100, 100, -100, 100], 0, 1);
    let handle = push_frame(&mut frames, [-100, 100, -100, 100, -100, 100], 0, 1);
    let head = push_frame(&mut frames, [-200, 200, -200, 200, -200, 200], 0, 6);

    let anims = vec![
        Anim::new(lara, 0, 0, 1),
        Anim::new(torso, 0, TORSO_RATE as i16, TORSO_RATE as i16),
        Anim::new(emitter, 0, 0, 1),
        Anim::new(handle, 0, 0, 1),
        Anim::new(head, 0, 0, 1),
    ];

    let mut bones = Vec::new();
    let layouts = layouts(&mut bones);
    ctx.load_objects(&layouts, anims, &frames, &bones).expect("test level data");

    let lara = spawn(&mut ctx, ObjectType::Lara, Pos3d::at(0, 0, 0));
    ctx.lara.item_number = Some(lara);
    ctx.level_item_count = 1;
    ctx
}

pub fn spawn(ctx: &mut GameContext, ty: ObjectType, pos: Pos3d) -> usize {
    let idx = ctx.create_item().expect("item slot");
    ctx.items[idx].object_type = ty;
    ctx.items[idx].pos = pos;
    ctx.initialise_item(idx);
    idx
}
