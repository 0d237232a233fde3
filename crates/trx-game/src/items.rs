// items.rs — placed entities, per-type object info, and trigger state

use trx_common::types::Pos3d;

use crate::g_local::GameContext;
use crate::lightning::LightningState;

pub const MAX_ITEMS: usize = 256;

/// Entity types with behaviour in this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObjectType {
    #[default]
    Lara,
    /// The final-level mutant torso; its body parts fly further.
    Torso,
    LightningEmitter,
    ThorsHandle,
    ThorsHead,
    BodyPart,
}

impl ObjectType {
    pub const COUNT: usize = 6;

    pub const ALL: [ObjectType; Self::COUNT] = [
        ObjectType::Lara,
        ObjectType::Torso,
        ObjectType::LightningEmitter,
        ObjectType::ThorsHandle,
        ObjectType::ThorsHead,
        ObjectType::BodyPart,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ItemFlags: u16 {
        const ONESHOT   = 0x0100;
        /// All five trigger code bits; the item runs only when every one is set.
        const CODE_BITS = 0x3E00;
        const REVERSE   = 0x4000;
        const KILLED    = 0x8000;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemStatus {
    #[default]
    NotActive,
    Active,
    Deactivated,
    Invisible,
}

/// Per-type behaviour attached to an item.
#[derive(Debug, Default)]
pub enum ItemData {
    #[default]
    None,
    Lightning(Box<LightningState>),
    /// Index of a companion item created alongside this one.
    Linked(usize),
}

#[derive(Debug, Default)]
pub struct Item {
    pub object_type: ObjectType,
    pub room: i16,
    pub pos: Pos3d,
    pub anim_number: usize,
    pub frame_number: i16,
    pub mesh_bits: u32,
    pub hit_points: i16,
    pub hit_status: bool,
    pub floor: i32,
    pub shade: i16,
    pub flags: ItemFlags,
    pub timer: i16,
    pub status: ItemStatus,
    pub active: bool,
    pub data: ItemData,
}

pub type ItemFn = fn(&mut GameContext, usize);
pub type DrawFn = fn(&mut GameContext, &mut dyn trx_renderer::RenderBackend, usize);

/// Static data and behaviour shared by every item of one type.
#[derive(Clone, Copy, Default)]
pub struct ObjectInfo {
    pub loaded: bool,
    pub mesh_count: usize,
    pub mesh_index: usize,
    pub bone_index: usize,
    pub anim_index: usize,
    pub shadow_size: i32,
    pub hit_points: i16,
    pub initialise: Option<ItemFn>,
    pub control: Option<ItemFn>,
    pub collision: Option<ItemFn>,
    pub draw: Option<DrawFn>,
}

impl ObjectInfo {
    /// Mask covering every mesh segment of the type.
    pub fn mesh_mask(&self) -> u32 {
        if self.mesh_count >= 32 {
            u32::MAX
        } else {
            (1u32 << self.mesh_count) - 1
        }
    }
}

/// Whether the item's trigger is currently holding it on. Counts the timer
/// down as a side effect; an expired timer latches at -1.
pub fn trigger_active(item: &mut Item) -> bool {
    let ok = !item.flags.contains(ItemFlags::REVERSE);

    if !item.flags.contains(ItemFlags::CODE_BITS) {
        return !ok;
    }

    if item.timer == 0 {
        return ok;
    }

    if item.timer == -1 {
        return !ok;
    }

    item.timer -= 1;
    if item.timer == 0 {
        item.timer = -1;
    }

    ok
}
