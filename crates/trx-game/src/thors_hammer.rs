// thors_hammer.rs — the hammer handle and the head it carries

use log::warn;

use crate::g_local::GameContext;
use crate::items::{ItemData, ObjectType};

/// Create the head item alongside a freshly placed handle and link the two.
pub fn initialise_thors_handle(ctx: &mut GameContext, idx: usize) {
    let Some(head_idx) = ctx.create_item() else {
        warn!("no item slot for the head of hammer handle {}", idx);
        return;
    };

    let handle = &ctx.items[idx];
    let (room, pos, shade) = (handle.room, handle.pos, handle.shade);

    let head = &mut ctx.items[head_idx];
    head.object_type = ObjectType::ThorsHead;
    head.room = room;
    head.pos = pos;
    head.shade = shade;
    ctx.initialise_item(head_idx);

    ctx.items[idx].data = ItemData::Linked(head_idx);
    ctx.level_item_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::MAX_ITEMS;
    use crate::test_support::{self, FixedRandom};
    use trx_common::types::Pos3d;

    #[test]
    fn test_handle_spawns_linked_head() {
        let mut ctx = test_support::context(FixedRandom::new(0));
        let count = ctx.level_item_count;
        let items = ctx.items.len();

        let idx = ctx.create_item().unwrap();
        ctx.items[idx].object_type = ObjectType::ThorsHandle;
        ctx.items[idx].pos = Pos3d { y_rot: 0x2000, ..Pos3d::at(512, -256, 3072) };
        ctx.items[idx].room = 7;
        ctx.items[idx].shade = 0x1200;
        ctx.initialise_item(idx);

        let ItemData::Linked(head_idx) = ctx.items[idx].data else {
            panic!("handle not linked");
        };
        assert_eq!(ctx.items.len(), items + 2);
        assert_eq!(ctx.level_item_count, count + 1);

        let head = &ctx.items[head_idx];
        assert_eq!(head.object_type, ObjectType::ThorsHead);
        assert_eq!(head.pos, ctx.items[idx].pos);
        assert_eq!(head.room, 7);
        assert_eq!(head.shade, 0x1200);
        // fully initialised like any placed item
        assert_eq!(head.mesh_bits, u32::MAX);
        assert_eq!(head.floor, test_support::FLOOR);
    }

    #[test]
    fn test_handle_without_free_slot_stays_unlinked() {
        let mut ctx = test_support::context(FixedRandom::new(0));
        while ctx.items.len() < MAX_ITEMS - 1 {
            ctx.create_item();
        }
        let count = ctx.level_item_count;

        let idx = test_support::spawn(&mut ctx, ObjectType::ThorsHandle, Pos3d::at(0, 0, 0));
        assert!(matches!(ctx.items[idx].data, ItemData::None));
        assert_eq!(ctx.level_item_count, count);
        assert_eq!(ctx.items.len(), MAX_ITEMS);
    }
}
