// setup.rs — per-type behaviour tables and level object loading
//
// Behaviour is attached as plain fn pointers on `ObjectInfo`; items look
// their routines up by type each frame, so nothing holds a borrow of the
// context between calls.

use log::{info, warn};

use trx_common::anims::{parse_bones, Anim, AnimError, AnimStore};

use crate::g_local::GameContext;
use crate::items::ObjectType;
use crate::lightning::{draw_lightning, initialise_lightning, lightning_collision, lightning_control};
use crate::thors_hammer::initialise_thors_handle;

/// Where one object type's meshes, bones and first animation live in the
/// level's shared tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectLayout {
    pub object_type: ObjectType,
    pub mesh_count: usize,
    pub mesh_index: usize,
    pub bone_index: usize,
    pub anim_index: usize,
    pub hit_points: i16,
    pub shadow_size: i32,
}

/// Attach control, collision and draw routines to every object type that
/// has them.
pub fn setup_objects(ctx: &mut GameContext) {
    let obj = ctx.object_mut(ObjectType::LightningEmitter);
    obj.initialise = Some(initialise_lightning);
    obj.control = Some(lightning_control);
    obj.collision = Some(lightning_collision);
    obj.draw = Some(draw_lightning);

    let obj = ctx.object_mut(ObjectType::ThorsHandle);
    obj.initialise = Some(initialise_thors_handle);
}

impl GameContext {
    /// Replace the level's animation and bone tables and mark the listed
    /// object types as loaded.
    pub fn load_objects(
        &mut self,
        layouts: &[ObjectLayout],
        anims: Vec<Anim>,
        frame_data: &[i16],
        bone_data: &[i32],
    ) -> Result<(), AnimError> {
        let store = AnimStore::load(anims, frame_data)?;
        let bones = parse_bones(bone_data)?;

        for layout in layouts {
            if layout.mesh_count > 1 && layout.bone_index + layout.mesh_count - 1 > bones.len() {
                warn!(
                    "{:?} needs {} bones from {} but only {} exist",
                    layout.object_type,
                    layout.mesh_count - 1,
                    layout.bone_index,
                    bones.len()
                );
            }
            if layout.anim_index >= store.anims.len() {
                warn!("{:?} starts at missing anim {}", layout.object_type, layout.anim_index);
                continue;
            }

            let obj = self.object_mut(layout.object_type);
            obj.loaded = true;
            obj.mesh_count = layout.mesh_count;
            obj.mesh_index = layout.mesh_index;
            obj.bone_index = layout.bone_index;
            obj.anim_index = layout.anim_index;
            obj.hit_points = layout.hit_points;
            obj.shadow_size = layout.shadow_size;
        }

        info!("{} objects, {} bones", layouts.len(), bones.len());
        self.anims = store;
        self.bones = bones;
        setup_objects(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level_import::StubLevelImport;
    use crate::test_support::FixedRandom;

    fn bare_context() -> GameContext {
        GameContext::new(Box::new(StubLevelImport::default()), Box::new(FixedRandom::new(0)), 640, 480)
    }

    fn one_frame() -> Vec<i16> {
        vec![-10, 10, -20, 0, -10, 10, 0, 0, 0, 1, 0, 0]
    }

    #[test]
    fn test_setup_objects_attaches_routines() {
        let mut ctx = bare_context();
        setup_objects(&mut ctx);

        let lightning = ctx.object(ObjectType::LightningEmitter);
        assert!(lightning.initialise.is_some());
        assert!(lightning.control.is_some());
        assert!(lightning.collision.is_some());
        assert!(lightning.draw.is_some());

        let handle = ctx.object(ObjectType::ThorsHandle);
        assert!(handle.initialise.is_some());
        assert!(handle.draw.is_none());
        assert!(ctx.object(ObjectType::Torso).control.is_none());
    }

    #[test]
    fn test_load_objects_marks_loaded() {
        let mut ctx = bare_context();
        let layouts = [ObjectLayout {
            object_type: ObjectType::Torso,
            mesh_count: 2,
            mesh_index: 4,
            bone_index: 0,
            anim_index: 0,
            hit_points: 500,
            shadow_size: 0,
        }];
        ctx.load_objects(&layouts, vec![Anim::new(0, 0, 0, 1)], &one_frame(), &[0, 0, -50, 0])
            .unwrap();

        let torso = ctx.object(ObjectType::Torso);
        assert!(torso.loaded);
        assert_eq!(torso.mesh_index, 4);
        assert_eq!(torso.hit_points, 500);
        assert!(!ctx.object(ObjectType::ThorsHead).loaded);
        assert_eq!(ctx.bones.len(), 1);
        assert_eq!(ctx.anims.frames.len(), 1);
        assert!(ctx.object(ObjectType::LightningEmitter).control.is_some());
    }

    #[test]
    fn test_load_objects_skips_missing_anim() {
        let mut ctx = bare_context();
        let layouts = [ObjectLayout { object_type: ObjectType::Torso, anim_index: 3, ..Default::default() }];
        ctx.load_objects(&layouts, vec![Anim::new(0, 0, 0, 1)], &one_frame(), &[]).unwrap();
        assert!(!ctx.object(ObjectType::Torso).loaded);
    }

    #[test]
    fn test_load_objects_rejects_bad_bone_data() {
        let mut ctx = bare_context();
        let err = ctx.load_objects(&[], vec![Anim::new(0, 0, 0, 1)], &one_frame(), &[1, 2, 3]);
        assert_eq!(err, Err(AnimError::BadBoneData(3)));
    }

    #[test]
    fn test_load_objects_rejects_truncated_frames() {
        let mut ctx = bare_context();
        let err = ctx.load_objects(&[], vec![Anim::new(0, 0, 0, 1)], &one_frame()[..8], &[]);
        assert_eq!(err, Err(AnimError::Truncated(8)));
    }
}
