// anims.rs — animation keyframes and bone hierarchy data
//
// Frames are stored as a flat i16 stream: six bound words, three offset
// words, a mesh count, then two words of packed rotation per mesh. Bones
// are a flat pre-order list whose POP/PUSH flags encode the tree.

use log::info;
use thiserror::Error;

use crate::types::{Bounds16, Xyz16, Xyz32};

const FRAME_HEADER_WORDS: usize = 10;
const BONE_WORDS: usize = 4;

/// Asset data that does not match the expected layout. Always fatal at load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnimError {
    #[error("frame data truncated at word {0}")]
    Truncated(usize),
    #[error("negative mesh count {count} at word {offset}")]
    BadMeshCount { count: i16, offset: usize },
    #[error("animation {0} has zero interpolation")]
    ZeroInterpolation(usize),
    #[error("animation {anim} ends before it starts ({base}..{end})")]
    BadFrameRange { anim: usize, base: i16, end: i16 },
    #[error("animation {anim} frame offset {offset} is outside the frame data")]
    BadFrameOffset { anim: usize, offset: usize },
    #[error("bone data length {0} is not a multiple of 4")]
    BadBoneData(usize),
}

// ============================================================
// Frames
// ============================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimFrame {
    pub bounds: Bounds16,
    pub offset: Xyz16,
    pub mesh_rots: Vec<Xyz16>,
}

/// Decode one mesh rotation from its high and low words.
pub fn extract_rotation(hi: i16, lo: i16) -> Xyz16 {
    let hi = hi as u16 as i32;
    let lo = lo as u16 as i32;
    Xyz16 {
        x: ((hi & 0x3FF0) << 2) as u16 as i16,
        y: ((((hi & 0xF) << 6) | ((lo & 0xFC00) >> 10)) << 6) as u16 as i16,
        z: ((lo & 0x3FF) << 6) as u16 as i16,
    }
}

/// Same decoding for a rotation already packed into one word.
pub fn unpack_rotation(packed: u32) -> Xyz16 {
    extract_rotation((packed >> 16) as u16 as i16, packed as u16 as i16)
}

impl AnimFrame {
    /// Parse one frame, returning it and the number of words consumed.
    pub fn parse(data: &[i16], start: usize) -> Result<(AnimFrame, usize), AnimError> {
        let header = data
            .get(start..start + FRAME_HEADER_WORDS)
            .ok_or(AnimError::Truncated(data.len()))?;

        let bounds = Bounds16 {
            min: Xyz16::new(header[0], header[2], header[4]),
            max: Xyz16::new(header[1], header[3], header[5]),
        };
        let offset = Xyz16::new(header[6], header[7], header[8]);
        let mesh_count = header[9];
        if mesh_count < 0 {
            return Err(AnimError::BadMeshCount { count: mesh_count, offset: start + 9 });
        }

        let rot_start = start + FRAME_HEADER_WORDS;
        let rot_end = rot_start + mesh_count as usize * 2;
        let rots = data.get(rot_start..rot_end).ok_or(AnimError::Truncated(data.len()))?;
        let mesh_rots = rots
            .chunks_exact(2)
            .map(|pair| extract_rotation(pair[1], pair[0]))
            .collect();

        Ok((AnimFrame { bounds, offset, mesh_rots }, rot_end - start))
    }

    pub fn mesh_rot(&self, mesh: usize) -> Xyz16 {
        self.mesh_rots.get(mesh).copied().unwrap_or_default()
    }
}

// ============================================================
// Animations
// ============================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anim {
    /// Word offset of the first frame in the raw frame stream.
    pub frame_ofs: usize,
    pub frame_base: i16,
    pub frame_end: i16,
    pub interpolation: i16,
    /// Index of the first parsed frame, filled in at load.
    pub frame_index: usize,
    pub frame_count: usize,
}

impl Anim {
    pub fn new(frame_ofs: usize, frame_base: i16, frame_end: i16, interpolation: i16) -> Self {
        Self { frame_ofs, frame_base, frame_end, interpolation, frame_index: 0, frame_count: 0 }
    }

    fn stored_frame_count(&self, idx: usize) -> Result<usize, AnimError> {
        if self.interpolation <= 0 {
            return Err(AnimError::ZeroInterpolation(idx));
        }
        let span = self.frame_end as i32 - self.frame_base as i32;
        if span < 0 {
            return Err(AnimError::BadFrameRange { anim: idx, base: self.frame_base, end: self.frame_end });
        }
        let rate = self.interpolation as i32;
        Ok(((span + rate - 1) / rate + 1) as usize)
    }
}

/// The two keyframes around a frame number plus the blend between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePair {
    pub frames: [usize; 2],
    pub frac: i32,
    pub rate: i32,
}

#[derive(Debug, Clone, Default)]
pub struct AnimStore {
    pub anims: Vec<Anim>,
    pub frames: Vec<AnimFrame>,
}

impl AnimStore {
    /// Parse every animation's keyframes out of the raw frame stream.
    pub fn load(mut anims: Vec<Anim>, data: &[i16]) -> Result<Self, AnimError> {
        let mut frames = Vec::new();

        for (idx, anim) in anims.iter_mut().enumerate() {
            let count = anim.stored_frame_count(idx)?;
            if anim.frame_ofs >= data.len() {
                return Err(AnimError::BadFrameOffset { anim: idx, offset: anim.frame_ofs });
            }

            anim.frame_index = frames.len();
            anim.frame_count = count;

            let mut pos = anim.frame_ofs;
            for _ in 0..count {
                let (frame, used) = AnimFrame::parse(data, pos)?;
                frames.push(frame);
                pos += used;
            }
        }

        info!("{} anims, {} anim frames", anims.len(), frames.len());
        Ok(Self { anims, frames })
    }

    pub fn frame(&self, idx: usize) -> &AnimFrame {
        &self.frames[idx]
    }

    pub fn get_frames(&self, anim_idx: usize, frame_number: i16) -> FramePair {
        let anim = &self.anims[anim_idx];
        let mut rate = (anim.interpolation as i32).max(1);
        let rel = (frame_number as i32 - anim.frame_base as i32).max(0);
        let first = (rel / rate) as usize;
        let frac = rel % rate;

        let last = anim.frame_index + anim.frame_count.saturating_sub(1);
        let f0 = (anim.frame_index + first).min(last);
        let f1 = (f0 + 1).min(last);

        if frac != 0 {
            // the final keyframe pair can be shorter than the nominal rate
            let span = anim.frame_end as i32 - anim.frame_base as i32;
            let second = first as i32 * rate + rate;
            if second > span {
                rate = (span - (second - rate)).max(1);
            }
        }

        FramePair { frames: [f0, f1], frac, rate }
    }

    /// Whichever keyframe the current frame number is closest to.
    pub fn best_frame(&self, anim_idx: usize, frame_number: i16) -> &AnimFrame {
        let pair = self.get_frames(anim_idx, frame_number);
        if pair.frac <= pair.rate / 2 {
            &self.frames[pair.frames[0]]
        } else {
            &self.frames[pair.frames[1]]
        }
    }
}

// ============================================================
// Bones
// ============================================================

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BoneFlags: i32 {
        const POP   = 0x01;
        const PUSH  = 0x02;
        const ROT_Y = 0x04;
        const ROT_X = 0x08;
        const ROT_Z = 0x10;
    }
}

/// Offset of a mesh segment from its parent, plus stack flags applied
/// before (POP) and after (PUSH) saving the parent transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bone {
    pub flags: BoneFlags,
    pub offset: Xyz32,
}

impl Bone {
    pub const fn new(flags: BoneFlags, x: i32, y: i32, z: i32) -> Self {
        Self { flags, offset: Xyz32::new(x, y, z) }
    }
}

/// Parse four-word bone records (flags, x, y, z).
pub fn parse_bones(data: &[i32]) -> Result<Vec<Bone>, AnimError> {
    if data.len() % BONE_WORDS != 0 {
        return Err(AnimError::BadBoneData(data.len()));
    }
    Ok(data
        .chunks_exact(BONE_WORDS)
        .map(|b| Bone {
            flags: BoneFlags::from_bits_retain(b[0]),
            offset: Xyz32::new(b[1], b[2], b[3]),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_words(bounds: [i16; 6], offset: [i16; 3], rots: &[(i16, i16)]) -> Vec<i16> {
        let mut words = Vec::new();
        words.extend_from_slice(&bounds);
        words.extend_from_slice(&offset);
        words.push(rots.len() as i16);
        for &(lo, hi) in rots {
            words.push(lo);
            words.push(hi);
        }
        words
    }

    #[test]
    fn test_extract_rotation_fields() {
        // x = 0x3FF0 bits of hi, z = low ten bits of lo
        let rot = extract_rotation(0x0010, 0x0001);
        assert_eq!(rot.x, 0x40);
        assert_eq!(rot.y, 0);
        assert_eq!(rot.z, 0x40);

        // y straddles both words
        let rot = extract_rotation(0x0001, 0x0400u16 as i16);
        assert_eq!(rot.y, ((1 << 6 | 1) << 6) as i16);
    }

    #[test]
    fn test_unpack_rotation_agrees_with_extract() {
        let packed: u32 = 0x1234_5678;
        assert_eq!(unpack_rotation(packed), extract_rotation(0x1234, 0x5678));
    }

    #[test]
    fn test_parse_frame_reads_header_and_rotations() {
        let words = frame_words([-10, 10, -20, 20, -30, 30], [1, 2, 3], &[(0x0001, 0x0010), (0, 0)]);
        let (frame, used) = AnimFrame::parse(&words, 0).unwrap();
        assert_eq!(used, words.len());
        assert_eq!(frame.bounds.min, Xyz16::new(-10, -20, -30));
        assert_eq!(frame.bounds.max, Xyz16::new(10, 20, 30));
        assert_eq!(frame.offset, Xyz16::new(1, 2, 3));
        assert_eq!(frame.mesh_rots.len(), 2);
        assert_eq!(frame.mesh_rots[0], extract_rotation(0x0010, 0x0001));
    }

    #[test]
    fn test_parse_frame_truncated() {
        let mut words = frame_words([0; 6], [0; 3], &[(1, 2)]);
        words.pop();
        assert!(matches!(AnimFrame::parse(&words, 0), Err(AnimError::Truncated(_))));
    }

    #[test]
    fn test_parse_frame_negative_mesh_count() {
        let mut words = frame_words([0; 6], [0; 3], &[]);
        words[9] = -1;
        assert_eq!(
            AnimFrame::parse(&words, 0),
            Err(AnimError::BadMeshCount { count: -1, offset: 9 })
        );
    }

    #[test]
    fn test_load_counts_frames_per_anim() {
        let mut data = Vec::new();
        for i in 0..3 {
            data.extend(frame_words([0; 6], [i, 0, 0], &[(0, 0)]));
        }
        // frames 0..=8 at rate 4 -> keyframes at 0, 4, 8
        let store = AnimStore::load(vec![Anim::new(0, 0, 8, 4)], &data).unwrap();
        assert_eq!(store.frames.len(), 3);
        assert_eq!(store.anims[0].frame_count, 3);
        assert_eq!(store.frames[2].offset.x, 2);
    }

    #[test]
    fn test_load_rejects_zero_interpolation() {
        let data = frame_words([0; 6], [0; 3], &[]);
        let err = AnimStore::load(vec![Anim::new(0, 0, 4, 0)], &data).unwrap_err();
        assert_eq!(err, AnimError::ZeroInterpolation(0));
    }

    #[test]
    fn test_load_rejects_offset_past_end() {
        let data = frame_words([0; 6], [0; 3], &[]);
        let err = AnimStore::load(vec![Anim::new(500, 0, 0, 1)], &data).unwrap_err();
        assert!(matches!(err, AnimError::BadFrameOffset { anim: 0, offset: 500 }));
    }

    #[test]
    fn test_get_frames_fraction_and_best_frame() {
        let mut data = Vec::new();
        for i in 0..3 {
            data.extend(frame_words([0; 6], [i, 0, 0], &[]));
        }
        let store = AnimStore::load(vec![Anim::new(0, 100, 108, 4)], &data).unwrap();

        let pair = store.get_frames(0, 101);
        assert_eq!(pair, FramePair { frames: [0, 1], frac: 1, rate: 4 });
        assert_eq!(store.best_frame(0, 101).offset.x, 0);
        assert_eq!(store.best_frame(0, 107).offset.x, 2);

        let exact = store.get_frames(0, 104);
        assert_eq!(exact.frac, 0);
        assert_eq!(exact.frames[0], 1);
    }

    #[test]
    fn test_get_frames_shortens_last_interval() {
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend(frame_words([0; 6], [0; 3], &[]));
        }
        // frames 0..=6 at rate 4: keyframes 0, 4, and a short tail to 6
        let store = AnimStore::load(vec![Anim::new(0, 0, 6, 4)], &data).unwrap();
        let pair = store.get_frames(0, 5);
        assert_eq!(pair.frac, 1);
        assert_eq!(pair.rate, 2);
    }

    #[test]
    fn test_parse_bones() {
        let bones = parse_bones(&[2, 10, 20, 30, 1, 0, -5, 0]).unwrap();
        assert_eq!(bones.len(), 2);
        assert_eq!(bones[0].flags, BoneFlags::PUSH);
        assert_eq!(bones[0].offset, Xyz32::new(10, 20, 30));
        assert_eq!(bones[1].flags, BoneFlags::POP);
    }

    #[test]
    fn test_parse_bones_rejects_partial_record() {
        assert_eq!(parse_bones(&[0, 1, 2]), Err(AnimError::BadBoneData(3)));
    }
}
