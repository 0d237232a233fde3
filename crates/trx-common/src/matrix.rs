// matrix.rs — 3x4 fixed-point transform matrices and the per-frame matrix stack
//
// Rotation entries are scaled by W2V_SCALE. The translation column holds
// view-space coordinates shifted left by W2V_SHIFT, so `m03 >> W2V_SHIFT`
// recovers world units. Products are accumulated in 64 bits and narrowed
// back to i32 after the shift.

use log::warn;

use crate::phd_math::{cos, get_vector_angles, sin, trig_mult2, trig_mult3, W2V_SCALE, W2V_SHIFT};
use crate::types::{PhdAngle, Xyz16, Xyz32};

pub const MAX_MATRICES: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matrix {
    pub m00: i32,
    pub m01: i32,
    pub m02: i32,
    pub m03: i32,
    pub m10: i32,
    pub m11: i32,
    pub m12: i32,
    pub m13: i32,
    pub m20: i32,
    pub m21: i32,
    pub m22: i32,
    pub m23: i32,
}

#[inline]
fn rotate_pair(a: &mut i32, b: &mut i32, s: i64, c: i64) {
    let r0 = *a as i64 * c + *b as i64 * s;
    let r1 = *b as i64 * c - *a as i64 * s;
    *a = (r0 >> W2V_SHIFT) as i32;
    *b = (r1 >> W2V_SHIFT) as i32;
}

#[inline]
fn dot(a: i32, b: i32, c: i32, x: i32, y: i32, z: i32) -> i64 {
    a as i64 * x as i64 + b as i64 * y as i64 + c as i64 * z as i64
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m00: W2V_SCALE, m01: 0, m02: 0, m03: 0,
        m10: 0, m11: W2V_SCALE, m12: 0, m13: 0,
        m20: 0, m21: 0, m22: W2V_SCALE, m23: 0,
    };

    /// Reset the 3x3 rotation part to identity, keeping the translation.
    pub fn reset_rotation(&mut self) {
        self.m00 = W2V_SCALE;
        self.m01 = 0;
        self.m02 = 0;
        self.m10 = 0;
        self.m11 = W2V_SCALE;
        self.m12 = 0;
        self.m20 = 0;
        self.m21 = 0;
        self.m22 = W2V_SCALE;
    }

    pub fn clear_translation(&mut self) {
        self.m03 = 0;
        self.m13 = 0;
        self.m23 = 0;
    }

    /// Translation column in world units.
    pub fn translation(&self) -> Xyz32 {
        Xyz32::new(self.m03 >> W2V_SHIFT, self.m13 >> W2V_SHIFT, self.m23 >> W2V_SHIFT)
    }

    /// Transform an object-space point into shifted view space.
    pub fn apply(&self, v: &Xyz32) -> [i64; 3] {
        [
            dot(self.m00, self.m01, self.m02, v.x, v.y, v.z) + self.m03 as i64,
            dot(self.m10, self.m11, self.m12, v.x, v.y, v.z) + self.m13 as i64,
            dot(self.m20, self.m21, self.m22, v.x, v.y, v.z) + self.m23 as i64,
        ]
    }

    pub fn rot_x(&mut self, rx: PhdAngle) {
        if rx == 0 {
            return;
        }
        let s = sin(rx as i32) as i64;
        let c = cos(rx as i32) as i64;
        rotate_pair(&mut self.m01, &mut self.m02, s, c);
        rotate_pair(&mut self.m11, &mut self.m12, s, c);
        rotate_pair(&mut self.m21, &mut self.m22, s, c);
    }

    pub fn rot_y(&mut self, ry: PhdAngle) {
        if ry == 0 {
            return;
        }
        let s = sin(ry as i32) as i64;
        let c = cos(ry as i32) as i64;
        rotate_pair(&mut self.m00, &mut self.m02, -s, c);
        rotate_pair(&mut self.m10, &mut self.m12, -s, c);
        rotate_pair(&mut self.m20, &mut self.m22, -s, c);
    }

    pub fn rot_z(&mut self, rz: PhdAngle) {
        if rz == 0 {
            return;
        }
        let s = sin(rz as i32) as i64;
        let c = cos(rz as i32) as i64;
        rotate_pair(&mut self.m00, &mut self.m01, s, c);
        rotate_pair(&mut self.m10, &mut self.m11, s, c);
        rotate_pair(&mut self.m20, &mut self.m21, s, c);
    }

    /// Yaw, then pitch, then roll.
    pub fn rot_yxz(&mut self, ry: PhdAngle, rx: PhdAngle, rz: PhdAngle) {
        self.rot_y(ry);
        self.rot_x(rx);
        self.rot_z(rz);
    }

    pub fn rot_xyz16(&mut self, rot: &Xyz16) {
        self.rot_yxz(rot.y, rot.x, rot.z);
    }

    /// Rotation packed as three 10-bit angles in one 32-bit word.
    pub fn rot_yxz_pack(&mut self, packed: u32) {
        let ry = ((packed >> 4) & 0xFFC0) as u16 as PhdAngle;
        let rx = ((packed >> 14) & 0xFFC0) as u16 as PhdAngle;
        let rz = ((packed & 0x3FF) << 6) as u16 as PhdAngle;
        self.rot_yxz(ry, rx, rz);
    }

    /// Translate in the matrix's local space.
    pub fn translate_rel(&mut self, x: i32, y: i32, z: i32) {
        self.m03 = (self.m03 as i64 + dot(self.m00, self.m01, self.m02, x, y, z)) as i32;
        self.m13 = (self.m13 as i64 + dot(self.m10, self.m11, self.m12, x, y, z)) as i32;
        self.m23 = (self.m23 as i64 + dot(self.m20, self.m21, self.m22, x, y, z)) as i32;
    }

    /// Blend towards `other` by `frac / rate`.
    fn blend(&mut self, other: &Matrix, frac: i32, rate: i32, rotation: bool) {
        let mix = |a: &mut i32, b: i32| {
            *a = if rate == 2 {
                ((*a as i64 + b as i64) >> 1) as i32
            } else {
                (*a as i64 + (b as i64 - *a as i64) * frac as i64 / rate as i64) as i32
            };
        };
        if rotation {
            mix(&mut self.m00, other.m00);
            mix(&mut self.m01, other.m01);
            mix(&mut self.m02, other.m02);
            mix(&mut self.m10, other.m10);
            mix(&mut self.m11, other.m11);
            mix(&mut self.m12, other.m12);
            mix(&mut self.m20, other.m20);
            mix(&mut self.m21, other.m21);
            mix(&mut self.m22, other.m22);
        }
        mix(&mut self.m03, other.m03);
        mix(&mut self.m13, other.m13);
        mix(&mut self.m23, other.m23);
    }

    fn copy_rotation(&mut self, other: &Matrix) {
        self.m00 = other.m00;
        self.m01 = other.m01;
        self.m02 = other.m02;
        self.m10 = other.m10;
        self.m11 = other.m11;
        self.m12 = other.m12;
        self.m20 = other.m20;
        self.m21 = other.m21;
        self.m22 = other.m22;
    }
}

// ============================================================
// Interpolation stack
// ============================================================

#[derive(Debug, Clone)]
struct InterpStack {
    stack: [Matrix; MAX_MATRICES],
    ptr: usize,
    frac: i32,
    rate: i32,
}

impl InterpStack {
    fn new() -> Self {
        Self { stack: [Matrix::IDENTITY; MAX_MATRICES], ptr: 0, frac: 0, rate: 1 }
    }

    fn top_mut(&mut self) -> &mut Matrix {
        &mut self.stack[self.ptr]
    }
}

// ============================================================
// MatrixStack
// ============================================================

/// Explicit transform stack, owned by the per-frame render context.
///
/// Every draw traversal must leave the stack at the depth it found it;
/// `depth()`/`pop_to()` let callers enforce that around data-driven walks.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: [Matrix; MAX_MATRICES],
    ptr: usize,
    w2v: Matrix,
    interp: InterpStack,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            stack: [Matrix::IDENTITY; MAX_MATRICES],
            ptr: 0,
            w2v: Matrix::IDENTITY,
            interp: InterpStack::new(),
        }
    }

    /// Rewind to the base slot. Called once per frame before traversal.
    pub fn reset_stack(&mut self) {
        self.ptr = 0;
        self.interp.ptr = 0;
    }

    pub fn depth(&self) -> usize {
        self.ptr
    }

    pub fn top(&self) -> &Matrix {
        &self.stack[self.ptr]
    }

    pub fn top_mut(&mut self) -> &mut Matrix {
        &mut self.stack[self.ptr]
    }

    /// The world-to-view matrix from the last `generate_w2v`.
    pub fn w2v(&self) -> &Matrix {
        &self.w2v
    }

    pub fn push(&mut self) -> bool {
        if self.ptr + 1 >= MAX_MATRICES {
            warn!("matrix stack full at depth {}", self.ptr);
            return false;
        }
        self.stack[self.ptr + 1] = self.stack[self.ptr];
        self.ptr += 1;
        true
    }

    /// Push with the rotation reset to identity; translation is inherited.
    pub fn push_unit(&mut self) -> bool {
        if !self.push() {
            return false;
        }
        self.top_mut().reset_rotation();
        true
    }

    pub fn pop(&mut self) {
        assert!(self.ptr > 0, "matrix stack underflow");
        self.ptr -= 1;
    }

    /// Unwind to a depth recorded earlier with `depth()`.
    pub fn pop_to(&mut self, depth: usize) {
        assert!(depth <= self.ptr, "cannot unwind matrix stack from {} to {}", self.ptr, depth);
        self.ptr = depth;
    }

    pub fn rot_x(&mut self, rx: PhdAngle) {
        self.top_mut().rot_x(rx);
    }

    pub fn rot_y(&mut self, ry: PhdAngle) {
        self.top_mut().rot_y(ry);
    }

    pub fn rot_z(&mut self, rz: PhdAngle) {
        self.top_mut().rot_z(rz);
    }

    pub fn rot_yxz(&mut self, ry: PhdAngle, rx: PhdAngle, rz: PhdAngle) {
        self.top_mut().rot_yxz(ry, rx, rz);
    }

    pub fn rot_xyz16(&mut self, rot: &Xyz16) {
        self.top_mut().rot_xyz16(rot);
    }

    pub fn rot_yxz_pack(&mut self, packed: u32) {
        self.top_mut().rot_yxz_pack(packed);
    }

    pub fn translate_rel(&mut self, x: i32, y: i32, z: i32) {
        self.top_mut().translate_rel(x, y, z);
    }

    /// Place the top at a world position, relative to the camera.
    pub fn translate_abs(&mut self, x: i32, y: i32, z: i32) {
        let fx = x.wrapping_sub(self.w2v.m03);
        let fy = y.wrapping_sub(self.w2v.m13);
        let fz = z.wrapping_sub(self.w2v.m23);
        let m = &mut self.stack[self.ptr];
        m.m03 = dot(m.m00, m.m01, m.m02, fx, fy, fz) as i32;
        m.m13 = dot(m.m10, m.m11, m.m12, fx, fy, fz) as i32;
        m.m23 = dot(m.m20, m.m21, m.m22, fx, fy, fz) as i32;
    }

    /// Overwrite the translation with a view-space position.
    pub fn translate_set(&mut self, x: i32, y: i32, z: i32) {
        let m = self.top_mut();
        m.m03 = x << W2V_SHIFT;
        m.m13 = y << W2V_SHIFT;
        m.m23 = z << W2V_SHIFT;
    }

    /// Build the world-to-view matrix into the base slot.
    pub fn generate_w2v(&mut self, pos: &Xyz32, rot: &Xyz16) {
        self.ptr = 0;

        let sx = sin(rot.x as i32);
        let cx = cos(rot.x as i32);
        let sy = sin(rot.y as i32);
        let cy = cos(rot.y as i32);
        let sz = sin(rot.z as i32);
        let cz = cos(rot.z as i32);

        let m = &mut self.stack[0];
        m.m00 = trig_mult3(sx, sy, sz) + trig_mult2(cy, cz);
        m.m01 = trig_mult2(cx, sz);
        m.m02 = trig_mult3(sx, cy, sz) - trig_mult2(sy, cz);
        m.m10 = trig_mult3(sx, sy, cz) - trig_mult2(cy, sz);
        m.m11 = trig_mult2(cx, cz);
        m.m12 = trig_mult3(sx, cy, cz) + trig_mult2(sy, sz);
        m.m20 = trig_mult2(cx, sy);
        m.m21 = -sx;
        m.m22 = trig_mult2(cx, cy);
        m.m03 = pos.x;
        m.m13 = pos.y;
        m.m23 = pos.z;

        self.w2v = *m;
    }

    pub fn look_at(&mut self, src: &Xyz32, tar: &Xyz32, roll: PhdAngle) {
        let (yaw, pitch) = get_vector_angles(tar.x - src.x, tar.y - src.y, tar.z - src.z);
        self.generate_w2v(src, &Xyz16::new(pitch, yaw, roll));
    }

    // ============================================================
    // Interpolating variants
    //
    // The `_i` operators apply to both the main stack and a parallel
    // stack describing the next keyframe; `interpolate()` then blends
    // the two tops.
    // ============================================================

    pub fn init_interpolate(&mut self, frac: i32, rate: i32) {
        self.interp.frac = frac;
        self.interp.rate = rate.max(1);
        self.interp.ptr = 0;
        self.interp.stack[0] = self.stack[self.ptr];
    }

    pub fn push_i(&mut self) -> bool {
        if !self.push() {
            return false;
        }
        let ip = self.interp.ptr;
        self.interp.stack[ip + 1] = self.interp.stack[ip];
        self.interp.ptr += 1;
        true
    }

    pub fn pop_i(&mut self) {
        self.pop();
        assert!(self.interp.ptr > 0, "interpolation stack underflow");
        self.interp.ptr -= 1;
    }

    pub fn rot_x_i(&mut self, ang: PhdAngle) {
        self.top_mut().rot_x(ang);
        self.interp.top_mut().rot_x(ang);
    }

    pub fn rot_y_i(&mut self, ang: PhdAngle) {
        self.top_mut().rot_y(ang);
        self.interp.top_mut().rot_y(ang);
    }

    pub fn rot_z_i(&mut self, ang: PhdAngle) {
        self.top_mut().rot_z(ang);
        self.interp.top_mut().rot_z(ang);
    }

    pub fn rot_yxz_i(&mut self, y: PhdAngle, x: PhdAngle, z: PhdAngle) {
        self.top_mut().rot_yxz(y, x, z);
        self.interp.top_mut().rot_yxz(y, x, z);
    }

    /// Rotate the main stack by `rot_1` and the interpolation stack by `rot_2`.
    pub fn rot_xyz16_i(&mut self, rot_1: &Xyz16, rot_2: &Xyz16) {
        self.top_mut().rot_xyz16(rot_1);
        self.interp.top_mut().rot_xyz16(rot_2);
    }

    pub fn translate_rel_i(&mut self, x: i32, y: i32, z: i32) {
        self.top_mut().translate_rel(x, y, z);
        self.interp.top_mut().translate_rel(x, y, z);
    }

    /// Translate the two stacks by different offsets.
    pub fn translate_rel_id(&mut self, a: &Xyz32, b: &Xyz32) {
        self.top_mut().translate_rel(a.x, a.y, a.z);
        self.interp.top_mut().translate_rel(b.x, b.y, b.z);
    }

    pub fn interpolate(&mut self) {
        let other = self.interp.stack[self.interp.ptr];
        let (frac, rate) = (self.interp.frac, self.interp.rate);
        self.top_mut().blend(&other, frac, rate, true);
    }

    /// Take rotation from two levels down and blend only the translation.
    pub fn interpolate_arm(&mut self) {
        assert!(self.ptr >= 2, "interpolate_arm needs two parent matrices");
        let parent = self.stack[self.ptr - 2];
        let other = self.interp.stack[self.interp.ptr];
        let (frac, rate) = (self.interp.frac, self.interp.rate);
        let top = self.top_mut();
        top.copy_rotation(&parent);
        top.blend(&other, frac, rate, false);
    }
}
