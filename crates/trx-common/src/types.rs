// types.rs — world-space value types shared by all modules

/// Size of one floor sector in world units.
pub const WALL_L: i32 = 1024;

/// 16-bit angle, 65536 units to the full circle.
pub type PhdAngle = i16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Xyz32 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Xyz32 {
    pub const ZERO: Xyz32 = Xyz32 { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Xyz16 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Xyz16 {
    pub const ZERO: Xyz16 = Xyz16 { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned box in object space, as stored in animation frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds16 {
    pub min: Xyz16,
    pub max: Xyz16,
}

impl Bounds16 {
    pub const fn new(min: Xyz16, max: Xyz16) -> Self {
        Self { min, max }
    }

    /// The eight corners, near face first, in the winding the projector expects.
    pub fn corners(&self) -> [Xyz32; 8] {
        let (x0, y0, z0) = (self.min.x as i32, self.min.y as i32, self.min.z as i32);
        let (x1, y1, z1) = (self.max.x as i32, self.max.y as i32, self.max.z as i32);
        [
            Xyz32::new(x0, y0, z0),
            Xyz32::new(x1, y0, z0),
            Xyz32::new(x1, y1, z0),
            Xyz32::new(x0, y1, z0),
            Xyz32::new(x0, y0, z1),
            Xyz32::new(x1, y0, z1),
            Xyz32::new(x1, y1, z1),
            Xyz32::new(x0, y1, z1),
        ]
    }
}

/// Position plus rotation triple of a placed entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos3d {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub x_rot: PhdAngle,
    pub y_rot: PhdAngle,
    pub z_rot: PhdAngle,
}

impl Pos3d {
    pub const fn at(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, x_rot: 0, y_rot: 0, z_rot: 0 }
    }

    pub fn xyz(&self) -> Xyz32 {
        Xyz32::new(self.x, self.y, self.z)
    }
}
