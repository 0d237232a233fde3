// level_import.rs — room geometry services the game code calls out to

/// Level geometry collaborator. The real implementation walks room sectors;
/// game code only needs floor heights and the flip-map toggle.
pub trait LevelImport {
    /// Floor height below (x, y, z). `room` is updated when the point lies in
    /// a neighbouring room.
    fn floor_height(&self, x: i32, y: i32, z: i32, room: &mut i16) -> i32;

    /// Swap every flippable room with its alternate.
    fn flip_map(&mut self);
}

/// Flat level with a single floor height and no alternate rooms.
#[derive(Debug, Default, Clone)]
pub struct StubLevelImport {
    pub floor: i32,
    pub flips: u32,
}

impl StubLevelImport {
    pub fn with_floor(floor: i32) -> Self {
        Self { floor, flips: 0 }
    }
}

impl LevelImport for StubLevelImport {
    fn floor_height(&self, _x: i32, _y: i32, _z: i32, _room: &mut i16) -> i32 {
        self.floor
    }

    fn flip_map(&mut self) {
        self.flips += 1;
    }
}
