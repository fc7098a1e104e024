use relief_geom::Vec2;
use serde::Deserialize;

/// Integer chunk coordinate on the streaming grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Coordinate of the chunk whose center is nearest the viewer.
    /// Rounds half away from zero, so a viewer at exactly half a chunk
    /// size lands on the farther coordinate.
    pub fn from_viewer(viewer: Vec2, world_size: f32) -> Self {
        Self {
            cx: (viewer.x / world_size).round() as i32,
            cz: (viewer.y / world_size).round() as i32,
        }
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    /// Center of this chunk in world units.
    pub fn world_center(self, world_size: f32) -> Vec2 {
        Vec2::new(self.cx as f32 * world_size, self.cz as f32 * world_size)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cx, self.cz)
    }
}
