use cgmath::Point3;
use serde::{Deserialize, Serialize};

/// Chunk coordinate in chunk units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World-space minimum corner of the chunk
    pub fn min_corner(self, chunk_size: f32) -> Point3<f32> {
        Point3::new(
            self.x as f32 * chunk_size,
            self.y as f32 * chunk_size,
            self.z as f32 * chunk_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_corner_negative_chunk() {
        let pos = ChunkPos::new(-1, 0, 2);
        let min = pos.min_corner(16.0);
        assert_eq!(min, Point3::new(-16.0, 0.0, 32.0));
    }
}
