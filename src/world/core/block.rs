use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a block type. Opaque to the octree apart from
/// `AIR`, which is never stored as a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockId(pub u16);

// Safe because BlockId is just a u16
unsafe impl bytemuck::Pod for BlockId {}
unsafe impl bytemuck::Zeroable for BlockId {}

impl Default for BlockId {
    fn default() -> Self {
        BlockId::AIR
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BlockId::AIR => write!(f, "Air"),
            BlockId::GRASS => write!(f, "Grass"),
            BlockId::DIRT => write!(f, "Dirt"),
            BlockId::STONE => write!(f, "Stone"),
            BlockId::WOOD => write!(f, "Wood"),
            BlockId::SAND => write!(f, "Sand"),
            BlockId::WATER => write!(f, "Water"),
            BlockId::LEAVES => write!(f, "Leaves"),
            BlockId::GLASS => write!(f, "Glass"),
            BlockId::BEDROCK => write!(f, "Bedrock"),
            BlockId::GLOWSTONE => write!(f, "Glowstone"),
            _ => write!(f, "Block({})", self.0),
        }
    }
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const GRASS: BlockId = BlockId(1);
    pub const DIRT: BlockId = BlockId(2);
    pub const STONE: BlockId = BlockId(3);
    pub const WOOD: BlockId = BlockId(4);
    pub const SAND: BlockId = BlockId(5);
    pub const WATER: BlockId = BlockId(6);
    pub const LEAVES: BlockId = BlockId(7);
    pub const GLASS: BlockId = BlockId(8);
    pub const BEDROCK: BlockId = BlockId(13);
    pub const GLOWSTONE: BlockId = BlockId(36);

    /// Create a new BlockId from a raw u16 value
    pub const fn new(id: u16) -> Self {
        BlockId(id)
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockId::AIR
    }
}

/// Atlas a block's texture lives in
pub type AtlasId = u32;

/// Texture slot inside an atlas
pub type TextureId = u32;

/// Data needed to render a block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    pub color: [f32; 3],
    pub atlas_id: AtlasId,
    pub texture_id: TextureId,
}

/// Physical properties of a block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsProperties {
    pub solid: bool,
    pub density: f32,
}

/// Everything the registry knows about one block type
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProperties {
    pub id: BlockId,
    pub name: String,
    pub render_data: RenderData,
    pub physics: PhysicsProperties,
}
