//! Basic engine blocks
//!
//! This module defines the fundamental blocks that come with the engine,
//! all textured from a single 4x4 tile atlas. Games can register additional
//! blocks on top of these.

use crate::renderer::texture_atlas_operations::{
    add_atlas, add_tile_grid, create_texture_atlas_lookup,
};
use crate::world::core::registry_operations::{create_block_registry, register_block_with_id};
use crate::world::core::{
    AtlasId, BlockId, BlockPayloadTable, BlockProperties, BlockRegistryData, PhysicsProperties,
    RenderData, TextureId,
};

/// Atlas holding the built-in block textures
pub const BASIC_BLOCK_ATLAS: AtlasId = 0;
pub const BASIC_BLOCK_ATLAS_SIZE: u32 = 256;
pub const BASIC_BLOCK_ATLAS_TILES: u32 = 4;

fn block(
    id: BlockId,
    name: &str,
    color: [f32; 3],
    texture_id: TextureId,
    solid: bool,
    density: f32,
) -> BlockProperties {
    BlockProperties {
        id,
        name: name.to_string(),
        render_data: RenderData {
            color,
            atlas_id: BASIC_BLOCK_ATLAS,
            texture_id,
        },
        physics: PhysicsProperties { solid, density },
    }
}

/// Built-in block table: (registry name, properties)
pub fn basic_block_properties() -> Vec<(&'static str, BlockProperties)> {
    vec![
        ("engine:grass", block(BlockId::GRASS, "grass", [0.3, 0.8, 0.2], 1, true, 1500.0)),
        ("engine:dirt", block(BlockId::DIRT, "dirt", [0.5, 0.3, 0.1], 2, true, 1600.0)),
        ("engine:stone", block(BlockId::STONE, "stone", [0.5, 0.5, 0.5], 3, true, 2500.0)),
        ("engine:wood", block(BlockId::WOOD, "wood", [0.6, 0.4, 0.2], 4, true, 700.0)),
        ("engine:sand", block(BlockId::SAND, "sand", [0.9, 0.8, 0.6], 5, true, 1800.0)),
        // Water is rendered but not collidable
        ("engine:water", block(BlockId::WATER, "water", [0.2, 0.3, 0.8], 6, false, 1000.0)),
        ("engine:leaves", block(BlockId::LEAVES, "leaves", [0.2, 0.6, 0.1], 7, true, 200.0)),
        ("engine:glass", block(BlockId::GLASS, "glass", [0.8, 0.9, 1.0], 8, true, 2500.0)),
        ("engine:bedrock", block(BlockId::BEDROCK, "bedrock", [0.1, 0.1, 0.1], 9, true, 3000.0)),
        (
            "engine:glowstone",
            block(BlockId::GLOWSTONE, "glowstone", [1.0, 0.9, 0.6], 10, true, 2000.0),
        ),
    ]
}

/// Register all basic engine blocks
///
/// Games should call this before registering their own blocks.
pub fn register_basic_blocks(registry: &mut BlockRegistryData) {
    // Air (BlockId 0) is never registered
    for (name, properties) in basic_block_properties() {
        register_block_with_id(registry, name, properties);
    }
}

/// Registry with the basic blocks plus their tile atlas
pub fn create_default_payload_table() -> BlockPayloadTable {
    let mut registry = create_block_registry();
    register_basic_blocks(&mut registry);

    let mut atlas = create_texture_atlas_lookup();
    add_atlas(&mut atlas, BASIC_BLOCK_ATLAS, BASIC_BLOCK_ATLAS_SIZE, 1);
    add_tile_grid(
        &mut atlas,
        BASIC_BLOCK_ATLAS,
        BASIC_BLOCK_ATLAS_TILES,
        BASIC_BLOCK_ATLAS_TILES,
    );

    BlockPayloadTable { registry, atlas }
}
