//! Derived per-voxel payloads and the block lookup collaborator
//!
//! The octree stores only a block id per data record; physics and render
//! payloads are recomputed from it through a [`BlockLookup`] whenever a
//! record's data is set.

use super::registry_data::BlockRegistryData;
use super::registry_operations::get_properties;
use super::BlockId;
use crate::renderer::texture_atlas_data::TextureAtlasLookup;
use crate::renderer::texture_atlas_operations::lookup_or_empty;
use bytemuck::{Pod, Zeroable};

/// Render payload uploaded verbatim to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VoxelRenderData {
    /// RGBA8 packed, red in the low byte
    pub color: u32,
    /// Texture-array layer of the atlas
    pub layer: u32,
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

static_assertions::assert_eq_size!(VoxelRenderData, [u8; 24]);

/// Physics payload. Only solidity is consumed so far.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VoxelPhysicsData {
    pub solid: bool,
    pub density: f32,
}

/// Source of derived payloads for a block id
pub trait BlockLookup: Send + Sync {
    fn render_payload(&self, voxel: BlockId) -> VoxelRenderData;
    fn physics_payload(&self, voxel: BlockId) -> VoxelPhysicsData;
}

/// Pack a linear [0, 1] RGB color with opaque alpha
pub fn pack_color(color: [f32; 3]) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    channel(color[0]) | (channel(color[1]) << 8) | (channel(color[2]) << 16) | (0xFF << 24)
}

/// Registry plus atlas: the standard [`BlockLookup`]
#[derive(Debug, Clone, Default)]
pub struct BlockPayloadTable {
    pub registry: BlockRegistryData,
    pub atlas: TextureAtlasLookup,
}

impl BlockLookup for BlockPayloadTable {
    fn render_payload(&self, voxel: BlockId) -> VoxelRenderData {
        let Some(properties) = get_properties(&self.registry, voxel) else {
            log::warn!(
                "[payload::render_payload] Unregistered block {}, using empty payload",
                voxel
            );
            return VoxelRenderData::default();
        };

        let render = &properties.render_data;
        let entry = lookup_or_empty(&self.atlas, render.atlas_id, render.texture_id);
        VoxelRenderData {
            color: pack_color(render.color),
            layer: entry.layer,
            uv_min: [entry.uv.min.x, entry.uv.min.y],
            uv_max: [entry.uv.max.x, entry.uv.max.y],
        }
    }

    fn physics_payload(&self, voxel: BlockId) -> VoxelPhysicsData {
        get_properties(&self.registry, voxel)
            .map(|p| VoxelPhysicsData {
                solid: p.physics.solid,
                density: p.physics.density,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::blocks::create_default_payload_table;

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color([1.0, 0.0, 0.0]), 0xFF00_00FF);
        assert_eq!(pack_color([0.0, 0.0, 1.0]), 0xFFFF_0000);
        assert_eq!(pack_color([2.0, -1.0, 0.0]), 0xFF00_00FF);
    }

    #[test]
    fn test_stone_payload_has_texture() {
        let table = create_default_payload_table();
        let render = table.render_payload(BlockId::STONE);
        assert_eq!(render.color, pack_color([0.5, 0.5, 0.5]));
        assert!(render.uv_max[0] > render.uv_min[0]);
        assert!(table.physics_payload(BlockId::STONE).solid);
    }

    #[test]
    fn test_unregistered_block_degrades_to_zero() {
        let table = create_default_payload_table();
        assert_eq!(table.render_payload(BlockId(999)), VoxelRenderData::default());
        assert!(!table.physics_payload(BlockId(999)).solid);
    }
}
