//! Renderer Module - texture atlas lookup
//!
//! Only the CPU side lives here: resolving a block's atlas tile into the
//! UV rectangle and array layer written into voxel render payloads.

pub mod texture_atlas_data;
pub mod texture_atlas_operations;

pub use texture_atlas_data::{AtlasEntry, AtlasLayout, AtlasUV, PackedRect, TextureAtlasLookup};
pub use texture_atlas_operations::{
    add_atlas, add_texture, add_tile_grid, create_texture_atlas_lookup, lookup, lookup_or_empty,
};
