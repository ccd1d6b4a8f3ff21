//! World Module
//!
//! - **Core**: block ids, derived payloads, the block registry, chunk positions
//! - **Blocks**: the built-in block table
//! - **Octree**: the per-chunk sparse voxel octree
//! - **Chunk**: lock-guarded octree ownership and bounds helpers
//! - **Compute**: the master BVH over chunk or voxel bounds

pub mod blocks;
pub mod chunk;
pub mod compute;
pub mod core;
pub mod octree;

pub use chunk::{
    acquire_read_lock, acquire_write_lock, chunk_bounds, collect_chunk_bounds,
    collect_voxel_bounds, create_voxel_chunk, SharedVoxelOctree, VoxelChunk,
};
pub use compute::{construct_master_bvh, BvhNode, MasterBvhTree};
pub use core::{
    BlockId, BlockLookup, BlockPayloadTable, BlockRegistryData, ChunkPos, PhysicsProperties,
    RenderData, VoxelPhysicsData, VoxelRenderData,
};
pub use octree::{create_voxel_octree, insert, VoxelOctreeData};
