//! Voxel chunks
//!
//! Each chunk owns one octree behind a reader/writer lock. Game logic takes
//! the write lock to edit; renderers and physics take read locks to rebuild
//! their views.

use crate::config::OctreeConfig;
use crate::error::VoxelResult;
use crate::physics::aabb::{aabb_translated, create_aabb, AABB};
use crate::world::core::{BlockLookup, ChunkPos};
use crate::world::octree::{create_voxel_octree, leaf_bounds, occupied_leaves, VoxelOctreeData};
use cgmath::{EuclideanSpace, Point3, Vector3};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Thread-safe shared octree (Arc<RwLock<>>)
pub type SharedVoxelOctree = Arc<RwLock<VoxelOctreeData>>;

/// A chunk and the octree it owns
#[derive(Debug, Clone)]
pub struct VoxelChunk {
    pub position: ChunkPos,
    pub octree: SharedVoxelOctree,
}

/// Create a chunk with an empty octree
pub fn create_voxel_chunk(
    position: ChunkPos,
    config: &OctreeConfig,
    lookup: Arc<dyn BlockLookup>,
) -> VoxelResult<VoxelChunk> {
    let octree = create_voxel_octree(config, lookup)?;
    Ok(VoxelChunk {
        position,
        octree: Arc::new(RwLock::new(octree)),
    })
}

pub fn acquire_read_lock(chunk: &VoxelChunk) -> RwLockReadGuard<'_, VoxelOctreeData> {
    chunk.octree.read()
}

pub fn acquire_write_lock(chunk: &VoxelChunk) -> RwLockWriteGuard<'_, VoxelOctreeData> {
    chunk.octree.write()
}

/// World-space bounds of the whole chunk cube
pub fn chunk_bounds(chunk: &VoxelChunk) -> AABB {
    let size = acquire_read_lock(chunk).cube_size as f32;
    let min = chunk.position.min_corner(size);
    create_aabb(min, min + Vector3::new(size, size, size))
}

/// One box per chunk, in input order
pub fn collect_chunk_bounds(chunks: &[VoxelChunk]) -> Vec<AABB> {
    chunks.iter().map(chunk_bounds).collect()
}

/// World-space box of every occupied leaf, in data-store order
pub fn collect_voxel_bounds(octree: &VoxelOctreeData, min_corner: Point3<f32>) -> Vec<AABB> {
    let offset = min_corner.to_vec();
    occupied_leaves(octree)
        .map(|(_, node_index)| aabb_translated(&leaf_bounds(octree, node_index), offset))
        .collect()
}
