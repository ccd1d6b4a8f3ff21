//! Voxel Octree Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in arena_operations.rs and octree_operations.rs

use crate::world::core::{BlockId, BlockLookup, VoxelPhysicsData, VoxelRenderData};
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::sync::Arc;

/// Octree node, stored densely and uploaded verbatim to the GPU
///
/// A node is a branch when `first_child_index` is valid (8 contiguous
/// children, no data) and a leaf otherwise. A leaf with an invalid
/// `data_index` is empty air.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct OctreeNode {
    /// This node's own slot, kept in sync with its array position
    pub index: u32,
    pub parent_index: u32,
    pub first_child_index: u32,
    pub data_index: u32,
    /// Grid coordinate at `depth`, 10 bits per axis: x | y << 10 | z << 20
    pub location: u32,
    pub depth: u8,
    /// Which of the parent's 8 children this node is
    pub parent_child_index: u8,
    pub _padding: [u8; 2],
}

static_assertions::assert_eq_size!(OctreeNode, [u8; 24]);

/// Parallel arrays of data records, indexed by data index
///
/// `owner_nodes[i]` is the node whose `data_index` is `i`.
#[derive(Clone, Debug, Default)]
pub struct VoxelDataStore {
    pub owner_nodes: Vec<u32>,
    pub voxels: Vec<BlockId>,
    pub physics: Vec<VoxelPhysicsData>,
    pub render: Vec<VoxelRenderData>,
    /// Live records; every slot at or beyond this is zeroed
    pub count: usize,
}

/// Sparse voxel octree for one chunk
pub struct VoxelOctreeData {
    /// Dense node arena; `nodes.len()` is the capacity
    pub nodes: Vec<OctreeNode>,
    /// Live nodes; every slot at or beyond this is zeroed
    pub node_count: usize,
    pub data: VoxelDataStore,

    /// Edge length of the cube in world units
    pub cube_size: u32,
    /// Depth at which nodes are one world unit wide
    pub size_one_depth: u8,
    /// Incremented by every structural change
    pub version: u64,

    /// Derives physics and render payloads from block ids
    pub lookup: Arc<dyn BlockLookup>,
}

impl fmt::Debug for VoxelOctreeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelOctreeData")
            .field("node_count", &self.node_count)
            .field("node_capacity", &self.nodes.len())
            .field("data_count", &self.data.count)
            .field("data_capacity", &self.data.voxels.len())
            .field("cube_size", &self.cube_size)
            .field("version", &self.version)
            .finish()
    }
}

/// Octree statistics
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeStats {
    pub node_count: usize,
    pub node_capacity: usize,
    pub data_count: usize,
    pub data_capacity: usize,
    pub max_live_depth: u8,
    pub memory_usage_kb: f32,
}
