//! Master BVH Data - Pure DOP
//!
//! NO METHODS. Just data.
//! Construction and queries live in bvh_operations.rs

use crate::physics::AABB;
use bytemuck::{Pod, Zeroable};

/// BVH node format optimized for GPU traversal
///
/// `prim_count == 0` marks a branch whose children sit at `left_first` and
/// `left_first + 1`. Otherwise the node is a leaf covering
/// `indices[left_first..left_first + prim_count]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    /// Bounding box min
    pub aabb_min: [f32; 3],
    /// Left child index, or first index slot if leaf
    pub left_first: u32,
    /// Bounding box max
    pub aabb_max: [f32; 3],
    /// Box count (0 for internal nodes)
    pub prim_count: u32,
}

/// Write-once binary BVH over a snapshot of boxes
#[derive(Debug, Clone, Default)]
pub struct MasterBvhTree {
    /// `2N - 1` slots; only the first `nodes_used` are live
    pub nodes: Vec<BvhNode>,
    /// Permutation of box indices, grouped by leaf
    pub indices: Vec<u32>,
    /// Copy of the input boxes for exact leaf tests
    pub boxes: Vec<AABB>,
    pub nodes_used: u32,
    pub max_depth: u32,
}

/// Box hit by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhRayHit {
    pub box_index: u32,
    pub t: f32,
}

/// BVH statistics
#[derive(Debug, Clone, PartialEq)]
pub struct BvhStats {
    pub node_count: u32,
    pub leaf_count: u32,
    pub box_count: u32,
    pub max_depth: u32,
    pub memory_usage_kb: f32,
}
