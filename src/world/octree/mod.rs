//! Sparse voxel octree
//!
//! A dense node arena and a parallel data-record arena per chunk. Nodes
//! reference each other and their data by index; deletions swap the tail
//! into the freed slot so both arrays stay dense.

pub mod arena_operations;
pub mod octree_data;
pub mod octree_operations;
pub mod octree_serialization;
pub mod octree_validation;

pub use arena_operations::BlockMove;
pub use octree_data::{OctreeNode, OctreeStats, VoxelDataStore, VoxelOctreeData};
pub use octree_operations::{
    clear, create_voxel_octree, delete_children, get_stats, get_voxel, insert, is_branch,
    is_empty_leaf, is_leaf, leaf_bounds, leaf_voxel, merge_upwards, node_bounds, node_size,
    occupied_leaves, split,
};
pub use octree_serialization::{
    build_render_buffer, deserialize_octree, serialize_octree, RenderBufferHeader, StreamHeader,
};
pub use octree_validation::{check_octree, debug_validate, validate_octree, InvariantViolation};
