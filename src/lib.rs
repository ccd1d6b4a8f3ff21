// Voxel Octree - Data-Oriented Programming (DOP) Architecture
//
// Per-chunk sparse voxel octrees, a physics collision adapter over them and
// a master BVH over chunk or voxel bounds.
//
// Data lives in plain structs (`*_data.rs`); behaviour lives in free
// functions (`*_operations.rs`) that take the data they transform.

// Constants module
pub mod constants;

pub mod config;
pub mod error;

pub mod physics;
pub mod renderer;
pub mod world;

pub use config::{
    load_config_from_file, load_config_from_str, BvhConfig, OctreeConfig, SplitStrategy,
    VoxelEngineConfig,
};
pub use error::{DeserializeError, OptionExt, VoxelError, VoxelResult};
pub use physics::{create_voxel_collider, HomogeneousCompoundShape, Ray, VoxelCollider, AABB};
// === Core World Types ===
pub use world::compute::{construct_master_bvh, BvhNode, MasterBvhTree};
pub use world::core::{BlockId, BlockLookup, BlockPayloadTable, ChunkPos};
pub use world::octree::{
    create_voxel_octree, delete_children, deserialize_octree, get_voxel, insert, merge_upwards,
    serialize_octree, split, VoxelOctreeData,
};
pub use world::{create_voxel_chunk, VoxelChunk};

/// Install `env_logger` writing to stdout, filtered by `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}
