//! Whole-world acceleration structures
//!
//! The master BVH is built once over a snapshot of chunk or voxel bounds
//! and rebuilt from scratch whenever the snapshot changes.

pub mod bvh_data;
pub mod bvh_operations;
pub mod bvh_worker;

pub use bvh_data::{BvhNode, BvhRayHit, BvhStats, MasterBvhTree};
pub use bvh_operations::{cast_ray, construct_master_bvh, get_stats, node_aabb, query_overlaps};
pub use bvh_worker::{create_bvh_worker, request_rebuild, try_take_latest, BvhRebuildWorker};
