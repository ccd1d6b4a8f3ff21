//! Physics Module - octree collision adapter
//!
//! Exposes a voxel octree to a physics engine as a homogeneous compound of
//! boxes, with parametric ray traversal and brute-force overlap queries.

pub mod aabb;
pub mod compound_shape;
pub mod octree_raycast;
pub mod voxel_collider;

pub use aabb::AABB;
pub use compound_shape::{
    pose_at, ClosestHitHandler, HomogeneousCompoundShape, Ray, RayHit, RayHitHandler, RigidPose,
    SweepQuery, VoxelBox,
};
pub use octree_raycast::raycast_octree;
pub use voxel_collider::{create_voxel_collider, is_identity_orientation, VoxelCollider};
