//! Octree as a compound of voxel boxes
//!
//! One child per data record. The collider borrows the octree, so it
//! cannot outlive the read guard the caller holds on it.

use super::aabb::{
    aabb_expanded_by_sweep, aabb_intersects, aabb_union, create_aabb, empty_aabb, AABB,
};
use super::compound_shape::{
    pose_at, HomogeneousCompoundShape, Ray, RayHitHandler, RigidPose, SweepQuery, VoxelBox,
};
use super::octree_raycast::raycast_octree;
use crate::constants::octree::{CHILD_OFFSETS, INVALID_INDEX};
use crate::error::{VoxelError, VoxelResult};
use crate::world::octree::{leaf_bounds, node_size, occupied_leaves, VoxelOctreeData};
use cgmath::{Point3, Quaternion, Vector3};

const IDENTITY_EPSILON: f32 = 1e-6;

/// Read-only physics view of one octree
#[derive(Debug, Clone, Copy)]
pub struct VoxelCollider<'a> {
    pub octree: &'a VoxelOctreeData,
}

pub fn create_voxel_collider(octree: &VoxelOctreeData) -> VoxelCollider<'_> {
    VoxelCollider { octree }
}

/// Identity rotation, accepting either sign of the quaternion
pub fn is_identity_orientation(orientation: &Quaternion<f32>) -> bool {
    (orientation.s.abs() - 1.0).abs() <= IDENTITY_EPSILON
        && orientation.v.x.abs() <= IDENTITY_EPSILON
        && orientation.v.y.abs() <= IDENTITY_EPSILON
        && orientation.v.z.abs() <= IDENTITY_EPSILON
}

fn require_identity(orientation: &Quaternion<f32>) -> VoxelResult<()> {
    if is_identity_orientation(orientation) {
        Ok(())
    } else {
        Err(VoxelError::UnsupportedOrientation {
            orientation: [orientation.s, orientation.v.x, orientation.v.y, orientation.v.z],
        })
    }
}

fn overlapping_children(octree: &VoxelOctreeData, query: &AABB) -> Vec<u32> {
    occupied_leaves(octree)
        .filter(|&(_, node)| aabb_intersects(&leaf_bounds(octree, node), query))
        .map(|(data_index, _)| data_index)
        .collect()
}

impl HomogeneousCompoundShape for VoxelCollider<'_> {
    type Child = VoxelBox;

    fn child_count(&self) -> usize {
        self.octree.data.count
    }

    fn get_local_child(&self, child_index: u32) -> VoxelBox {
        assert!(
            (child_index as usize) < self.octree.data.count,
            "child index {} out of range for {} children",
            child_index,
            self.octree.data.count
        );
        let owner = self.octree.data.owner_nodes[child_index as usize];
        let depth = self.octree.nodes[owner as usize].depth;
        VoxelBox {
            half_extent: 0.5 * node_size(self.octree, depth),
        }
    }

    /// Rebuilds the position from the parent chain on every call
    fn get_posed_local_child(&self, child_index: u32) -> (VoxelBox, RigidPose) {
        let shape = self.get_local_child(child_index);
        let nodes = &self.octree.nodes;

        let mut min = Vector3::new(0.0, 0.0, 0.0);
        let mut current = self.octree.data.owner_nodes[child_index as usize];
        while nodes[current as usize].parent_index != INVALID_INDEX {
            let node = &nodes[current as usize];
            let size = node_size(self.octree, node.depth);
            let offset = CHILD_OFFSETS[node.parent_child_index as usize];
            min += Vector3::new(offset[0] as f32, offset[1] as f32, offset[2] as f32) * size;
            current = node.parent_index;
        }

        let half = Vector3::new(shape.half_extent, shape.half_extent, shape.half_extent);
        (shape, pose_at(min + half))
    }

    fn compute_bounds(&self, orientation: Quaternion<f32>) -> VoxelResult<AABB> {
        require_identity(&orientation)?;

        if self.octree.data.count == 0 {
            let origin = Point3::new(0.0, 0.0, 0.0);
            return Ok(create_aabb(origin, origin));
        }
        Ok(occupied_leaves(self.octree).fold(empty_aabb(), |acc, (_, node)| {
            aabb_union(&acc, &leaf_bounds(self.octree, node))
        }))
    }

    fn ray_test(
        &self,
        pose: &RigidPose,
        ray: &Ray,
        max_t: f32,
        handler: &mut dyn RayHitHandler,
    ) -> VoxelResult<()> {
        self.ray_test_batch(pose, std::slice::from_ref(ray), max_t, handler)
    }

    fn ray_test_batch(
        &self,
        pose: &RigidPose,
        rays: &[Ray],
        max_t: f32,
        handler: &mut dyn RayHitHandler,
    ) -> VoxelResult<()> {
        require_identity(&pose.orientation)?;

        for (ray_index, ray) in rays.iter().enumerate() {
            raycast_octree(
                self.octree,
                ray.origin - pose.position,
                ray.direction,
                ray_index,
                max_t,
                handler,
            );
        }
        Ok(())
    }

    fn find_local_overlaps(&self, queries: &[AABB]) -> Vec<Vec<u32>> {
        queries
            .iter()
            .map(|query| overlapping_children(self.octree, query))
            .collect()
    }

    fn find_local_overlaps_swept(&self, queries: &[SweepQuery]) -> Vec<Vec<u32>> {
        queries
            .iter()
            .map(|query| {
                let swept = aabb_expanded_by_sweep(&query.bounds, query.sweep);
                overlapping_children(self.octree, &swept)
            })
            .collect()
    }
}
