//! Homogeneous compound shape contract
//!
//! A physics engine sees a compound shape as many children of one shape
//! type. Children are addressed by a dense index; poses are local to the
//! compound.

use super::aabb::AABB;
use crate::error::VoxelResult;
use cgmath::{Point3, Quaternion, Vector3};

/// Position and orientation of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidPose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

/// Identity-oriented pose at `position`
pub fn pose_at(position: Vector3<f32>) -> RigidPose {
    RigidPose {
        position,
        orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
    }
}

/// Axis-aligned cube child shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelBox {
    pub half_extent: f32,
}

/// Ray with an unnormalized direction; hit distances are in units of it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

/// Query box swept along a displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepQuery {
    pub bounds: AABB,
    pub sweep: Vector3<f32>,
}

/// Receives ray hits against compound children
pub trait RayHitHandler {
    /// Whether a child should be tested at all
    fn allow_test(&self, _child_index: u32) -> bool {
        true
    }

    /// Called per hit in front-to-back order. Lowering `max_t` prunes
    /// everything further along the ray.
    fn on_ray_hit(
        &mut self,
        ray_index: usize,
        max_t: &mut f32,
        t: f32,
        normal: Vector3<f32>,
        child_index: u32,
    );
}

/// Nearest hit of a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub t: f32,
    pub normal: Vector3<f32>,
    pub child_index: u32,
}

/// Handler keeping only the closest hit per ray
#[derive(Debug, Clone, Default)]
pub struct ClosestHitHandler {
    pub hits: Vec<Option<RayHit>>,
}

impl RayHitHandler for ClosestHitHandler {
    fn on_ray_hit(
        &mut self,
        ray_index: usize,
        max_t: &mut f32,
        t: f32,
        normal: Vector3<f32>,
        child_index: u32,
    ) {
        if self.hits.len() <= ray_index {
            self.hits.resize(ray_index + 1, None);
        }
        if self.hits[ray_index].map_or(true, |hit| t < hit.t) {
            self.hits[ray_index] = Some(RayHit {
                t,
                normal,
                child_index,
            });
            *max_t = t;
        }
    }
}

/// Compound of same-typed children exposed to a physics engine
pub trait HomogeneousCompoundShape {
    type Child;

    fn child_count(&self) -> usize;

    /// Child shape without its pose
    fn get_local_child(&self, child_index: u32) -> Self::Child;

    /// Child shape and its pose local to the compound
    fn get_posed_local_child(&self, child_index: u32) -> (Self::Child, RigidPose);

    /// Bounds of all children under `orientation`
    fn compute_bounds(&self, orientation: Quaternion<f32>) -> VoxelResult<AABB>;

    /// Cast one ray given in the space `pose` is expressed in
    fn ray_test(
        &self,
        pose: &RigidPose,
        ray: &Ray,
        max_t: f32,
        handler: &mut dyn RayHitHandler,
    ) -> VoxelResult<()>;

    /// Cast several rays; hits report the ray's slice index
    fn ray_test_batch(
        &self,
        pose: &RigidPose,
        rays: &[Ray],
        max_t: f32,
        handler: &mut dyn RayHitHandler,
    ) -> VoxelResult<()>;

    /// Children overlapping each local-space query box
    fn find_local_overlaps(&self, queries: &[AABB]) -> Vec<Vec<u32>>;

    /// Children overlapping each query box over its sweep
    fn find_local_overlaps_swept(&self, queries: &[SweepQuery]) -> Vec<Vec<u32>>;
}
