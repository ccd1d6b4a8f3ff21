/// Data-Oriented Axis-Aligned Bounding Box System
///
/// Pure functions shared by the collider, the master BVH and chunk bounds.
/// No methods - just data transformations following DOP principles

use cgmath::{Point3, Vector3};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Create new AABB from min/max points
pub fn create_aabb(min: Point3<f32>, max: Point3<f32>) -> AABB {
    AABB { min, max }
}

/// Inverted box that any union replaces
pub fn empty_aabb() -> AABB {
    AABB {
        min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    }
}

/// Whether a box still is the inverted empty box
pub fn aabb_is_empty(aabb: &AABB) -> bool {
    aabb.min.x > aabb.max.x || aabb.min.y > aabb.max.y || aabb.min.z > aabb.max.z
}

/// Get center point of AABB
pub fn aabb_center(aabb: &AABB) -> Point3<f32> {
    Point3::new(
        (aabb.min.x + aabb.max.x) * 0.5,
        (aabb.min.y + aabb.max.y) * 0.5,
        (aabb.min.z + aabb.max.z) * 0.5,
    )
}

/// Test if two AABBs intersect; touching faces count
pub fn aabb_intersects(aabb1: &AABB, aabb2: &AABB) -> bool {
    aabb1.min.x <= aabb2.max.x && aabb1.max.x >= aabb2.min.x &&
    aabb1.min.y <= aabb2.max.y && aabb1.max.y >= aabb2.min.y &&
    aabb1.min.z <= aabb2.max.z && aabb1.max.z >= aabb2.min.z
}

/// Test if AABB contains a point
pub fn aabb_contains_point(aabb: &AABB, point: Point3<f32>) -> bool {
    point.x >= aabb.min.x && point.x <= aabb.max.x &&
    point.y >= aabb.min.y && point.y <= aabb.max.y &&
    point.z >= aabb.min.z && point.z <= aabb.max.z
}

/// Test if `outer` fully contains `inner`
pub fn aabb_contains_aabb(outer: &AABB, inner: &AABB) -> bool {
    aabb_contains_point(outer, inner.min) && aabb_contains_point(outer, inner.max)
}

/// Smallest box containing both
pub fn aabb_union(a: &AABB, b: &AABB) -> AABB {
    AABB {
        min: Point3::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y), a.min.z.min(b.min.z)),
        max: Point3::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y), a.max.z.max(b.max.z)),
    }
}

/// Surface area; zero for the empty box
pub fn aabb_surface_area(aabb: &AABB) -> f32 {
    if aabb_is_empty(aabb) {
        return 0.0;
    }
    let e = aabb.max - aabb.min;
    2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
}

/// Create translated copy of AABB
pub fn aabb_translated(aabb: &AABB, offset: Vector3<f32>) -> AABB {
    AABB {
        min: aabb.min + offset,
        max: aabb.max + offset,
    }
}

/// Box covering every position of `aabb` moved along `sweep`
pub fn aabb_expanded_by_sweep(aabb: &AABB, sweep: Vector3<f32>) -> AABB {
    aabb_union(aabb, &aabb_translated(aabb, sweep))
}

/// Slab test; entry distance clamped to 0 when the origin is inside
///
/// `inv_dir` is the componentwise reciprocal of the ray direction.
pub fn aabb_ray_intersection(
    aabb: &AABB,
    origin: Point3<f32>,
    inv_dir: Vector3<f32>,
    max_t: f32,
) -> Option<f32> {
    let t1 = Vector3::new(
        (aabb.min.x - origin.x) * inv_dir.x,
        (aabb.min.y - origin.y) * inv_dir.y,
        (aabb.min.z - origin.z) * inv_dir.z,
    );
    let t2 = Vector3::new(
        (aabb.max.x - origin.x) * inv_dir.x,
        (aabb.max.y - origin.y) * inv_dir.y,
        (aabb.max.z - origin.z) * inv_dir.z,
    );

    let tmin = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
    let tmax = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

    if tmax >= tmin && tmax >= 0.0 && tmin <= max_t {
        Some(tmin.max(0.0))
    } else {
        None
    }
}
