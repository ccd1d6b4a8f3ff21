//! Parametric octree ray traversal
//!
//! The ray is mirrored into the all-positive octant and children are
//! visited front to back using per-axis entry/exit parameters, so child
//! boxes never need their own intersection test. Mirrored axes are kept in
//! a 3-bit mask that maps visit order back to storage order.

use super::compound_shape::RayHitHandler;
use crate::constants::octree::{CHILD_COUNT, INVALID_INDEX, MAX_DEPTH, ROOT_INDEX};
use crate::world::octree::{is_leaf, VoxelOctreeData};
use cgmath::{Point3, Vector3};

/// Stand-in for zero direction components
pub const RAY_EPSILON: f32 = 1e-9;

const STACK_SIZE: usize = MAX_DEPTH as usize + 1;
const DONE: u32 = CHILD_COUNT;

#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    node: u32,
    t0: [f32; 3],
    t1: [f32; 3],
    tm: [f32; 3],
    /// Next child to visit in mirrored order, `DONE` when exhausted
    next_child: u32,
}

struct Traversal<'a> {
    octree: &'a VoxelOctreeData,
    mirror: u32,
    /// Sign of the unmirrored direction per axis
    direction_sign: [f32; 3],
    ray_index: usize,
    max_t: f32,
    handler: &'a mut dyn RayHitHandler,
}

#[inline]
fn max3(v: [f32; 3]) -> f32 {
    v[0].max(v[1]).max(v[2])
}

#[inline]
fn min3(v: [f32; 3]) -> f32 {
    v[0].min(v[1]).min(v[2])
}

/// First child hit, from the plane the ray enters through
fn first_node(t0: [f32; 3], tm: [f32; 3]) -> u32 {
    let mut child = 0;
    if t0[0] > t0[1] && t0[0] > t0[2] {
        // YZ plane
        if tm[1] < t0[0] {
            child |= 2;
        }
        if tm[2] < t0[0] {
            child |= 1;
        }
    } else if t0[1] > t0[2] {
        // XZ plane
        if tm[0] < t0[1] {
            child |= 4;
        }
        if tm[2] < t0[1] {
            child |= 1;
        }
    } else {
        // XY plane
        if tm[0] < t0[2] {
            child |= 4;
        }
        if tm[1] < t0[2] {
            child |= 2;
        }
    }
    child
}

/// Child reached after leaving `current` through its nearest exit plane
fn next_node(exit: [f32; 3], current: u32) -> u32 {
    let step = |bit: u32| if current & bit == 0 { current | bit } else { DONE };
    if exit[0] < exit[1] {
        if exit[0] < exit[2] {
            return step(4);
        }
    } else if exit[1] < exit[2] {
        return step(2);
    }
    step(1)
}

/// Parametric interval of child `octant` within a frame
fn child_interval(frame: &Frame, octant: u32) -> ([f32; 3], [f32; 3]) {
    let mut t0 = [0.0; 3];
    let mut t1 = [0.0; 3];
    for axis in 0..3 {
        if octant & (4 >> axis) != 0 {
            t0[axis] = frame.tm[axis];
            t1[axis] = frame.t1[axis];
        } else {
            t0[axis] = frame.t0[axis];
            t1[axis] = frame.tm[axis];
        }
    }
    (t0, t1)
}

impl Traversal<'_> {
    /// Report a leaf or open a frame for a branch
    fn visit(&mut self, node_index: u32, t0: [f32; 3], t1: [f32; 3]) -> Option<Frame> {
        if t1.iter().any(|&t| t < 0.0) || max3(t0) > self.max_t {
            return None;
        }

        let node = &self.octree.nodes[node_index as usize];
        if is_leaf(node) {
            let data_index = node.data_index;
            if data_index != INVALID_INDEX && self.handler.allow_test(data_index) {
                let entry = max3(t0);
                let axis = if t0[0] >= t0[1] && t0[0] >= t0[2] {
                    0
                } else if t0[1] >= t0[2] {
                    1
                } else {
                    2
                };
                let mut normal = Vector3::new(0.0, 0.0, 0.0);
                normal[axis] = -self.direction_sign[axis];
                self.handler.on_ray_hit(
                    self.ray_index,
                    &mut self.max_t,
                    entry.max(0.0),
                    normal,
                    data_index,
                );
            }
            return None;
        }

        let tm = [
            0.5 * (t0[0] + t1[0]),
            0.5 * (t0[1] + t1[1]),
            0.5 * (t0[2] + t1[2]),
        ];
        Some(Frame {
            node: node_index,
            t0,
            t1,
            tm,
            next_child: first_node(t0, tm),
        })
    }
}

/// Walk `octree` along a ray given in the octree's local space
///
/// Occupied leaves are reported front to back through `handler`.
pub fn raycast_octree(
    octree: &VoxelOctreeData,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    ray_index: usize,
    max_t: f32,
    handler: &mut dyn RayHitHandler,
) {
    let size = octree.cube_size as f32;
    let mut o = [origin.x, origin.y, origin.z];
    let mut d = [direction.x, direction.y, direction.z];
    let mut direction_sign = [1.0; 3];
    let mut mirror = 0u32;

    for axis in 0..3 {
        if d[axis] == 0.0 {
            d[axis] = RAY_EPSILON;
        }
        if d[axis] < 0.0 {
            o[axis] = size - o[axis];
            d[axis] = -d[axis];
            direction_sign[axis] = -1.0;
            mirror |= 4 >> axis;
        }
    }

    let mut t0 = [0.0; 3];
    let mut t1 = [0.0; 3];
    for axis in 0..3 {
        t0[axis] = -o[axis] / d[axis];
        t1[axis] = (size - o[axis]) / d[axis];
    }
    if max3(t0) >= min3(t1) || min3(t1) < 0.0 {
        return;
    }

    let mut traversal = Traversal {
        octree,
        mirror,
        direction_sign,
        ray_index,
        max_t,
        handler,
    };

    let mut stack = [Frame::default(); STACK_SIZE];
    let mut len = 0;
    if let Some(root) = traversal.visit(ROOT_INDEX, t0, t1) {
        stack[0] = root;
        len = 1;
    }

    while len > 0 {
        let frame = stack[len - 1];
        if frame.next_child == DONE {
            len -= 1;
            continue;
        }

        let octant = frame.next_child;
        let (child_t0, child_t1) = child_interval(&frame, octant);
        stack[len - 1].next_child = next_node(child_t1, octant);

        let first_child = traversal.octree.nodes[frame.node as usize].first_child_index;
        let child = first_child + (octant ^ traversal.mirror);
        if let Some(child_frame) = traversal.visit(child, child_t0, child_t1) {
            debug_assert!(len < STACK_SIZE, "ray traversal deeper than MAX_DEPTH");
            stack[len] = child_frame;
            len += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_node_entry_planes() {
        // Entering through x = 0 below the y and z midplanes
        assert_eq!(first_node([1.0, -5.0, -5.0], [3.0, 4.0, 4.0]), 0);
        // Entering through x = 0 above both midplanes
        assert_eq!(first_node([1.0, -5.0, -5.0], [3.0, 0.5, 0.5]), 3);
        assert_eq!(first_node([-5.0, 1.0, -5.0], [0.5, 3.0, 4.0]), 4);
    }

    #[test]
    fn test_next_node_prefers_nearest_exit() {
        assert_eq!(next_node([1.0, 2.0, 3.0], 0), 4);
        assert_eq!(next_node([3.0, 1.0, 2.0], 0), 2);
        assert_eq!(next_node([3.0, 2.0, 1.0], 0), 1);
        assert_eq!(next_node([1.0, 2.0, 3.0], 4), DONE);
        // Ties resolve towards z, then y
        assert_eq!(next_node([1.0, 1.0, 1.0], 0), 1);
        assert_eq!(next_node([1.0, 1.0, 2.0], 0), 2);
    }

    #[test]
    fn test_child_interval_halves() {
        let frame = Frame {
            node: 0,
            t0: [0.0, 1.0, 2.0],
            t1: [4.0, 5.0, 6.0],
            tm: [2.0, 3.0, 4.0],
            next_child: 0,
        };
        assert_eq!(child_interval(&frame, 0), ([0.0, 1.0, 2.0], [2.0, 3.0, 4.0]));
        assert_eq!(child_interval(&frame, 5), ([2.0, 1.0, 4.0], [4.0, 3.0, 6.0]));
    }
}
