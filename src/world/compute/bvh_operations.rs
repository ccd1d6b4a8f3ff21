//! Master BVH Operations - Pure DOP Functions
//!
//! One-shot construction over a box snapshot with either a midpoint or a
//! binned SAH split, plus overlap and ray queries over the result.

use super::bvh_data::{BvhNode, BvhRayHit, BvhStats, MasterBvhTree};
use crate::config::{BvhConfig, SplitStrategy};
use crate::constants::bvh::{MAX_BUILD_DEPTH, SAH_BIN_COUNT};
use crate::physics::aabb::{
    aabb_center, aabb_intersects, aabb_ray_intersection, aabb_surface_area, aabb_union,
    create_aabb, empty_aabb, AABB,
};
use crate::physics::Ray;
use bytemuck::Zeroable;
use cgmath::{Point3, Vector3};

#[inline]
pub fn is_leaf(node: &BvhNode) -> bool {
    node.prim_count > 0
}

/// Bounds of a node as an AABB
pub fn node_aabb(node: &BvhNode) -> AABB {
    create_aabb(Point3::from(node.aabb_min), Point3::from(node.aabb_max))
}

fn set_node_bounds(node: &mut BvhNode, bounds: &AABB) {
    node.aabb_min = bounds.min.into();
    node.aabb_max = bounds.max.into();
}

/// Recompute a node's bounds from the boxes it covers
fn update_node_bounds(tree: &mut MasterBvhTree, node_index: u32) {
    let node = tree.nodes[node_index as usize];
    let first = node.left_first as usize;
    let bounds = tree.indices[first..first + node.prim_count as usize]
        .iter()
        .fold(empty_aabb(), |acc, &i| aabb_union(&acc, &tree.boxes[i as usize]));
    set_node_bounds(&mut tree.nodes[node_index as usize], &bounds);
}

/// Two-pointer in-place partition on centroid; returns the left count
fn partition(indices: &mut [u32], centroids: &[[f32; 3]], axis: usize, position: f32) -> usize {
    let mut i = 0;
    let mut j = indices.len();
    while i < j {
        if centroids[indices[i] as usize][axis] < position {
            i += 1;
        } else {
            j -= 1;
            indices.swap(i, j);
        }
    }
    i
}

/// Longest axis of the node, split at its middle
fn midpoint_split(node: &BvhNode, max_leaf_size: u32) -> Option<(usize, f32)> {
    if node.prim_count <= max_leaf_size {
        return None;
    }
    let extent = [
        node.aabb_max[0] - node.aabb_min[0],
        node.aabb_max[1] - node.aabb_min[1],
        node.aabb_max[2] - node.aabb_min[2],
    ];
    let mut axis = 0;
    if extent[1] > extent[axis] {
        axis = 1;
    }
    if extent[2] > extent[axis] {
        axis = 2;
    }
    Some((axis, node.aabb_min[axis] + extent[axis] * 0.5))
}

#[derive(Clone, Copy)]
struct Bin {
    bounds: AABB,
    count: u32,
}

/// Cheapest binned SAH plane, if it beats not splitting
fn binned_sah_split(
    tree: &MasterBvhTree,
    centroids: &[[f32; 3]],
    node: &BvhNode,
) -> Option<(usize, f32)> {
    if node.prim_count <= 1 {
        return None;
    }
    let first = node.left_first as usize;
    let covered = &tree.indices[first..first + node.prim_count as usize];

    let mut best: Option<(usize, f32, f32)> = None;
    for axis in 0..3 {
        let (min, max) = covered.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &i| {
            let c = centroids[i as usize][axis];
            (lo.min(c), hi.max(c))
        });
        if min == max {
            continue;
        }

        let mut bins = [Bin {
            bounds: empty_aabb(),
            count: 0,
        }; SAH_BIN_COUNT];
        let scale = SAH_BIN_COUNT as f32 / (max - min);
        for &i in covered {
            let offset = centroids[i as usize][axis] - min;
            let bin = ((offset * scale) as usize).min(SAH_BIN_COUNT - 1);
            bins[bin].count += 1;
            bins[bin].bounds = aabb_union(&bins[bin].bounds, &tree.boxes[i as usize]);
        }

        // Sweep once from each side over the SAH_BIN_COUNT - 1 planes
        let mut left_area = [0.0f32; SAH_BIN_COUNT - 1];
        let mut right_area = [0.0f32; SAH_BIN_COUNT - 1];
        let mut left_count = [0u32; SAH_BIN_COUNT - 1];
        let mut right_count = [0u32; SAH_BIN_COUNT - 1];
        let mut left_box = empty_aabb();
        let mut right_box = empty_aabb();
        let mut left_sum = 0;
        let mut right_sum = 0;
        for i in 0..SAH_BIN_COUNT - 1 {
            left_sum += bins[i].count;
            left_count[i] = left_sum;
            left_box = aabb_union(&left_box, &bins[i].bounds);
            left_area[i] = aabb_surface_area(&left_box);

            let j = SAH_BIN_COUNT - 1 - i;
            right_sum += bins[j].count;
            right_count[j - 1] = right_sum;
            right_box = aabb_union(&right_box, &bins[j].bounds);
            right_area[j - 1] = aabb_surface_area(&right_box);
        }

        let plane_width = (max - min) / SAH_BIN_COUNT as f32;
        for i in 0..SAH_BIN_COUNT - 1 {
            if left_count[i] == 0 || right_count[i] == 0 {
                continue;
            }
            let cost = left_count[i] as f32 * left_area[i] + right_count[i] as f32 * right_area[i];
            if best.map_or(true, |(_, _, best_cost)| cost < best_cost) {
                best = Some((axis, min + plane_width * (i + 1) as f32, cost));
            }
        }
    }

    let no_split_cost = aabb_surface_area(&node_aabb(node)) * node.prim_count as f32;
    match best {
        Some((axis, position, cost)) if cost < no_split_cost => Some((axis, position)),
        _ => None,
    }
}

fn subdivide(
    tree: &mut MasterBvhTree,
    centroids: &[[f32; 3]],
    node_index: u32,
    depth: u32,
    config: &BvhConfig,
) {
    tree.max_depth = tree.max_depth.max(depth);
    if depth >= MAX_BUILD_DEPTH {
        return;
    }

    let node = tree.nodes[node_index as usize];
    let split = match config.strategy {
        SplitStrategy::Midpoint => midpoint_split(&node, config.max_leaf_size),
        SplitStrategy::BinnedSah => binned_sah_split(tree, centroids, &node),
    };
    let Some((axis, position)) = split else {
        return;
    };

    let first = node.left_first as usize;
    let count = node.prim_count as usize;
    let left_count = partition(&mut tree.indices[first..first + count], centroids, axis, position);
    if left_count == 0 || left_count == count {
        return;
    }

    let left = tree.nodes_used;
    tree.nodes_used += 2;
    tree.nodes[left as usize] = BvhNode {
        left_first: first as u32,
        prim_count: left_count as u32,
        ..BvhNode::zeroed()
    };
    tree.nodes[left as usize + 1] = BvhNode {
        left_first: (first + left_count) as u32,
        prim_count: (count - left_count) as u32,
        ..BvhNode::zeroed()
    };
    tree.nodes[node_index as usize].left_first = left;
    tree.nodes[node_index as usize].prim_count = 0;

    update_node_bounds(tree, left);
    update_node_bounds(tree, left + 1);
    subdivide(tree, centroids, left, depth + 1, config);
    subdivide(tree, centroids, left + 1, depth + 1, config);
}

/// Build a BVH over `boxes`
pub fn construct_master_bvh(boxes: &[AABB], config: &BvhConfig) -> MasterBvhTree {
    let box_count = boxes.len();
    let mut tree = MasterBvhTree {
        nodes: vec![BvhNode::zeroed(); (2 * box_count).saturating_sub(1)],
        indices: (0..box_count as u32).collect(),
        boxes: boxes.to_vec(),
        nodes_used: 0,
        max_depth: 0,
    };
    if box_count == 0 {
        log::debug!("[bvh_operations::construct_master_bvh] No boxes, empty tree");
        return tree;
    }

    let centroids: Vec<[f32; 3]> = boxes.iter().map(|b| aabb_center(b).into()).collect();
    tree.nodes[0].left_first = 0;
    tree.nodes[0].prim_count = box_count as u32;
    tree.nodes_used = 1;
    update_node_bounds(&mut tree, 0);
    subdivide(&mut tree, &centroids, 0, 0, config);

    log::info!(
        "[bvh_operations::construct_master_bvh] {} boxes -> {} nodes, depth {} ({:?})",
        box_count,
        tree.nodes_used,
        tree.max_depth,
        config.strategy
    );
    tree
}

/// Boxes overlapping `query`, in leaf order
pub fn query_overlaps(tree: &MasterBvhTree, query: &AABB) -> Vec<u32> {
    let mut result = Vec::new();
    if tree.nodes_used == 0 {
        return result;
    }

    let mut stack = vec![0u32];
    while let Some(node_index) = stack.pop() {
        let node = &tree.nodes[node_index as usize];
        if !aabb_intersects(&node_aabb(node), query) {
            continue;
        }
        if is_leaf(node) {
            let first = node.left_first as usize;
            result.extend(
                tree.indices[first..first + node.prim_count as usize]
                    .iter()
                    .filter(|&&i| aabb_intersects(&tree.boxes[i as usize], query)),
            );
        } else {
            stack.push(node.left_first + 1);
            stack.push(node.left_first);
        }
    }
    result
}

/// Boxes hit by a ray within `max_t`, nearest first
pub fn cast_ray(tree: &MasterBvhTree, ray: &Ray, max_t: f32) -> Vec<BvhRayHit> {
    let mut hits = Vec::new();
    if tree.nodes_used == 0 {
        return hits;
    }

    let inv_dir = Vector3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );
    let node_hit = |index: u32| {
        aabb_ray_intersection(&node_aabb(&tree.nodes[index as usize]), ray.origin, inv_dir, max_t)
    };

    let mut stack = Vec::new();
    if node_hit(0).is_some() {
        stack.push(0u32);
    }
    while let Some(node_index) = stack.pop() {
        let node = &tree.nodes[node_index as usize];
        if is_leaf(node) {
            let first = node.left_first as usize;
            for &box_index in &tree.indices[first..first + node.prim_count as usize] {
                let bounds = &tree.boxes[box_index as usize];
                if let Some(t) = aabb_ray_intersection(bounds, ray.origin, inv_dir, max_t) {
                    hits.push(BvhRayHit { box_index, t });
                }
            }
            continue;
        }

        // Push the far child first so the near one is visited next
        let left = node.left_first;
        match (node_hit(left), node_hit(left + 1)) {
            (Some(tl), Some(tr)) if tl <= tr => stack.extend([left + 1, left]),
            (Some(_), Some(_)) => stack.extend([left, left + 1]),
            (Some(_), None) => stack.push(left),
            (None, Some(_)) => stack.push(left + 1),
            (None, None) => {}
        }
    }

    hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));
    hits
}

/// Get BVH statistics
pub fn get_stats(tree: &MasterBvhTree) -> BvhStats {
    let live = &tree.nodes[..tree.nodes_used as usize];
    BvhStats {
        node_count: tree.nodes_used,
        leaf_count: live.iter().filter(|n| is_leaf(n)).count() as u32,
        box_count: tree.boxes.len() as u32,
        max_depth: tree.max_depth,
        memory_usage_kb: (tree.nodes.len() * std::mem::size_of::<BvhNode>()
            + tree.indices.len() * std::mem::size_of::<u32>()) as f32
            / 1024.0,
    }
}
