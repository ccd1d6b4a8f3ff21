//! Octree invariant checker
//!
//! `check_octree` walks raw arrays so it can vet a deserialized candidate
//! before it is installed. `debug_validate` runs it after every mutation in
//! debug builds and panics on the first violation.

use super::octree_data::{OctreeNode, VoxelDataStore, VoxelOctreeData};
use super::octree_operations::{child_location, is_branch, is_leaf};
use crate::constants::octree::{CHILD_COUNT, INVALID_INDEX, MAX_DEPTH, ROOT_INDEX};
use crate::error::DeserializeError;
use crate::world::core::{BlockId, VoxelPhysicsData, VoxelRenderData};
use bytemuck::Zeroable;

/// First broken invariant found
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("node {index}: {reason}")]
    Node { index: u32, reason: String },

    #[error("data record {index}: {reason}")]
    Data { index: u32, reason: String },
}

impl From<InvariantViolation> for DeserializeError {
    fn from(violation: InvariantViolation) -> Self {
        match violation {
            InvariantViolation::Node { index, reason } => {
                DeserializeError::MalformedNode { index, reason }
            }
            InvariantViolation::Data { index, reason } => {
                DeserializeError::MalformedData { index, reason }
            }
        }
    }
}

fn node_error(index: u32, reason: impl Into<String>) -> InvariantViolation {
    InvariantViolation::Node {
        index,
        reason: reason.into(),
    }
}

fn data_error(index: u32, reason: impl Into<String>) -> InvariantViolation {
    InvariantViolation::Data {
        index,
        reason: reason.into(),
    }
}

fn voxel_of(node: &OctreeNode, data: &VoxelDataStore) -> BlockId {
    if node.data_index == INVALID_INDEX {
        BlockId::AIR
    } else {
        data.voxels[node.data_index as usize]
    }
}

/// Check every structural invariant of a node/data arena pair
pub fn check_octree(
    nodes: &[OctreeNode],
    node_count: usize,
    data: &VoxelDataStore,
) -> Result<(), InvariantViolation> {
    if node_count == 0
        || (node_count - 1) % CHILD_COUNT as usize != 0
        || node_count > nodes.len()
    {
        return Err(node_error(
            node_count as u32,
            format!(
                "live node count {} is not 1 + 8k within capacity {}",
                node_count,
                nodes.len()
            ),
        ));
    }
    if data.count > data.voxels.len() || data.count > data.owner_nodes.len() {
        return Err(data_error(data.count as u32, "live data count exceeds capacity"));
    }

    let root = &nodes[ROOT_INDEX as usize];
    if root.parent_index != INVALID_INDEX || root.depth != 0 || root.location != 0 {
        return Err(node_error(ROOT_INDEX, "root must have no parent, depth 0, location 0"));
    }

    for (slot, node) in nodes[..node_count].iter().enumerate() {
        let slot = slot as u32;
        if node.index != slot {
            return Err(node_error(slot, format!("index field says {}", node.index)));
        }
        if node.depth > MAX_DEPTH {
            return Err(node_error(slot, format!("depth {} exceeds MAX_DEPTH", node.depth)));
        }

        if is_branch(node) {
            let first = node.first_child_index;
            if node.data_index != INVALID_INDEX {
                return Err(node_error(slot, "branch holds a data record"));
            }
            if first == 0
                || (first - 1) % CHILD_COUNT != 0
                || first as usize + CHILD_COUNT as usize > node_count
            {
                return Err(node_error(slot, format!("child block {} out of range", first)));
            }
            for octant in 0..CHILD_COUNT {
                let child = &nodes[(first + octant) as usize];
                if child.parent_index != slot
                    || child.parent_child_index as u32 != octant
                    || child.depth != node.depth + 1
                    || child.location != child_location(node.location, octant)
                {
                    return Err(node_error(
                        first + octant,
                        format!("inconsistent child of {}", slot),
                    ));
                }
            }
        } else if node.data_index != INVALID_INDEX {
            let data_index = node.data_index as usize;
            if data_index >= data.count || data.owner_nodes[data_index] != slot {
                return Err(node_error(
                    slot,
                    format!("data index {} does not point back", data_index),
                ));
            }
        }
    }

    // Every live node must hang off the root exactly once
    let mut reached = 1usize;
    let mut stack = vec![ROOT_INDEX];
    while let Some(index) = stack.pop() {
        let node = &nodes[index as usize];
        if is_branch(node) {
            if reached + CHILD_COUNT as usize > node_count {
                return Err(node_error(index, "child blocks are shared or cyclic"));
            }
            reached += CHILD_COUNT as usize;
            stack.extend(node.first_child_index..node.first_child_index + CHILD_COUNT);
        }
    }
    if reached != node_count {
        return Err(node_error(
            ROOT_INDEX,
            format!("{} of {} nodes reachable", reached, node_count),
        ));
    }

    for data_index in 0..data.count {
        let owner = data.owner_nodes[data_index];
        let index = data_index as u32;
        if owner as usize >= node_count || nodes[owner as usize].data_index != index {
            return Err(data_error(index, format!("owner {} does not point back", owner)));
        }
        if data.voxels[data_index].is_air() {
            return Err(data_error(index, "air stored as a data record"));
        }
    }

    // Canonical form: no branch whose children are uniform leaves
    for (slot, node) in nodes[..node_count].iter().enumerate() {
        if !is_branch(node) {
            continue;
        }
        let first = node.first_child_index as usize;
        let children = &nodes[first..first + CHILD_COUNT as usize];
        let voxel = voxel_of(&children[0], data);
        if children
            .iter()
            .all(|child| is_leaf(child) && voxel_of(child, data) == voxel)
        {
            return Err(node_error(slot as u32, "uniform children were not merged"));
        }
    }

    if nodes[node_count..].iter().any(|node| *node != OctreeNode::zeroed()) {
        return Err(node_error(node_count as u32, "slot past live count is not zeroed"));
    }
    for slot in data.count..data.voxels.len() {
        if data.owner_nodes[slot] != 0
            || data.voxels[slot] != BlockId::AIR
            || data.physics[slot] != VoxelPhysicsData::default()
            || data.render[slot] != VoxelRenderData::zeroed()
        {
            return Err(data_error(slot as u32, "slot past live count is not zeroed"));
        }
    }

    Ok(())
}

/// Check an octree in place
pub fn validate_octree(octree: &VoxelOctreeData) -> Result<(), InvariantViolation> {
    check_octree(&octree.nodes, octree.node_count, &octree.data)
}

/// Panic on any invariant violation; a no-op in release builds
#[inline]
pub fn debug_validate(octree: &VoxelOctreeData) {
    if cfg!(debug_assertions) {
        if let Err(violation) = validate_octree(octree) {
            panic!("[octree_validation] invariant violated: {}", violation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OctreeConfig;
    use crate::world::blocks::create_default_payload_table;
    use crate::world::octree::octree_operations::{create_voxel_octree, insert};
    use cgmath::Point3;
    use std::sync::Arc;

    fn populated_octree() -> VoxelOctreeData {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut octree = create_voxel_octree(
            &OctreeConfig::default(),
            Arc::new(create_default_payload_table()),
        )
        .expect("octree");
        insert(&mut octree, Point3::new(1.0, 1.0, 1.0), 4, BlockId::STONE);
        insert(&mut octree, Point3::new(9.0, 3.0, 14.0), 2, BlockId::DIRT);
        octree
    }

    #[test]
    fn test_valid_tree_passes() {
        assert!(validate_octree(&populated_octree()).is_ok());
    }

    #[test]
    fn test_detects_stale_index() {
        let mut octree = populated_octree();
        octree.nodes[3].index = 4;
        assert!(matches!(
            validate_octree(&octree),
            Err(InvariantViolation::Node { index: 3, .. })
        ));
    }

    #[test]
    fn test_detects_broken_back_reference() {
        let mut octree = populated_octree();
        let owner = octree.data.owner_nodes[0];
        octree.data.owner_nodes[0] = if owner == 1 { 2 } else { 1 };
        assert!(validate_octree(&octree).is_err());
    }

    #[test]
    fn test_detects_dirty_tail() {
        let mut octree = populated_octree();
        let tail = octree.node_count;
        octree.nodes[tail].depth = 1;
        assert!(validate_octree(&octree).is_err());

        let mut octree = populated_octree();
        let tail = octree.data.count;
        octree.data.voxels[tail] = BlockId::SAND;
        assert!(matches!(validate_octree(&octree), Err(InvariantViolation::Data { .. })));
    }

    #[test]
    fn test_detects_branch_with_data() {
        let mut octree = populated_octree();
        octree.nodes[0].data_index = 0;
        assert!(validate_octree(&octree).is_err());
    }

    #[test]
    fn test_violation_maps_to_deserialize_error() {
        let error: DeserializeError = node_error(5, "bad").into();
        assert_eq!(
            error,
            DeserializeError::MalformedNode {
                index: 5,
                reason: "bad".to_string()
            }
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violated")]
    fn test_debug_validate_panics() {
        let mut octree = populated_octree();
        octree.nodes[1].parent_child_index = 7;
        debug_validate(&octree);
    }
}
