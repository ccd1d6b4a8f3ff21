//! Node and data arena storage - Pure DOP Functions
//!
//! Allocation, swap-compaction and capacity management for the two dense
//! arrays behind an octree. Both arrays are kept at a power-of-two length
//! and every slot past the live count is zeroed.

use super::octree_data::{OctreeNode, VoxelDataStore, VoxelOctreeData};
use crate::constants::octree::{CHILD_COUNT, INVALID_INDEX, MIN_CAPACITY};
use crate::world::core::{BlockId, VoxelPhysicsData, VoxelRenderData};
use bytemuck::Zeroable;

/// A block of 8 sibling nodes moved by compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMove {
    pub from: u32,
    pub to: u32,
}

impl BlockMove {
    /// Where `node` lives after this move
    #[inline]
    pub fn relocate(&self, node: u32) -> u32 {
        if node >= self.from && node < self.from + CHILD_COUNT {
            self.to + (node - self.from)
        } else {
            node
        }
    }
}

/// Capacity after growing `capacity` by doubling until `required` fits
pub fn grown_capacity(capacity: usize, required: usize) -> usize {
    let mut capacity = capacity.max(MIN_CAPACITY);
    while capacity < required {
        capacity *= 2;
    }
    capacity
}

/// Capacity after halving while fewer than a quarter of slots are live
pub fn shrunk_capacity(capacity: usize, live: usize) -> usize {
    let mut capacity = capacity;
    while capacity > MIN_CAPACITY && live < capacity / 4 {
        capacity /= 2;
    }
    capacity.max(MIN_CAPACITY)
}

pub(crate) fn create_data_store(capacity: usize) -> VoxelDataStore {
    VoxelDataStore {
        owner_nodes: vec![0; capacity],
        voxels: vec![BlockId::AIR; capacity],
        physics: vec![VoxelPhysicsData::default(); capacity],
        render: vec![VoxelRenderData::zeroed(); capacity],
        count: 0,
    }
}

fn resize_data_store(store: &mut VoxelDataStore, capacity: usize) {
    store.owner_nodes.resize(capacity, 0);
    store.voxels.resize(capacity, BlockId::AIR);
    store.physics.resize(capacity, VoxelPhysicsData::default());
    store.render.resize(capacity, VoxelRenderData::zeroed());
    if capacity < store.owner_nodes.capacity() / 2 {
        store.owner_nodes.shrink_to_fit();
        store.voxels.shrink_to_fit();
        store.physics.shrink_to_fit();
        store.render.shrink_to_fit();
    }
}

fn ensure_node_capacity(octree: &mut VoxelOctreeData, required: usize) {
    let capacity = octree.nodes.len();
    if required > capacity {
        let new_capacity = grown_capacity(capacity, required);
        log::debug!(
            "[arena_operations::grow_nodes] {} -> {} slots",
            capacity,
            new_capacity
        );
        octree.nodes.resize(new_capacity, OctreeNode::zeroed());
    }
}

fn shrink_nodes_if_sparse(octree: &mut VoxelOctreeData) {
    let capacity = octree.nodes.len();
    let new_capacity = shrunk_capacity(capacity, octree.node_count);
    if new_capacity < capacity {
        log::debug!(
            "[arena_operations::shrink_nodes] {} -> {} slots",
            capacity,
            new_capacity
        );
        octree.nodes.truncate(new_capacity);
        octree.nodes.shrink_to_fit();
    }
}

fn ensure_data_capacity(octree: &mut VoxelOctreeData, required: usize) {
    let capacity = octree.data.voxels.len();
    if required > capacity {
        let new_capacity = grown_capacity(capacity, required);
        log::debug!(
            "[arena_operations::grow_data] {} -> {} slots",
            capacity,
            new_capacity
        );
        resize_data_store(&mut octree.data, new_capacity);
    }
}

fn shrink_data_if_sparse(octree: &mut VoxelOctreeData) {
    let capacity = octree.data.voxels.len();
    let new_capacity = shrunk_capacity(capacity, octree.data.count);
    if new_capacity < capacity {
        log::debug!(
            "[arena_operations::shrink_data] {} -> {} slots",
            capacity,
            new_capacity
        );
        resize_data_store(&mut octree.data, new_capacity);
    }
}

/// Reserve 8 contiguous node slots at the tail, returning the first
///
/// The slots are left zeroed for the caller to fill in.
pub fn allocate_child_block(octree: &mut VoxelOctreeData) -> u32 {
    let start = octree.node_count;
    ensure_node_capacity(octree, start + CHILD_COUNT as usize);
    octree.node_count += CHILD_COUNT as usize;
    start as u32
}

/// Free the 8-node block at `start` by moving the tail block into it
///
/// The freed nodes must already be childless and hold no data. The
/// parent's `first_child_index` is reset. Every reference to the moved
/// block is rewritten; the move is returned so callers can relocate any
/// handles they still hold.
pub fn free_child_block(octree: &mut VoxelOctreeData, start: u32) -> Option<BlockMove> {
    let tail = (octree.node_count - CHILD_COUNT as usize) as u32;
    assert!(
        start >= 1 && (start - 1) % CHILD_COUNT == 0 && start <= tail,
        "free_child_block: {} is not a live child block",
        start
    );

    // Detach first so a moved parent no longer points at the freed slots
    let parent = octree.nodes[start as usize].parent_index;
    octree.nodes[parent as usize].first_child_index = INVALID_INDEX;

    for i in start..start + CHILD_COUNT {
        let node = &octree.nodes[i as usize];
        debug_assert_eq!(node.first_child_index, INVALID_INDEX, "freeing branch {}", i);
        debug_assert_eq!(node.data_index, INVALID_INDEX, "freeing node {} with data", i);
    }

    let moved = if start != tail {
        for offset in 0..CHILD_COUNT {
            let from = tail + offset;
            let to = start + offset;
            let mut node = octree.nodes[from as usize];
            node.index = to;

            if node.first_child_index != INVALID_INDEX {
                for c in 0..CHILD_COUNT {
                    octree.nodes[(node.first_child_index + c) as usize].parent_index = to;
                }
            }
            if node.data_index != INVALID_INDEX {
                octree.data.owner_nodes[node.data_index as usize] = to;
            }
            octree.nodes[to as usize] = node;
        }

        let moved_parent = octree.nodes[start as usize].parent_index;
        octree.nodes[moved_parent as usize].first_child_index = start;
        Some(BlockMove {
            from: tail,
            to: start,
        })
    } else {
        None
    };

    for slot in &mut octree.nodes[tail as usize..(tail + CHILD_COUNT) as usize] {
        *slot = OctreeNode::zeroed();
    }
    octree.node_count -= CHILD_COUNT as usize;
    shrink_nodes_if_sparse(octree);

    moved
}

/// Append a data record owned by `owner`, deriving payloads from `voxel`
pub fn allocate_data(octree: &mut VoxelOctreeData, owner: u32, voxel: BlockId) -> u32 {
    debug_assert!(!voxel.is_air(), "air never gets a data record");
    let index = octree.data.count;
    ensure_data_capacity(octree, index + 1);
    octree.data.count += 1;

    octree.data.owner_nodes[index] = owner;
    write_data(octree, index as u32, voxel);
    index as u32
}

/// Append a copy of an existing record, owned by `owner`
pub fn allocate_data_copy(octree: &mut VoxelOctreeData, owner: u32, source: u32) -> u32 {
    let index = octree.data.count;
    ensure_data_capacity(octree, index + 1);
    octree.data.count += 1;

    let store = &mut octree.data;
    let source = source as usize;
    store.owner_nodes[index] = owner;
    store.voxels[index] = store.voxels[source];
    store.physics[index] = store.physics[source];
    store.render[index] = store.render[source];
    index as u32
}

/// Overwrite a record's voxel and recompute its derived payloads
pub fn write_data(octree: &mut VoxelOctreeData, index: u32, voxel: BlockId) {
    let physics = octree.lookup.physics_payload(voxel);
    let render = octree.lookup.render_payload(voxel);
    let store = &mut octree.data;
    let index = index as usize;
    store.voxels[index] = voxel;
    store.physics[index] = physics;
    store.render[index] = render;
}

/// Free a data record by moving the last record into its slot
///
/// The owning node's `data_index` is invalidated and the moved record's
/// owner is pointed at the new slot.
pub fn delete_data(octree: &mut VoxelOctreeData, index: u32) {
    let count = octree.data.count;
    assert!((index as usize) < count, "delete_data: {} >= {}", index, count);

    let owner = octree.data.owner_nodes[index as usize];
    octree.nodes[owner as usize].data_index = INVALID_INDEX;

    let last = count - 1;
    let store = &mut octree.data;
    let slot = index as usize;
    if slot != last {
        store.owner_nodes[slot] = store.owner_nodes[last];
        store.voxels[slot] = store.voxels[last];
        store.physics[slot] = store.physics[last];
        store.render[slot] = store.render[last];

        let moved_owner = store.owner_nodes[slot];
        octree.nodes[moved_owner as usize].data_index = index;
    }

    let store = &mut octree.data;
    store.owner_nodes[last] = 0;
    store.voxels[last] = BlockId::AIR;
    store.physics[last] = VoxelPhysicsData::default();
    store.render[last] = VoxelRenderData::zeroed();
    store.count -= 1;

    shrink_data_if_sparse(octree);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grown_capacity_doubles() {
        assert_eq!(grown_capacity(32, 33), 64);
        assert_eq!(grown_capacity(32, 32), 32);
        assert_eq!(grown_capacity(0, 1), MIN_CAPACITY);
        assert_eq!(grown_capacity(32, 200), 256);
    }

    #[test]
    fn test_shrunk_capacity_halves_with_floor() {
        assert_eq!(shrunk_capacity(256, 63), 128);
        assert_eq!(shrunk_capacity(256, 64), 256);
        assert_eq!(shrunk_capacity(256, 1), MIN_CAPACITY);
        assert_eq!(shrunk_capacity(MIN_CAPACITY, 0), MIN_CAPACITY);
    }

    #[test]
    fn test_block_move_relocate() {
        let mv = BlockMove { from: 17, to: 1 };
        assert_eq!(mv.relocate(17), 1);
        assert_eq!(mv.relocate(24), 8);
        assert_eq!(mv.relocate(25), 25);
        assert_eq!(mv.relocate(0), 0);
    }
}
