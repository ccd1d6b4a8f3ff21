//! Voxel Octree Operations - Pure DOP Functions
//!
//! Insertion with path splitting, subtree deletion with swap-compaction and
//! upward merging of uniform sibling sets. Node handles are plain indices:
//! anything that may compact the arena hands back the relocated handle, so
//! callers re-read nodes by index instead of holding references across it.

use super::arena_operations::{
    allocate_child_block, allocate_data, allocate_data_copy, create_data_store, delete_data,
    free_child_block, write_data,
};
use super::octree_data::{OctreeNode, OctreeStats, VoxelOctreeData};
use super::octree_validation::debug_validate;
use crate::config::{invalid_config, OctreeConfig};
use crate::constants::octree::{
    CHILD_COUNT, CHILD_OFFSETS, INVALID_INDEX, LOCATION_BITS, LOCATION_MASK, MAX_DEPTH,
    MIN_CAPACITY, ROOT_INDEX,
};
use crate::error::VoxelResult;
use crate::physics::aabb::{create_aabb, AABB};
use crate::world::core::{BlockId, BlockLookup, VoxelPhysicsData, VoxelRenderData};
use bytemuck::Zeroable;
use cgmath::Point3;
use std::sync::Arc;

/// Empty root leaf
pub fn root_node() -> OctreeNode {
    OctreeNode {
        index: ROOT_INDEX,
        parent_index: INVALID_INDEX,
        first_child_index: INVALID_INDEX,
        data_index: INVALID_INDEX,
        location: 0,
        depth: 0,
        parent_child_index: 0,
        _padding: [0; 2],
    }
}

/// Create an empty octree: one root leaf, no data
pub fn create_voxel_octree(
    config: &OctreeConfig,
    lookup: Arc<dyn BlockLookup>,
) -> VoxelResult<VoxelOctreeData> {
    config
        .validate()
        .map_err(|e| invalid_config("octree.cube_size", config.cube_size, e))?;

    let capacity = config.effective_capacity();
    let mut nodes = vec![OctreeNode::zeroed(); capacity];
    nodes[ROOT_INDEX as usize] = root_node();

    log::debug!(
        "[octree_operations::create_voxel_octree] cube {} capacity {}",
        config.cube_size,
        capacity
    );

    Ok(VoxelOctreeData {
        nodes,
        node_count: 1,
        data: create_data_store(capacity),
        cube_size: config.cube_size,
        size_one_depth: config.size_one_depth(),
        version: 0,
        lookup,
    })
}

#[inline]
pub fn is_leaf(node: &OctreeNode) -> bool {
    node.first_child_index == INVALID_INDEX
}

#[inline]
pub fn is_branch(node: &OctreeNode) -> bool {
    node.first_child_index != INVALID_INDEX
}

/// Leaf holding no data record
#[inline]
pub fn is_empty_leaf(node: &OctreeNode) -> bool {
    is_leaf(node) && node.data_index == INVALID_INDEX
}

/// Pack a grid coordinate, 10 bits per axis
pub fn pack_location(x: u32, y: u32, z: u32) -> u32 {
    (x & LOCATION_MASK)
        | ((y & LOCATION_MASK) << LOCATION_BITS)
        | ((z & LOCATION_MASK) << (2 * LOCATION_BITS))
}

pub fn unpack_location(location: u32) -> [u32; 3] {
    [
        location & LOCATION_MASK,
        (location >> LOCATION_BITS) & LOCATION_MASK,
        (location >> (2 * LOCATION_BITS)) & LOCATION_MASK,
    ]
}

/// Location of child `octant` one level below `parent_location`
pub fn child_location(parent_location: u32, octant: u32) -> u32 {
    let [x, y, z] = unpack_location(parent_location);
    let offset = CHILD_OFFSETS[octant as usize];
    pack_location(2 * x + offset[0], 2 * y + offset[1], 2 * z + offset[2])
}

/// Octant of a fine-grid cell `shift` levels below the node being descended
#[inline]
fn octant_of(cell: [u32; 3], shift: u8) -> u32 {
    (((cell[0] >> shift) & 1) << 2) | (((cell[1] >> shift) & 1) << 1) | ((cell[2] >> shift) & 1)
}

/// Edge length of a node at `depth`
#[inline]
pub fn node_size(octree: &VoxelOctreeData, depth: u8) -> f32 {
    octree.cube_size as f32 / (1u32 << depth) as f32
}

/// Local-space box of a node, derived from its packed location
pub fn node_bounds(octree: &VoxelOctreeData, node_index: u32) -> AABB {
    let node = &octree.nodes[node_index as usize];
    let size = node_size(octree, node.depth);
    let [x, y, z] = unpack_location(node.location);
    let min = Point3::new(x as f32 * size, y as f32 * size, z as f32 * size);
    create_aabb(min, Point3::new(min.x + size, min.y + size, min.z + size))
}

/// Local-space box of a leaf
pub fn leaf_bounds(octree: &VoxelOctreeData, node_index: u32) -> AABB {
    debug_assert!(is_leaf(&octree.nodes[node_index as usize]));
    node_bounds(octree, node_index)
}

/// Grid cell containing `position` at `depth`, wrapping into the cube
fn position_to_cell(octree: &VoxelOctreeData, position: Point3<f32>, depth: u8) -> [u32; 3] {
    let cube = octree.cube_size as f32;
    let cells = 1u32 << depth;
    let cell_size = cube / cells as f32;
    let axis = |p: f32| {
        let local = p.rem_euclid(cube);
        ((local / cell_size).floor() as u32).min(cells - 1)
    };
    [axis(position.x), axis(position.y), axis(position.z)]
}

/// Voxel held by a leaf; air when it has no data record
pub fn leaf_voxel(octree: &VoxelOctreeData, node_index: u32) -> BlockId {
    let data_index = octree.nodes[node_index as usize].data_index;
    if data_index == INVALID_INDEX {
        BlockId::AIR
    } else {
        octree.data.voxels[data_index as usize]
    }
}

/// Overwrite a leaf's data; air removes the record
pub fn set_leaf_data(octree: &mut VoxelOctreeData, node_index: u32, voxel: BlockId) {
    let node = octree.nodes[node_index as usize];
    assert!(is_leaf(&node), "set_leaf_data on branch {}", node_index);

    match (node.data_index == INVALID_INDEX, voxel.is_air()) {
        (true, true) => {}
        (false, true) => delete_data(octree, node.data_index),
        (false, false) => write_data(octree, node.data_index, voxel),
        (true, false) => {
            let data_index = allocate_data(octree, node_index, voxel);
            octree.nodes[node_index as usize].data_index = data_index;
        }
    }
}

/// Set the voxel at `position`, splitting down to `depth`
///
/// The position wraps modulo the cube size. Air deletes. Returns whether
/// the tree changed; only changes bump the version.
pub fn insert(
    octree: &mut VoxelOctreeData,
    position: Point3<f32>,
    depth: u8,
    voxel: BlockId,
) -> bool {
    assert!(
        depth <= MAX_DEPTH,
        "insert depth {} exceeds MAX_DEPTH {}",
        depth,
        MAX_DEPTH
    );

    let cell = position_to_cell(octree, position, depth);
    let mut node_index = ROOT_INDEX;

    loop {
        let node = octree.nodes[node_index as usize];
        if node.depth == depth {
            break;
        }
        if is_leaf(&node) {
            // Coarser leaf already holds this voxel
            if leaf_voxel(octree, node_index) == voxel {
                return false;
            }
            split(octree, node_index);
        }
        let octant = octant_of(cell, depth - node.depth - 1);
        node_index = octree.nodes[node_index as usize].first_child_index + octant;
    }

    let mut changed = false;
    if is_branch(&octree.nodes[node_index as usize]) {
        node_index = delete_children(octree, node_index);
        changed = true;
    }
    if !changed && leaf_voxel(octree, node_index) == voxel {
        return false;
    }

    set_leaf_data(octree, node_index, voxel);
    merge_upwards(octree, node_index);
    octree.version += 1;

    debug_validate(octree);
    true
}

/// Turn a leaf into a branch of 8 leaves carrying its current data
pub fn split(octree: &mut VoxelOctreeData, leaf_index: u32) {
    let parent = octree.nodes[leaf_index as usize];
    assert!(is_leaf(&parent), "split on branch {}", leaf_index);
    assert!(
        parent.depth < MAX_DEPTH,
        "split of node {} at MAX_DEPTH",
        leaf_index
    );

    let start = allocate_child_block(octree);
    for octant in 0..CHILD_COUNT {
        let child_index = start + octant;
        let data_index = if parent.data_index == INVALID_INDEX {
            INVALID_INDEX
        } else {
            allocate_data_copy(octree, child_index, parent.data_index)
        };

        octree.nodes[child_index as usize] = OctreeNode {
            index: child_index,
            parent_index: leaf_index,
            first_child_index: INVALID_INDEX,
            data_index,
            location: child_location(parent.location, octant),
            depth: parent.depth + 1,
            parent_child_index: octant as u8,
            _padding: [0; 2],
        };
    }

    if parent.data_index != INVALID_INDEX {
        delete_data(octree, parent.data_index);
    }
    octree.nodes[leaf_index as usize].first_child_index = start;

    log::debug!(
        "[octree_operations::split] node {} depth {} -> children at {}",
        leaf_index,
        parent.depth,
        start
    );
}

/// Child block starts of a subtree, grandchildren before children
fn collect_child_blocks(octree: &VoxelOctreeData, branch_index: u32, blocks: &mut Vec<u32>) {
    let start = octree.nodes[branch_index as usize].first_child_index;
    for octant in 0..CHILD_COUNT {
        let child = start + octant;
        if is_branch(&octree.nodes[child as usize]) {
            collect_child_blocks(octree, child, blocks);
        }
    }
    blocks.push(start);
}

/// Delete a branch's whole subtree, leaving it an empty leaf
///
/// Freed blocks are filled from the tail of the node array, which may
/// move the branch itself. Returns the branch's index afterwards.
pub fn delete_children(octree: &mut VoxelOctreeData, branch_index: u32) -> u32 {
    assert!(
        is_branch(&octree.nodes[branch_index as usize]),
        "delete_children on leaf {}",
        branch_index
    );

    let mut blocks = Vec::new();
    collect_child_blocks(octree, branch_index, &mut blocks);

    for &start in &blocks {
        for node in start..start + CHILD_COUNT {
            let data_index = octree.nodes[node as usize].data_index;
            if data_index != INVALID_INDEX {
                delete_data(octree, data_index);
            }
        }
    }

    let mut branch_index = branch_index;
    for i in 0..blocks.len() {
        if let Some(moved) = free_child_block(octree, blocks[i]) {
            for pending in &mut blocks[i + 1..] {
                *pending = moved.relocate(*pending);
            }
            branch_index = moved.relocate(branch_index);
        }
    }

    log::debug!(
        "[octree_operations::delete_children] freed {} blocks under node {}",
        blocks.len(),
        branch_index
    );
    branch_index
}

/// Collapse uniform sibling sets from `leaf_index` towards the root
///
/// Returns the index of the highest node the leaf's value now lives in.
pub fn merge_upwards(octree: &mut VoxelOctreeData, leaf_index: u32) -> u32 {
    let mut node_index = leaf_index;
    let start_depth = octree.nodes[node_index as usize].depth;

    // One level per iteration; the root is reached after start_depth steps
    for _ in 0..start_depth {
        let node = octree.nodes[node_index as usize];
        let parent_index = node.parent_index;
        if parent_index == INVALID_INDEX {
            break;
        }

        let first = octree.nodes[parent_index as usize].first_child_index;
        let voxel = leaf_voxel(octree, first);
        let uniform = (first..first + CHILD_COUNT).all(|sibling| {
            is_leaf(&octree.nodes[sibling as usize]) && leaf_voxel(octree, sibling) == voxel
        });
        if !uniform {
            break;
        }

        let parent_index = delete_children(octree, parent_index);
        set_leaf_data(octree, parent_index, voxel);

        let parent_depth = octree.nodes[parent_index as usize].depth;
        assert!(
            parent_depth < node.depth,
            "merge_upwards did not ascend: {} -> {}",
            node.depth,
            parent_depth
        );
        log::debug!(
            "[octree_operations::merge_upwards] collapsed {} into node {} at depth {}",
            voxel,
            parent_index,
            parent_depth
        );
        node_index = parent_index;
    }

    node_index
}

/// Voxel and leaf depth at `position`
pub fn get_voxel(octree: &VoxelOctreeData, position: Point3<f32>) -> (BlockId, u8) {
    let cell = position_to_cell(octree, position, MAX_DEPTH);
    let mut node_index = ROOT_INDEX;
    loop {
        let node = &octree.nodes[node_index as usize];
        if is_leaf(node) {
            return (leaf_voxel(octree, node_index), node.depth);
        }
        let octant = octant_of(cell, MAX_DEPTH - node.depth - 1);
        node_index = node.first_child_index + octant;
    }
}

/// Reset to a single empty root leaf
pub fn clear(octree: &mut VoxelOctreeData) {
    octree.nodes = vec![OctreeNode::zeroed(); MIN_CAPACITY];
    octree.nodes[ROOT_INDEX as usize] = root_node();
    octree.node_count = 1;
    octree.data = create_data_store(MIN_CAPACITY);
    octree.version += 1;

    log::debug!("[octree_operations::clear] octree reset");
    debug_validate(octree);
}

/// `(data_index, node_index)` for every occupied leaf
pub fn occupied_leaves(octree: &VoxelOctreeData) -> impl Iterator<Item = (u32, u32)> + '_ {
    octree.data.owner_nodes[..octree.data.count]
        .iter()
        .enumerate()
        .map(|(data_index, &owner)| (data_index as u32, owner))
}

/// Get octree statistics
pub fn get_stats(octree: &VoxelOctreeData) -> OctreeStats {
    let max_live_depth = octree.nodes[..octree.node_count]
        .iter()
        .map(|node| node.depth)
        .max()
        .unwrap_or(0);

    let data_record_size = std::mem::size_of::<u32>()
        + std::mem::size_of::<BlockId>()
        + std::mem::size_of::<VoxelPhysicsData>()
        + std::mem::size_of::<VoxelRenderData>();
    let bytes = octree.nodes.len() * std::mem::size_of::<OctreeNode>()
        + octree.data.voxels.len() * data_record_size;

    OctreeStats {
        node_count: octree.node_count,
        node_capacity: octree.nodes.len(),
        data_count: octree.data.count,
        data_capacity: octree.data.voxels.len(),
        max_live_depth,
        memory_usage_kb: bytes as f32 / 1024.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::blocks::create_default_payload_table;
    use crate::world::octree::octree_validation::validate_octree;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_octree(cube_size: u32) -> VoxelOctreeData {
        init();
        let config = OctreeConfig {
            cube_size,
            ..Default::default()
        };
        create_voxel_octree(&config, Arc::new(create_default_payload_table())).expect("octree")
    }

    fn octant_position(base: [f32; 3], octant: usize, size: f32) -> Point3<f32> {
        let offset = CHILD_OFFSETS[octant];
        Point3::new(
            base[0] + offset[0] as f32 * size + 0.5 * size,
            base[1] + offset[1] as f32 * size + 0.5 * size,
            base[2] + offset[2] as f32 * size + 0.5 * size,
        )
    }

    #[test]
    fn test_new_octree_is_single_empty_root() {
        let octree = test_octree(16);
        assert_eq!(octree.node_count, 1);
        assert_eq!(octree.data.count, 0);
        assert_eq!(octree.size_one_depth, 4);
        assert!(is_empty_leaf(&octree.nodes[0]));
        assert_eq!(get_voxel(&octree, Point3::new(3.0, 3.0, 3.0)), (BlockId::AIR, 0));
        assert!(validate_octree(&octree).is_ok());
    }

    #[test]
    fn test_invalid_cube_size_rejected() {
        init();
        let config = OctreeConfig {
            cube_size: 10,
            ..Default::default()
        };
        let result = create_voxel_octree(&config, Arc::new(create_default_payload_table()));
        assert!(result.is_err());
    }

    #[test]
    fn test_location_packing() {
        let packed = pack_location(3, 1023, 7);
        assert_eq!(unpack_location(packed), [3, 1023, 7]);
        assert_eq!(unpack_location(child_location(pack_location(1, 2, 3), 5)), [3, 4, 7]);
    }

    #[test]
    fn test_single_voxel_then_siblings_collapse() {
        let mut octree = test_octree(16);
        let depth = octree.size_one_depth;

        assert!(insert(&mut octree, Point3::new(1.0, 1.0, 1.0), depth, BlockId::STONE));
        assert_eq!(octree.data.count, 1);
        assert_eq!(octree.node_count, 1 + 8 * 4);
        assert_eq!(get_voxel(&octree, Point3::new(1.5, 1.5, 1.5)), (BlockId::STONE, depth));
        assert_eq!(get_voxel(&octree, Point3::new(0.5, 0.5, 0.5)), (BlockId::AIR, depth));

        for octant in 0..8 {
            let position = octant_position([0.0, 0.0, 0.0], octant, 1.0);
            insert(&mut octree, position, depth, BlockId::STONE);
        }

        assert_eq!(octree.data.count, 1);
        assert_eq!(octree.node_count, 1 + 8 * 3);
        let owner = octree.data.owner_nodes[0];
        let leaf = octree.nodes[owner as usize];
        assert!(is_leaf(&leaf));
        assert_eq!(leaf.depth, depth - 1);
        assert_eq!(get_voxel(&octree, Point3::new(0.2, 1.7, 0.9)), (BlockId::STONE, depth - 1));
        assert!(validate_octree(&octree).is_ok());
    }

    #[test]
    fn test_uniform_children_collapse_in_any_order() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            let mut octree = test_octree(16);
            insert(&mut octree, Point3::new(1.0, 1.0, 1.0), 1, BlockId::STONE);
            assert_eq!(octree.node_count, 9);

            let mut order: Vec<usize> = (0..8).collect();
            order.shuffle(&mut rng);
            for &octant in &order {
                insert(&mut octree, octant_position([0.0; 3], octant, 4.0), 2, BlockId::DIRT);
            }

            assert_eq!(octree.node_count, 9);
            assert_eq!(octree.data.count, 1);
            assert_eq!(get_voxel(&octree, Point3::new(7.0, 7.0, 7.0)), (BlockId::DIRT, 1));

            order.shuffle(&mut rng);
            for &octant in &order {
                insert(&mut octree, octant_position([0.0; 3], octant, 8.0), 1, BlockId::DIRT);
            }
            assert_eq!(octree.node_count, 1);
            assert_eq!(octree.data.count, 1);
            assert_eq!(get_voxel(&octree, Point3::new(15.0, 0.0, 9.0)), (BlockId::DIRT, 0));
            assert!(validate_octree(&octree).is_ok());
        }
    }

    #[test]
    fn test_carving_solid_cube() {
        let mut octree = test_octree(16);
        insert(&mut octree, Point3::new(0.0, 0.0, 0.0), 0, BlockId::STONE);
        assert_eq!((octree.node_count, octree.data.count), (1, 1));

        insert(&mut octree, Point3::new(0.5, 0.5, 0.5), 4, BlockId::AIR);
        assert_eq!(octree.node_count, 33);
        assert_eq!(octree.data.count, 28);
        assert_eq!(octree.nodes.len(), 64);
        assert_eq!(get_voxel(&octree, Point3::new(0.5, 0.5, 0.5)), (BlockId::AIR, 4));
        assert_eq!(get_voxel(&octree, Point3::new(12.0, 3.0, 3.0)), (BlockId::STONE, 1));

        // Filling the hole restores the single solid root
        insert(&mut octree, Point3::new(0.5, 0.5, 0.5), 4, BlockId::STONE);
        assert_eq!((octree.node_count, octree.data.count), (1, 1));
        assert_eq!(octree.nodes.len(), MIN_CAPACITY);
    }

    #[test]
    fn test_coarse_insert_replaces_subtree() {
        let mut octree = test_octree(16);
        for i in 0..6 {
            let p = i as f32 * 2.5 + 0.5;
            insert(&mut octree, Point3::new(p, 15.0 - p, p), 4, BlockId::GRASS);
        }
        assert!(octree.node_count > 1);

        insert(&mut octree, Point3::new(3.0, 3.0, 3.0), 0, BlockId::SAND);
        assert_eq!((octree.node_count, octree.data.count), (1, 1));
        assert_eq!(get_voxel(&octree, Point3::new(8.0, 8.0, 8.0)).0, BlockId::SAND);

        insert(&mut octree, Point3::new(3.0, 3.0, 3.0), 0, BlockId::AIR);
        assert_eq!((octree.node_count, octree.data.count), (1, 0));
    }

    #[test]
    fn test_position_wraps_modulo_cube() {
        let mut octree = test_octree(16);
        insert(&mut octree, Point3::new(17.5, -0.5, 1.5), 4, BlockId::WOOD);
        assert_eq!(get_voxel(&octree, Point3::new(1.5, 15.5, 1.5)), (BlockId::WOOD, 4));
    }

    #[test]
    fn test_version_only_changes_on_mutation() {
        let mut octree = test_octree(16);
        assert!(insert(&mut octree, Point3::new(2.0, 2.0, 2.0), 4, BlockId::STONE));
        let version = octree.version;

        assert!(!insert(&mut octree, Point3::new(2.0, 2.0, 2.0), 4, BlockId::STONE));
        assert!(!insert(&mut octree, Point3::new(9.0, 9.0, 9.0), 4, BlockId::AIR));
        assert_eq!(octree.version, version);

        assert!(insert(&mut octree, Point3::new(2.0, 2.0, 2.0), 4, BlockId::GLASS));
        assert_eq!(octree.version, version + 1);
    }

    #[test]
    fn test_air_never_creates_data() {
        let mut octree = test_octree(16);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let position = Point3::new(
                rng.gen_range(0.0..16.0),
                rng.gen_range(0.0..16.0),
                rng.gen_range(0.0..16.0),
            );
            let depth = rng.gen_range(0..=5);
            let voxel = if rng.gen_bool(0.5) { BlockId::AIR } else { BlockId::STONE };

            let before = octree.data.count;
            insert(&mut octree, position, depth, voxel);
            if voxel.is_air() {
                assert!(octree.data.count <= before);
            }
        }
    }

    #[test]
    fn test_random_inserts_keep_arena_dense() {
        let mut octree = test_octree(16);
        let mut rng = StdRng::seed_from_u64(42);
        let palette = [BlockId::AIR, BlockId::STONE, BlockId::DIRT, BlockId::GRASS];

        for _ in 0..500 {
            let position = Point3::new(
                rng.gen_range(0.0..16.0),
                rng.gen_range(0.0..16.0),
                rng.gen_range(0.0..16.0),
            );
            let depth = rng.gen_range(0..=5);
            let voxel = palette[rng.gen_range(0..palette.len())];
            insert(&mut octree, position, depth, voxel);

            let (found, leaf_depth) = get_voxel(&octree, position);
            assert_eq!(found, voxel);
            assert!(leaf_depth <= depth);
            assert!(validate_octree(&octree).is_ok());
        }

        for (data_index, owner) in occupied_leaves(&octree) {
            assert_eq!(octree.nodes[owner as usize].data_index, data_index);
        }
        let stats = get_stats(&octree);
        assert!(stats.node_capacity.is_power_of_two());
        assert!(stats.node_count <= stats.node_capacity);
    }

    #[test]
    fn test_max_depth_insert() {
        let mut octree = test_octree(16);
        let corner = Point3::new(0.01, 0.01, 0.01);
        insert(&mut octree, corner, MAX_DEPTH, BlockId::GLOWSTONE);
        assert_eq!(get_voxel(&octree, corner), (BlockId::GLOWSTONE, MAX_DEPTH));
        assert_eq!(get_stats(&octree).max_live_depth, MAX_DEPTH);
        let bounds = leaf_bounds(&octree, octree.data.owner_nodes[0]);
        assert!((bounds.max.x - bounds.min.x - 16.0 / 1024.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "exceeds MAX_DEPTH")]
    fn test_insert_below_max_depth_panics() {
        let mut octree = test_octree(16);
        insert(&mut octree, Point3::new(0.0, 0.0, 0.0), MAX_DEPTH + 1, BlockId::STONE);
    }

    #[test]
    fn test_clear_resets_tree() {
        let mut octree = test_octree(16);
        insert(&mut octree, Point3::new(5.0, 5.0, 5.0), 3, BlockId::LEAVES);
        let version = octree.version;
        clear(&mut octree);
        assert_eq!((octree.node_count, octree.data.count), (1, 0));
        assert_eq!(octree.version, version + 1);
        assert!(validate_octree(&octree).is_ok());
    }

    #[test]
    fn test_node_bounds_follow_location() {
        let mut octree = test_octree(16);
        insert(&mut octree, Point3::new(13.0, 2.0, 9.0), 2, BlockId::STONE);
        let owner = octree.data.owner_nodes[0];
        let bounds = leaf_bounds(&octree, owner);
        assert_eq!([bounds.min.x, bounds.min.y, bounds.min.z], [12.0, 0.0, 8.0]);
        assert_eq!([bounds.max.x, bounds.max.y, bounds.max.z], [16.0, 4.0, 12.0]);
    }
}
