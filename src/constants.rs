//! Engine-wide constants for the voxel octree, collider and BVH.

/// Octree layout constants
pub mod octree {
    /// Deepest level a node may reach. Depth 0 is the whole cube.
    pub const MAX_DEPTH: u8 = 10;

    /// Sentinel for "no node" / "no data record"
    pub const INVALID_INDEX: u32 = u32::MAX;

    /// Slot of the root node. The root never moves.
    pub const ROOT_INDEX: u32 = 0;

    /// Children are always allocated as one contiguous block of this size
    pub const CHILD_COUNT: u32 = 8;

    /// Arrays never shrink below this many slots
    pub const MIN_CAPACITY: usize = 32;

    /// Bits per axis in a packed node location
    pub const LOCATION_BITS: u32 = 10;
    pub const LOCATION_MASK: u32 = (1 << LOCATION_BITS) - 1;

    /// Default edge length of a chunk cube
    pub const DEFAULT_CUBE_SIZE: u32 = 16;

    /// Child octant offsets. Bit 2 = X half, bit 1 = Y half, bit 0 = Z half.
    /// Shared by splitting and by ray traversal.
    pub const CHILD_OFFSETS: [[u32; 3]; 8] = [
        [0, 0, 0],
        [0, 0, 1],
        [0, 1, 0],
        [0, 1, 1],
        [1, 0, 0],
        [1, 0, 1],
        [1, 1, 0],
        [1, 1, 1],
    ];

    static_assertions::const_assert!(3 * LOCATION_BITS <= 32);
    static_assertions::const_assert!((1u32 << MAX_DEPTH) - 1 <= LOCATION_MASK);
}

/// Serialized stream constants
pub mod stream {
    /// "VOXO" little endian
    pub const MAGIC: u32 = 0x4F58_4F56;
    pub const FORMAT_VERSION: u32 = 1;
}

/// BVH construction constants
pub mod bvh {
    /// Bins per axis for the binned SAH split
    pub const SAH_BIN_COUNT: usize = 8;

    /// Midpoint split stops at this many boxes per leaf
    pub const DEFAULT_MAX_LEAF_SIZE: u32 = 2;

    /// Recursion guard; a balanced tree over 2^32 boxes is far shallower
    pub const MAX_BUILD_DEPTH: u32 = 64;
}
