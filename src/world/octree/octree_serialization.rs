//! Octree stream and render buffer packing
//!
//! Both layouts carry the live node array followed by the live render
//! payloads, written by one routine. The stream additionally appends the
//! voxel ids so a received tree stays editable, and is protected by a
//! CRC32 over everything after the header.

use super::arena_operations::{create_data_store, grown_capacity};
use super::octree_data::{OctreeNode, VoxelOctreeData};
use super::octree_validation::check_octree;
use crate::constants::octree::{CHILD_COUNT, INVALID_INDEX, MIN_CAPACITY};
use crate::constants::stream::{FORMAT_VERSION, MAGIC};
use crate::error::{DeserializeError, VoxelError, VoxelResult};
use crate::world::core::{BlockId, VoxelRenderData};
use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix, Matrix4, Point3, SquareMatrix};

/// Header of a serialized octree stream
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct StreamHeader {
    pub magic: u32,
    pub version: u32,
    pub node_count: u32,
    pub data_count: u32,
    pub cube_size: u32,
    /// CRC32 of every byte after the header
    pub checksum: u32,
    /// World-space min corner of the chunk
    pub min_corner: [f32; 3],
    pub _padding: u32,
}

/// Header of the GPU render buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderBufferHeader {
    pub node_count: u32,
    pub data_count: u32,
    pub cube_size: u32,
    pub _padding: u32,
    pub transform: [[f32; 4]; 4],
    pub inverse_transform: [[f32; 4]; 4],
    /// Inverse-transpose of the upper 3x3, one padded column per row
    pub normal_matrix: [[f32; 4]; 3],
}

pub const STREAM_HEADER_SIZE: usize = std::mem::size_of::<StreamHeader>();
pub const RENDER_HEADER_SIZE: usize = std::mem::size_of::<RenderBufferHeader>();

const NODE_SIZE: usize = std::mem::size_of::<OctreeNode>();
const RENDER_SIZE: usize = std::mem::size_of::<VoxelRenderData>();
const VOXEL_SIZE: usize = std::mem::size_of::<BlockId>();

static_assertions::assert_eq_size!(StreamHeader, [u8; 40]);
static_assertions::assert_eq_size!(RenderBufferHeader, [u8; 192]);

/// Append the live node array and live render payloads
fn write_live_arrays(octree: &VoxelOctreeData, out: &mut Vec<u8>) {
    out.extend_from_slice(bytemuck::cast_slice(&octree.nodes[..octree.node_count]));
    out.extend_from_slice(bytemuck::cast_slice(&octree.data.render[..octree.data.count]));
}

/// Serialize the live tree for the wire or disk
pub fn serialize_octree(octree: &VoxelOctreeData, min_corner: Point3<f32>) -> Vec<u8> {
    let node_count = octree.node_count;
    let data_count = octree.data.count;

    let mut payload =
        Vec::with_capacity(node_count * NODE_SIZE + data_count * (RENDER_SIZE + VOXEL_SIZE));
    write_live_arrays(octree, &mut payload);
    payload.extend_from_slice(bytemuck::cast_slice(&octree.data.voxels[..data_count]));

    let header = StreamHeader {
        magic: MAGIC,
        version: FORMAT_VERSION,
        node_count: node_count as u32,
        data_count: data_count as u32,
        cube_size: octree.cube_size,
        checksum: crc32fast::hash(&payload),
        min_corner: [min_corner.x, min_corner.y, min_corner.z],
        _padding: 0,
    };

    let mut bytes = Vec::with_capacity(STREAM_HEADER_SIZE + payload.len());
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    bytes.extend_from_slice(&payload);
    bytes
}

/// Pack the render buffer: transform header, nodes, render payloads
pub fn build_render_buffer(octree: &VoxelOctreeData, transform: Matrix4<f32>) -> Vec<u8> {
    let inverse = transform.invert().unwrap_or_else(|| {
        log::warn!(
            "[octree_serialization::build_render_buffer] Singular transform, using identity inverse"
        );
        Matrix4::identity()
    });
    let normal = inverse.transpose();

    let header = RenderBufferHeader {
        node_count: octree.node_count as u32,
        data_count: octree.data.count as u32,
        cube_size: octree.cube_size,
        _padding: 0,
        transform: transform.into(),
        inverse_transform: inverse.into(),
        normal_matrix: [
            [normal.x.x, normal.x.y, normal.x.z, 0.0],
            [normal.y.x, normal.y.y, normal.y.z, 0.0],
            [normal.z.x, normal.z.y, normal.z.z, 0.0],
        ],
    };

    let mut bytes = Vec::with_capacity(
        RENDER_HEADER_SIZE + octree.node_count * NODE_SIZE + octree.data.count * RENDER_SIZE,
    );
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    write_live_arrays(octree, &mut bytes);
    bytes
}

fn reject(error: DeserializeError) -> VoxelError {
    log::error!("[octree_serialization::deserialize_octree] Rejected stream: {}", error);
    VoxelError::Deserialize(error)
}

fn decode_header(bytes: &[u8], cube_size: u32) -> Result<StreamHeader, DeserializeError> {
    if bytes.len() < STREAM_HEADER_SIZE {
        return Err(DeserializeError::TruncatedHeader {
            available: bytes.len(),
            required: STREAM_HEADER_SIZE,
        });
    }

    let header: StreamHeader = bytemuck::pod_read_unaligned(&bytes[..STREAM_HEADER_SIZE]);
    if header.magic != MAGIC {
        return Err(DeserializeError::BadMagic { found: header.magic });
    }
    if header.version != FORMAT_VERSION {
        return Err(DeserializeError::VersionMismatch {
            expected: FORMAT_VERSION,
            found: header.version,
        });
    }
    if header.node_count == 0 || (header.node_count - 1) % CHILD_COUNT != 0 {
        return Err(DeserializeError::InvalidNodeCount {
            count: header.node_count,
        });
    }
    if header.data_count > header.node_count {
        return Err(DeserializeError::DataCountOverflow {
            data_count: header.data_count,
            node_count: header.node_count,
        });
    }
    if header.cube_size != cube_size {
        return Err(DeserializeError::CubeSizeMismatch {
            cube_size: header.cube_size,
            expected: cube_size,
        });
    }

    let expected = STREAM_HEADER_SIZE
        + header.node_count as usize * NODE_SIZE
        + header.data_count as usize * (RENDER_SIZE + VOXEL_SIZE);
    if bytes.len() != expected {
        return Err(DeserializeError::LengthMismatch {
            expected,
            available: bytes.len(),
        });
    }

    let found = crc32fast::hash(&bytes[STREAM_HEADER_SIZE..]);
    if found != header.checksum {
        return Err(DeserializeError::ChecksumMismatch {
            expected: header.checksum,
            found,
        });
    }

    Ok(header)
}

/// Replace the tree with one read from `bytes`
///
/// The stream is fully decoded and checked before anything is installed;
/// on error the octree is left exactly as it was. Returns the chunk's
/// world-space min corner from the header.
pub fn deserialize_octree(octree: &mut VoxelOctreeData, bytes: &[u8]) -> VoxelResult<Point3<f32>> {
    let header = decode_header(bytes, octree.cube_size).map_err(reject)?;
    let node_count = header.node_count as usize;
    let data_count = header.data_count as usize;

    let node_bytes_end = STREAM_HEADER_SIZE + node_count * NODE_SIZE;
    let render_bytes_end = node_bytes_end + data_count * RENDER_SIZE;

    let mut nodes = vec![OctreeNode::zeroed(); grown_capacity(MIN_CAPACITY, node_count)];
    for (slot, chunk) in nodes
        .iter_mut()
        .zip(bytes[STREAM_HEADER_SIZE..node_bytes_end].chunks_exact(NODE_SIZE))
    {
        *slot = bytemuck::pod_read_unaligned(chunk);
    }

    let mut data = create_data_store(grown_capacity(MIN_CAPACITY, data_count));
    data.count = data_count;
    for (slot, chunk) in data
        .render
        .iter_mut()
        .zip(bytes[node_bytes_end..render_bytes_end].chunks_exact(RENDER_SIZE))
    {
        *slot = bytemuck::pod_read_unaligned(chunk);
    }
    for (slot, chunk) in data
        .voxels
        .iter_mut()
        .zip(bytes[render_bytes_end..].chunks_exact(VOXEL_SIZE))
    {
        *slot = bytemuck::pod_read_unaligned(chunk);
    }

    // Owners are implied by the nodes; each record must be claimed once
    let mut owners = vec![INVALID_INDEX; data_count];
    for (slot, node) in nodes[..node_count].iter().enumerate() {
        if node.data_index == INVALID_INDEX || node.first_child_index != INVALID_INDEX {
            continue;
        }
        let data_index = node.data_index as usize;
        if data_index >= data_count {
            return Err(reject(DeserializeError::MalformedNode {
                index: slot as u32,
                reason: format!("data index {} out of range", data_index),
            }));
        }
        if owners[data_index] != INVALID_INDEX {
            return Err(reject(DeserializeError::MalformedData {
                index: data_index as u32,
                reason: format!("claimed by nodes {} and {}", owners[data_index], slot),
            }));
        }
        owners[data_index] = slot as u32;
    }
    if let Some(orphan) = owners.iter().position(|&owner| owner == INVALID_INDEX) {
        return Err(reject(DeserializeError::MalformedData {
            index: orphan as u32,
            reason: "no owning node".to_string(),
        }));
    }
    data.owner_nodes[..data_count].copy_from_slice(&owners);

    for data_index in 0..data_count {
        data.physics[data_index] = octree.lookup.physics_payload(data.voxels[data_index]);
    }

    check_octree(&nodes, node_count, &data)
        .map_err(|violation| reject(violation.into()))?;

    octree.nodes = nodes;
    octree.node_count = node_count;
    octree.data = data;
    octree.version += 1;

    log::info!(
        "[octree_serialization::deserialize_octree] Installed {} nodes, {} data records",
        node_count,
        data_count
    );
    Ok(Point3::new(
        header.min_corner[0],
        header.min_corner[1],
        header.min_corner[2],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OctreeConfig;
    use crate::world::blocks::create_default_payload_table;
    use crate::world::octree::octree_operations::{create_voxel_octree, get_voxel, insert};
    use crate::world::octree::octree_validation::validate_octree;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn empty_octree(cube_size: u32) -> VoxelOctreeData {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = OctreeConfig {
            cube_size,
            ..Default::default()
        };
        create_voxel_octree(&config, Arc::new(create_default_payload_table())).expect("octree")
    }

    fn random_octree(seed: u64) -> VoxelOctreeData {
        let mut octree = empty_octree(16);
        let mut rng = StdRng::seed_from_u64(seed);
        let palette = [BlockId::AIR, BlockId::STONE, BlockId::DIRT, BlockId::WATER];
        for _ in 0..150 {
            let position = Point3::new(
                rng.gen_range(0.0..16.0),
                rng.gen_range(0.0..16.0),
                rng.gen_range(0.0..16.0),
            );
            let voxel = palette[rng.gen_range(0..palette.len())];
            insert(&mut octree, position, rng.gen_range(1..=4), voxel);
        }
        octree
    }

    /// Rewrite a header field and refresh the checksum
    fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        let checksum = crc32fast::hash(&bytes[STREAM_HEADER_SIZE..]);
        bytes[20..24].copy_from_slice(&checksum.to_le_bytes());
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        for seed in 0..4 {
            let source = random_octree(seed);
            let corner = Point3::new(32.0, -16.0, 0.0);
            let bytes = serialize_octree(&source, corner);

            let mut target = empty_octree(16);
            let min_corner = deserialize_octree(&mut target, &bytes).expect("valid stream");
            assert_eq!(min_corner, corner);
            assert_eq!(serialize_octree(&target, corner), bytes);
            assert!(validate_octree(&target).is_ok());

            for i in 0..32 {
                let p = Point3::new(i as f32 * 0.5, 15.9 - i as f32 * 0.45, (i * 7 % 16) as f32);
                assert_eq!(get_voxel(&source, p), get_voxel(&target, p));
            }
        }
    }

    #[test]
    fn test_deserialized_tree_stays_editable() {
        let source = random_octree(99);
        let bytes = serialize_octree(&source, Point3::new(0.0, 0.0, 0.0));
        let mut target = empty_octree(16);
        deserialize_octree(&mut target, &bytes).expect("valid stream");

        insert(&mut target, Point3::new(0.0, 0.0, 0.0), 0, BlockId::STONE);
        assert_eq!((target.node_count, target.data.count), (1, 1));
        assert!(target.data.physics[0].solid);
    }

    #[test]
    fn test_empty_tree_layout() {
        let octree = empty_octree(16);
        let bytes = serialize_octree(&octree, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bytes.len(), STREAM_HEADER_SIZE + NODE_SIZE);
        let header: StreamHeader = bytemuck::pod_read_unaligned(&bytes[..STREAM_HEADER_SIZE]);
        assert_eq!((header.node_count, header.data_count), (1, 0));
        assert_eq!(header.magic, MAGIC);
    }

    #[test]
    fn test_render_buffer_shares_payload_layout() {
        let octree = random_octree(5);
        let stream = serialize_octree(&octree, Point3::new(0.0, 0.0, 0.0));
        let transform = Matrix4::from_translation(cgmath::Vector3::new(16.0, 0.0, -32.0));
        let render = build_render_buffer(&octree, transform);

        let shared = octree.node_count * NODE_SIZE + octree.data.count * RENDER_SIZE;
        assert_eq!(render.len(), RENDER_HEADER_SIZE + shared);
        assert_eq!(
            &render[RENDER_HEADER_SIZE..],
            &stream[STREAM_HEADER_SIZE..STREAM_HEADER_SIZE + shared]
        );

        let header: RenderBufferHeader =
            bytemuck::pod_read_unaligned(&render[..RENDER_HEADER_SIZE]);
        assert_eq!(header.inverse_transform[3], [-16.0, 0.0, 32.0, 1.0]);
        assert_eq!(header.normal_matrix[0], [1.0, 0.0, 0.0, 0.0]);
    }

    fn assert_rejected(bytes: &[u8], check: impl Fn(&DeserializeError) -> bool) {
        let mut target = random_octree(3);
        let before = serialize_octree(&target, Point3::new(0.0, 0.0, 0.0));
        let version = target.version;

        match deserialize_octree(&mut target, bytes) {
            Err(VoxelError::Deserialize(error)) => assert!(check(&error), "unexpected {:?}", error),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(target.version, version);
        assert_eq!(serialize_octree(&target, Point3::new(0.0, 0.0, 0.0)), before);
    }

    #[test]
    fn test_rejects_truncated_and_corrupt_headers() {
        let bytes = serialize_octree(&random_octree(1), Point3::new(0.0, 0.0, 0.0));

        assert_rejected(&bytes[..10], |e| matches!(e, DeserializeError::TruncatedHeader { .. }));
        assert_rejected(&bytes[..bytes.len() - 1], |e| {
            matches!(e, DeserializeError::LengthMismatch { .. })
        });

        let mut bad = bytes.clone();
        bad[0] ^= 0xFF;
        assert_rejected(&bad, |e| matches!(e, DeserializeError::BadMagic { .. }));

        let mut bad = bytes.clone();
        patch_u32(&mut bad, 4, FORMAT_VERSION + 1);
        assert_rejected(&bad, |e| matches!(e, DeserializeError::VersionMismatch { .. }));

        let mut bad = bytes.clone();
        patch_u32(&mut bad, 8, 4);
        assert_rejected(&bad, |e| matches!(e, DeserializeError::InvalidNodeCount { count: 4 }));

        let mut bad = bytes.clone();
        patch_u32(&mut bad, 12, 10_000);
        assert_rejected(&bad, |e| matches!(e, DeserializeError::DataCountOverflow { .. }));

        let mut bad = bytes.clone();
        let last = bad.len() - 1;
        bad[last] ^= 0x01;
        assert_rejected(&bad, |e| matches!(e, DeserializeError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_rejects_cube_size_mismatch() {
        let bytes = serialize_octree(&empty_octree(32), Point3::new(0.0, 0.0, 0.0));
        assert_rejected(&bytes, |e| {
            matches!(e, DeserializeError::CubeSizeMismatch { cube_size: 32, expected: 16 })
        });
    }

    #[test]
    fn test_rejects_inconsistent_nodes() {
        let source = random_octree(8);
        assert!(source.node_count > 1 && source.data.count > 0);
        let bytes = serialize_octree(&source, Point3::new(0.0, 0.0, 0.0));

        // Node 1 claims to live in slot 2
        let mut bad = bytes.clone();
        patch_u32(&mut bad, STREAM_HEADER_SIZE + NODE_SIZE, 2);
        assert_rejected(&bad, |e| matches!(e, DeserializeError::MalformedNode { index: 1, .. }));

        // Root child block aligned but far past the end of the arena
        let mut bad = bytes.clone();
        patch_u32(&mut bad, STREAM_HEADER_SIZE + 8, u32::MAX - 6);
        assert_rejected(&bad, |e| matches!(e, DeserializeError::MalformedNode { index: 0, .. }));

        // Air smuggled in as a data record
        let mut bad = bytes.clone();
        let voxels_start = bad.len() - source.data.count * VOXEL_SIZE;
        bad[voxels_start..voxels_start + 2].copy_from_slice(&0u16.to_le_bytes());
        let checksum = crc32fast::hash(&bad[STREAM_HEADER_SIZE..]);
        bad[20..24].copy_from_slice(&checksum.to_le_bytes());
        assert_rejected(&bad, |e| matches!(e, DeserializeError::MalformedData { index: 0, .. }));
    }
}
