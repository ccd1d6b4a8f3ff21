//! Error handling for the voxel octree crate
//!
//! Only data-integrity and configuration problems are reported through
//! these types. Broken octree invariants are programmer errors and panic.

/// Reasons a serialized octree stream is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeserializeError {
    #[error("Stream too short for header: {available} bytes, need {required}")]
    TruncatedHeader { available: usize, required: usize },

    #[error("Bad stream magic: {found:#010x}")]
    BadMagic { found: u32 },

    #[error("Unsupported stream version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Stream length mismatch: header declares {expected} bytes, {available} available")]
    LengthMismatch { expected: usize, available: usize },

    #[error("Invalid node count {count}: must be 1 + 8k")]
    InvalidNodeCount { count: u32 },

    #[error("Data count {data_count} exceeds node count {node_count}")]
    DataCountOverflow { data_count: u32, node_count: u32 },

    #[error("Cube size {cube_size} in stream does not match octree cube size {expected}")]
    CubeSizeMismatch { cube_size: u32, expected: u32 },

    #[error("Checksum mismatch: header {expected:#010x}, payload {found:#010x}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("Malformed node {index}: {reason}")]
    MalformedNode { index: u32, reason: String },

    #[error("Malformed data record {index}: {reason}")]
    MalformedData { index: u32, reason: String },
}

/// Main error type for the crate
#[derive(Debug, thiserror::Error)]
pub enum VoxelError {
    #[error("Deserialization failed: {0}")]
    Deserialize(#[from] DeserializeError),

    #[error("Unsupported collider orientation {orientation:?}: only identity is supported")]
    UnsupportedOrientation { orientation: [f32; 4] },

    #[error("Invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error for {path}: {error}")]
    Io { path: String, error: String },

    #[error("Worker channel closed: {name}")]
    ChannelClosed { name: String },

    #[error("Resource not found: {resource_type} '{id}'")]
    ResourceNotFound { resource_type: String, id: String },
}

/// Type alias for Results in this crate
pub type VoxelResult<T> = Result<T, VoxelError>;

impl From<std::io::Error> for VoxelError {
    fn from(error: std::io::Error) -> Self {
        VoxelError::Io {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for VoxelError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        VoxelError::ChannelClosed {
            name: "bvh_rebuild".to_string(),
        }
    }
}

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_voxel<F>(self, f: F) -> VoxelResult<T>
    where
        F: FnOnce() -> VoxelError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_voxel<F>(self, f: F) -> VoxelResult<T>
    where
        F: FnOnce() -> VoxelError,
    {
        self.ok_or_else(f)
    }
}
