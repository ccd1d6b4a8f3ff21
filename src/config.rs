//! Octree and BVH configuration
//!
//! Loaded from TOML; every section falls back to its defaults when omitted.

use crate::constants::{bvh, octree};
use crate::error::{VoxelError, VoxelResult};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-chunk octree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Edge length of the octree cube in world units; power of two
    pub cube_size: u32,
    /// Initial node/data array capacity, rounded up to a power of two
    pub initial_capacity: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            cube_size: octree::DEFAULT_CUBE_SIZE,
            initial_capacity: octree::MIN_CAPACITY,
        }
    }
}

impl OctreeConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.cube_size == 0 || !self.cube_size.is_power_of_two() {
            return Err(anyhow!(
                "OctreeConfig: cube_size {} must be a non-zero power of two",
                self.cube_size
            ));
        }

        if self.size_one_depth() > octree::MAX_DEPTH {
            return Err(anyhow!(
                "OctreeConfig: cube_size {} needs depth {} to reach unit voxels (max {})",
                self.cube_size,
                self.size_one_depth(),
                octree::MAX_DEPTH
            ));
        }

        Ok(())
    }

    /// Depth at which a node is exactly one world unit wide
    pub fn size_one_depth(&self) -> u8 {
        self.cube_size.max(1).trailing_zeros() as u8
    }

    /// Capacity actually allocated for the node and data arrays
    pub fn effective_capacity(&self) -> usize {
        self.initial_capacity
            .max(octree::MIN_CAPACITY)
            .next_power_of_two()
    }
}

/// BVH split strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Split the longest axis at its midpoint
    Midpoint,
    /// Binned surface area heuristic
    BinnedSah,
}

/// Master BVH construction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    pub strategy: SplitStrategy,
    /// Midpoint splitting stops at this many boxes per leaf
    pub max_leaf_size: u32,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::BinnedSah,
            max_leaf_size: bvh::DEFAULT_MAX_LEAF_SIZE,
        }
    }
}

impl BvhConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_leaf_size == 0 {
            return Err(anyhow!("BvhConfig: max_leaf_size cannot be 0"));
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelEngineConfig {
    pub octree: OctreeConfig,
    pub bvh: BvhConfig,
}

impl VoxelEngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.octree.validate()?;
        self.bvh.validate()?;
        log::debug!("[VoxelEngineConfig] Configuration validated successfully");
        Ok(())
    }
}

/// Map a validation failure onto the crate error
pub(crate) fn invalid_config(
    field: &str,
    value: impl ToString,
    error: anyhow::Error,
) -> VoxelError {
    VoxelError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
        reason: error.to_string(),
    }
}

/// Parse and validate a TOML configuration string
pub fn load_config_from_str(source: &str) -> VoxelResult<VoxelEngineConfig> {
    let config: VoxelEngineConfig = toml::from_str(source)?;
    config
        .validate()
        .map_err(|e| invalid_config("config", "<toml>", e))?;
    Ok(config)
}

/// Load and validate a TOML configuration file
pub fn load_config_from_file(path: impl AsRef<Path>) -> VoxelResult<VoxelEngineConfig> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| VoxelError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    log::info!("[config::load] Loading voxel config from {}", path.display());
    load_config_from_str(&source)
}
