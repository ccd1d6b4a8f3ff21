//! Block Registry Operations - Pure DOP Functions
//!
//! All functions are pure: take data, return results, no side effects.
//! No methods, no self, just transformations.

use super::registry_data::{BlockRegistration, BlockRegistryData};
use super::{BlockId, BlockProperties};
use crate::error::{OptionExt, VoxelError, VoxelResult};

/// First id handed out to game blocks; engine blocks use 1-99
pub const FIRST_GAME_BLOCK_ID: u16 = 100;

/// Create new, empty block registry data
pub fn create_block_registry() -> BlockRegistryData {
    BlockRegistryData {
        next_game_id: FIRST_GAME_BLOCK_ID,
        ..Default::default()
    }
}

/// Register a block under the id carried in its properties
///
/// Panics on AIR or on a duplicate id: both are setup bugs.
pub fn register_block_with_id(
    data: &mut BlockRegistryData,
    name: &str,
    properties: BlockProperties,
) -> BlockId {
    let id = properties.id;
    assert!(!id.is_air(), "AIR cannot be registered as a block");
    assert!(
        !data.blocks.contains_key(&id),
        "Block id {} registered twice ('{}')",
        id.0,
        name
    );

    data.blocks.insert(id, properties);
    data.name_to_id.insert(name.to_string(), id);
    data.registrations.push(BlockRegistration {
        id,
        name: name.to_string(),
    });

    log::debug!("[registry_operations::register] '{}' -> {}", name, id.0);
    id
}

/// Register a game block, assigning the next free game id
pub fn register_block(
    data: &mut BlockRegistryData,
    name: &str,
    mut properties: BlockProperties,
) -> BlockId {
    if let Some(existing) = data.name_to_id.get(name) {
        log::warn!(
            "[registry_operations::register] '{}' already registered as {}",
            name,
            existing.0
        );
        return *existing;
    }

    while data.blocks.contains_key(&BlockId(data.next_game_id)) {
        data.next_game_id += 1;
    }
    properties.id = BlockId(data.next_game_id);
    data.next_game_id += 1;

    register_block_with_id(data, name, properties)
}

/// Get block properties by ID
pub fn get_properties(data: &BlockRegistryData, id: BlockId) -> Option<&BlockProperties> {
    data.blocks.get(&id)
}

/// Get a block ID by name
pub fn get_id(data: &BlockRegistryData, name: &str) -> Option<BlockId> {
    data.name_to_id.get(name).copied()
}

/// Get a block ID by name, failing for unknown names
pub fn require_id(data: &BlockRegistryData, name: &str) -> VoxelResult<BlockId> {
    get_id(data, name).ok_or_voxel(|| VoxelError::ResourceNotFound {
        resource_type: "block".to_string(),
        id: name.to_string(),
    })
}

/// Get all registered blocks
pub fn get_registrations(data: &BlockRegistryData) -> &[BlockRegistration] {
    &data.registrations
}

/// Check if a block ID is registered
pub fn is_registered(data: &BlockRegistryData, id: BlockId) -> bool {
    data.blocks.contains_key(&id)
}
