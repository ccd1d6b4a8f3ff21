//! Block Registry Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in registry_operations.rs

use super::{BlockId, BlockProperties};
use rustc_hash::FxHashMap;

/// Block registration data
#[derive(Debug, Clone)]
pub struct BlockRegistration {
    pub id: BlockId,
    pub name: String,
}

/// Registry data that stores all block types
#[derive(Debug, Clone, Default)]
pub struct BlockRegistryData {
    /// Map from BlockId to properties
    pub blocks: FxHashMap<BlockId, BlockProperties>,
    /// Map from name to BlockId
    pub name_to_id: FxHashMap<String, BlockId>,
    /// All registered blocks, in registration order
    pub registrations: Vec<BlockRegistration>,
    pub next_game_id: u16,
}
