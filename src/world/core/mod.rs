//! Core world data types and fundamental structures

mod block;
mod payload;
mod position;
pub mod registry_data;
pub mod registry_operations;

pub use block::{AtlasId, BlockId, BlockProperties, PhysicsProperties, RenderData, TextureId};
pub use payload::{pack_color, BlockLookup, BlockPayloadTable, VoxelPhysicsData, VoxelRenderData};
pub use position::ChunkPos;
pub use registry_data::{BlockRegistration, BlockRegistryData};
