//! Texture Atlas Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in texture_atlas_operations.rs

use crate::world::core::{AtlasId, TextureId};
use cgmath::Vector2;
use rustc_hash::FxHashMap;

/// Normalized UV rectangle within an atlas layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasUV {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

/// Pixel rectangle inside an atlas image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Resolved atlas location of one texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasEntry {
    pub uv: AtlasUV,
    /// Layer of the texture array the atlas is uploaded into
    pub layer: u32,
}

/// Per-atlas layout
#[derive(Debug, Clone)]
pub struct AtlasLayout {
    pub layer: u32,
    pub atlas_size: u32,
    pub padding: u32,
}

/// Texture atlas lookup table keyed by (atlas id, texture id)
#[derive(Debug, Clone, Default)]
pub struct TextureAtlasLookup {
    pub atlases: FxHashMap<AtlasId, AtlasLayout>,
    pub entries: FxHashMap<(AtlasId, TextureId), AtlasEntry>,
    pub next_layer: u32,
}
