//! Texture Atlas Operations - Pure DOP Functions
//!
//! All functions are pure: take data, return results, no side effects.
//! No methods, no self, just transformations.

use super::texture_atlas_data::{AtlasEntry, AtlasLayout, AtlasUV, PackedRect, TextureAtlasLookup};
use crate::world::core::{AtlasId, TextureId};
use cgmath::Vector2;

/// Zero-size rectangle used when an atlas entry is missing
pub const EMPTY_ATLAS_ENTRY: AtlasEntry = AtlasEntry {
    uv: AtlasUV {
        min: Vector2 { x: 0.0, y: 0.0 },
        max: Vector2 { x: 0.0, y: 0.0 },
    },
    layer: 0,
};

/// Create an empty atlas lookup
pub fn create_texture_atlas_lookup() -> TextureAtlasLookup {
    TextureAtlasLookup::default()
}

/// Register an atlas. Each atlas occupies its own texture-array layer.
pub fn add_atlas(
    data: &mut TextureAtlasLookup,
    atlas_id: AtlasId,
    atlas_size: u32,
    padding: u32,
) -> u32 {
    if let Some(existing) = data.atlases.get(&atlas_id) {
        log::warn!(
            "[texture_atlas_operations::add_atlas] Atlas {} already registered on layer {}",
            atlas_id,
            existing.layer
        );
        return existing.layer;
    }

    let layer = data.next_layer;
    data.next_layer += 1;
    data.atlases.insert(
        atlas_id,
        AtlasLayout {
            layer,
            atlas_size: atlas_size.max(1),
            padding,
        },
    );
    layer
}

/// Register a texture occupying `rect` pixels of an atlas
///
/// Returns false if the atlas is unknown or the rectangle falls outside it.
pub fn add_texture(
    data: &mut TextureAtlasLookup,
    atlas_id: AtlasId,
    texture_id: TextureId,
    rect: PackedRect,
) -> bool {
    let Some(layout) = data.atlases.get(&atlas_id) else {
        log::warn!(
            "[texture_atlas_operations::add_texture] Unknown atlas {} for texture {}",
            atlas_id,
            texture_id
        );
        return false;
    };

    let inner_w = rect.width.saturating_sub(layout.padding * 2);
    let inner_h = rect.height.saturating_sub(layout.padding * 2);
    if rect.x + rect.width > layout.atlas_size || rect.y + rect.height > layout.atlas_size {
        log::warn!(
            "[texture_atlas_operations::add_texture] Rect {:?} exceeds atlas {} size {}",
            rect,
            atlas_id,
            layout.atlas_size
        );
        return false;
    }

    // UVs exclude the padding border to prevent bleeding
    let size = layout.atlas_size as f32;
    let uv = AtlasUV {
        min: Vector2::new(
            (rect.x + layout.padding) as f32 / size,
            (rect.y + layout.padding) as f32 / size,
        ),
        max: Vector2::new(
            (rect.x + layout.padding + inner_w) as f32 / size,
            (rect.y + layout.padding + inner_h) as f32 / size,
        ),
    };

    data.entries.insert(
        (atlas_id, texture_id),
        AtlasEntry {
            uv,
            layer: layout.layer,
        },
    );
    true
}

/// Register a regular grid of tiles, row-major, starting at texture id 0
pub fn add_tile_grid(
    data: &mut TextureAtlasLookup,
    atlas_id: AtlasId,
    tiles_x: u32,
    tiles_y: u32,
) -> Vec<TextureId> {
    let Some(layout) = data.atlases.get(&atlas_id) else {
        return Vec::new();
    };
    let tile_w = layout.atlas_size / tiles_x.max(1);
    let tile_h = layout.atlas_size / tiles_y.max(1);

    let mut texture_ids = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let texture_id = ty * tiles_x + tx;
            let rect = PackedRect {
                x: tx * tile_w,
                y: ty * tile_h,
                width: tile_w,
                height: tile_h,
            };
            if add_texture(data, atlas_id, texture_id, rect) {
                texture_ids.push(texture_id);
            }
        }
    }
    texture_ids
}

/// Look up a texture, if registered
pub fn lookup(
    data: &TextureAtlasLookup,
    atlas_id: AtlasId,
    texture_id: TextureId,
) -> Option<AtlasEntry> {
    data.entries.get(&(atlas_id, texture_id)).copied()
}

/// Look up a texture, degrading to a zero-size rectangle when missing
pub fn lookup_or_empty(
    data: &TextureAtlasLookup,
    atlas_id: AtlasId,
    texture_id: TextureId,
) -> AtlasEntry {
    match lookup(data, atlas_id, texture_id) {
        Some(entry) => entry,
        None => {
            log::warn!(
                "[texture_atlas_operations::lookup] Missing atlas entry ({}, {}), using empty rect",
                atlas_id,
                texture_id
            );
            EMPTY_ATLAS_ENTRY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_grid_uvs() {
        let mut atlas = create_texture_atlas_lookup();
        let layer = add_atlas(&mut atlas, 7, 256, 0);
        assert_eq!(layer, 0);

        let ids = add_tile_grid(&mut atlas, 7, 4, 4);
        assert_eq!(ids.len(), 16);

        let entry = lookup(&atlas, 7, 5).expect("tile 5 registered");
        assert_eq!(entry.uv.min, Vector2::new(0.25, 0.25));
        assert_eq!(entry.uv.max, Vector2::new(0.5, 0.5));
    }

    #[test]
    fn test_padding_shrinks_uv() {
        let mut atlas = create_texture_atlas_lookup();
        add_atlas(&mut atlas, 1, 100, 2);
        assert!(add_texture(
            &mut atlas,
            1,
            3,
            PackedRect {
                x: 0,
                y: 0,
                width: 20,
                height: 20
            }
        ));
        let entry = lookup(&atlas, 1, 3).expect("registered");
        assert!((entry.uv.min.x - 0.02).abs() < 1e-6);
        assert!((entry.uv.max.x - 0.18).abs() < 1e-6);
    }

    #[test]
    fn test_missing_entry_degrades() {
        let atlas = create_texture_atlas_lookup();
        let entry = lookup_or_empty(&atlas, 9, 9);
        assert_eq!(entry, EMPTY_ATLAS_ENTRY);
    }

    #[test]
    fn test_second_atlas_gets_new_layer() {
        let mut atlas = create_texture_atlas_lookup();
        assert_eq!(add_atlas(&mut atlas, 1, 64, 0), 0);
        assert_eq!(add_atlas(&mut atlas, 2, 64, 0), 1);
        assert_eq!(add_atlas(&mut atlas, 1, 64, 0), 0);
    }
}
