//! The layered tile store: ordered, equal-sized layers

use crate::{Layer, ShapeError, Tile};
use serde::{Deserialize, Serialize};

/// An ordered stack of equally sized layers.
///
/// Index 0 is painted first. There is always at least one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLayerStore")]
pub struct LayerStore {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
}

#[derive(Deserialize)]
struct RawLayerStore {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
}

impl TryFrom<RawLayerStore> for LayerStore {
    type Error = ShapeError;

    fn try_from(raw: RawLayerStore) -> Result<Self, Self::Error> {
        check_layers(raw.width, raw.height, &raw.layers)?;
        Ok(Self {
            width: raw.width,
            height: raw.height,
            layers: raw.layers,
        })
    }
}

/// Check that `layers` is non-empty and every grid is `width` x `height`
pub fn check_layers(width: u32, height: u32, layers: &[Layer]) -> Result<(), ShapeError> {
    if layers.is_empty() {
        return Err(ShapeError::NoLayers);
    }
    for (index, layer) in layers.iter().enumerate() {
        let (w, h) = (layer.grid.width(), layer.grid.height());
        if w != width || h != height {
            return Err(ShapeError::LayerSize {
                index,
                width: w,
                height: h,
            });
        }
    }
    Ok(())
}

impl LayerStore {
    /// Create a store with a single empty layer
    pub fn new(width: u32, height: u32) -> Self {
        let mut store = Self {
            width,
            height,
            layers: Vec::new(),
        };
        store.create_layer();
        store
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of layers (never zero)
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in paint order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Get layer by index
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Get mutable layer by index
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Whether `(x, y)` is a cell of the map
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Append an empty layer on top and return its index
    pub fn create_layer(&mut self) -> usize {
        let name = format!("Layer {}", self.layers.len());
        self.layers.push(Layer::new(name, self.width, self.height));
        self.layers.len() - 1
    }

    /// Remove a layer by index.
    ///
    /// Refused when `index` is out of range or it is the last layer.
    pub fn delete_layer(&mut self, index: usize) -> Option<Layer> {
        if self.layers.len() < 2 || index >= self.layers.len() {
            return None;
        }
        Some(self.layers.remove(index))
    }

    /// Exchange two layers. Returns false when either index is invalid.
    pub fn swap_layers(&mut self, a: usize, b: usize) -> bool {
        if a >= self.layers.len() || b >= self.layers.len() {
            return false;
        }
        self.layers.swap(a, b);
        true
    }

    /// Move a layer one step toward the top of the paint order
    pub fn move_layer_up(&mut self, index: usize) -> bool {
        index
            .checked_add(1)
            .is_some_and(|above| self.swap_layers(index, above))
    }

    /// Move a layer one step toward the bottom of the paint order
    pub fn move_layer_down(&mut self, index: usize) -> bool {
        index > 0 && self.swap_layers(index, index - 1)
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> bool {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.name = name.into();
            true
        } else {
            false
        }
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> bool {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.visible = visible;
            true
        } else {
            false
        }
    }

    /// Toggle layer visibility
    pub fn toggle_layer_visibility(&mut self, index: usize) -> bool {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.visible = !layer.visible;
            true
        } else {
            false
        }
    }

    pub fn is_layer_visible(&self, index: usize) -> bool {
        self.layers.get(index).is_some_and(|l| l.visible)
    }

    /// Get tile at position for a specific layer
    pub fn tile(&self, layer_index: usize, x: i32, y: i32) -> Option<Tile> {
        self.layers
            .get(layer_index)
            .and_then(|layer| layer.grid.get(x, y))
    }

    /// Set tile at position for a specific layer.
    ///
    /// Returns false and leaves the store untouched when out of bounds.
    pub fn set_tile(&mut self, layer_index: usize, x: i32, y: i32, tile: Tile) -> bool {
        self.layers
            .get_mut(layer_index)
            .is_some_and(|layer| layer.grid.set(x, y, tile))
    }

    /// Empty every tile, in every layer, that references `texture_id`
    pub fn clear_tiles_referencing_texture(&mut self, texture_id: i32) -> usize {
        self.layers
            .iter_mut()
            .map(|layer| layer.grid.clear_where(|t| t.texture_id == texture_id))
            .sum()
    }

    /// Empty tiles of `texture_id` whose texture coordinate exceeds the bounds.
    ///
    /// Used when a texture is replaced by a smaller one.
    pub fn clear_out_of_bounds_tiles(&mut self, texture_id: i32, max_x: i32, max_y: i32) -> usize {
        self.layers
            .iter_mut()
            .map(|layer| {
                layer.grid.clear_where(|t| {
                    t.texture_id == texture_id
                        && (t.id_on_texture.x > max_x || t.id_on_texture.y > max_y)
                })
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileId;

    fn tile(texture_id: i32, x: i32, y: i32) -> Tile {
        Tile::new(texture_id, TileId::new(x, y))
    }

    #[test]
    fn test_new_store_has_one_layer() {
        let store = LayerStore::new(10, 8);
        assert_eq!(store.len(), 1);
        assert_eq!(store.layer(0).map(|l| l.name.as_str()), Some("Layer 0"));
        assert_eq!(store.width(), 10);
        assert_eq!(store.height(), 8);
    }

    #[test]
    fn test_tile_operations() {
        let mut store = LayerStore::new(10, 10);

        // Initially empty
        assert_eq!(store.tile(0, 5, 5), Some(Tile::EMPTY));

        // Set a tile
        assert!(store.set_tile(0, 5, 5, tile(0, 1, 2)));
        assert_eq!(store.tile(0, 5, 5), Some(tile(0, 1, 2)));

        // Clear a tile
        assert!(store.set_tile(0, 5, 5, Tile::EMPTY));
        assert_eq!(store.tile(0, 5, 5), Some(Tile::EMPTY));
    }

    #[test]
    fn test_set_tile_out_of_bounds_is_rejected() {
        let mut store = LayerStore::new(4, 4);
        let before = store.clone();

        assert!(!store.set_tile(0, -1, 0, tile(0, 0, 0)));
        assert!(!store.set_tile(0, 4, 0, tile(0, 0, 0)));
        assert!(!store.set_tile(0, 0, 4, tile(0, 0, 0)));
        assert!(!store.set_tile(1, 0, 0, tile(0, 0, 0)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_create_layer_appends_on_top() {
        let mut store = LayerStore::new(3, 3);
        let index = store.create_layer();
        assert_eq!(index, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.layer(1).map(|l| l.name.as_str()), Some("Layer 1"));
    }

    #[test]
    fn test_cannot_delete_last_layer() {
        let mut store = LayerStore::new(3, 3);
        assert!(store.delete_layer(0).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_shifts_indices() {
        let mut store = LayerStore::new(3, 3);
        store.create_layer();
        store.create_layer();
        store.set_tile(2, 0, 0, tile(7, 0, 0));

        let removed = store.delete_layer(1);
        assert_eq!(removed.map(|l| l.name), Some("Layer 1".to_string()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.tile(1, 0, 0), Some(tile(7, 0, 0)));
        assert!(store.delete_layer(5).is_none());
    }

    #[test]
    fn test_swap_is_involution() {
        let mut store = LayerStore::new(3, 3);
        store.create_layer();
        store.create_layer();
        store.set_tile(0, 1, 1, tile(1, 0, 0));
        store.set_tile(2, 2, 2, tile(2, 0, 0));
        let original = store.clone();

        for (a, b) in [(0, 1), (0, 2), (1, 2), (2, 0)] {
            assert!(store.swap_layers(a, b));
            assert_ne!(store, original);
            assert!(store.swap_layers(a, b));
            assert_eq!(store, original);
        }
    }

    #[test]
    fn test_swap_invalid_indices() {
        let mut store = LayerStore::new(3, 3);
        let original = store.clone();
        assert!(!store.swap_layers(0, 1));
        assert_eq!(store, original);
    }

    #[test]
    fn test_move_layer_up_down() {
        let mut store = LayerStore::new(2, 2);
        store.create_layer();
        assert!(store.move_layer_up(0));
        assert_eq!(store.layer(1).map(|l| l.name.as_str()), Some("Layer 0"));
        assert!(!store.move_layer_up(1));
        assert!(store.move_layer_down(1));
        assert!(!store.move_layer_down(0));
        assert!(!store.move_layer_up(usize::MAX));
        assert_eq!(store.layer(0).map(|l| l.name.as_str()), Some("Layer 0"));
    }

    #[test]
    fn test_layer_visibility() {
        let mut store = LayerStore::new(2, 2);
        assert!(store.is_layer_visible(0));
        assert!(store.toggle_layer_visibility(0));
        assert!(!store.is_layer_visible(0));
        assert!(store.set_layer_visible(0, true));
        assert!(store.is_layer_visible(0));
        assert!(!store.toggle_layer_visibility(3));
        assert!(store.rename_layer(0, "Ground"));
        assert_eq!(store.layer(0).map(|l| l.name.as_str()), Some("Ground"));
    }

    #[test]
    fn test_clear_tiles_referencing_texture() {
        let mut store = LayerStore::new(4, 4);
        store.create_layer();
        store.set_tile(0, 0, 0, tile(3, 0, 0));
        store.set_tile(1, 3, 3, tile(3, 1, 1));
        store.set_tile(1, 2, 2, tile(4, 1, 1));

        assert_eq!(store.clear_tiles_referencing_texture(3), 2);
        for layer in store.layers() {
            assert!(layer.grid.tiles().iter().all(|t| t.texture_id != 3));
        }
        assert_eq!(store.tile(1, 2, 2), Some(tile(4, 1, 1)));
    }

    #[test]
    fn test_clear_out_of_bounds_tiles() {
        let mut store = LayerStore::new(4, 4);
        store.set_tile(0, 0, 0, tile(1, 0, 0));
        store.set_tile(0, 1, 0, tile(1, 3, 0));
        store.set_tile(0, 2, 0, tile(1, 0, 3));
        store.set_tile(0, 3, 0, tile(2, 9, 9));

        assert_eq!(store.clear_out_of_bounds_tiles(1, 1, 1), 2);
        assert_eq!(store.tile(0, 0, 0), Some(tile(1, 0, 0)));
        assert_eq!(store.tile(0, 1, 0), Some(Tile::EMPTY));
        assert_eq!(store.tile(0, 2, 0), Some(Tile::EMPTY));
        assert_eq!(store.tile(0, 3, 0), Some(tile(2, 9, 9)));
    }

    #[test]
    fn test_store_serializes() {
        let mut store = LayerStore::new(2, 1);
        store.set_tile(0, 1, 0, tile(0, 1, 1));
        let json = serde_json::to_string(&store).expect("serialize");
        let back: LayerStore = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, store);
    }

    #[test]
    fn test_store_deserialize_rejects_bad_shapes() {
        let no_layers = r#"{"width":2,"height":2,"layers":[]}"#;
        let err = serde_json::from_str::<LayerStore>(no_layers).unwrap_err();
        assert!(err.to_string().contains("map has no layers"));

        // Layer grid is 1x1 inside a 2x1 store
        let small = LayerStore::new(1, 1);
        let layer = serde_json::to_string(&small.layers()[0]).expect("serialize");
        let mismatched = format!(r#"{{"width":2,"height":1,"layers":[{}]}}"#, layer);
        let err = serde_json::from_str::<LayerStore>(&mismatched).unwrap_err();
        assert!(err.to_string().contains("layer 0 has mismatched size 1x1"));

        let short_grid = r#"{"width":2,"height":2,"layers":[{"name":"a","visible":true,"grid":{"width":2,"height":2,"tiles":[]}}]}"#;
        assert!(serde_json::from_str::<LayerStore>(short_grid).is_err());
    }
}
