//! The map canvas: layer store, view camera, pointer focus and selected layer

use bevy::log::{debug, info};
use bevy::math::Vec2;
use tilemap_core::{Layer, LayerStore, Tile, TileId, TileSelection};

use crate::brush::{self, BrushEngine, BrushKind, DragOutcome};
use crate::camera::Camera;

/// Everything the canvas pane edits and draws
#[derive(Debug, Clone)]
pub struct Canvas {
    store: LayerStore,
    pub camera: Camera,
    tile_size: u32,
    focused: TileId,
    selected_layer: usize,
    pub brush: BrushEngine,
}

impl Canvas {
    pub fn new(width: u32, height: u32, tile_size: u32, brush: BrushKind) -> Self {
        Self {
            store: LayerStore::new(width, height),
            camera: Camera::default(),
            tile_size,
            focused: TileId::NONE,
            selected_layer: 0,
            brush: BrushEngine::new(brush),
        }
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Cell under the pointer, possibly outside the map
    pub fn focused(&self) -> TileId {
        self.focused
    }

    pub fn set_focused(&mut self, focused: TileId) {
        self.focused = focused;
    }

    /// Update focus from a pane-local pointer position
    pub fn focus_at(&mut self, pane_pixel: Vec2) -> TileId {
        self.focused = self.camera.tile_at(pane_pixel, self.tile_size);
        self.focused
    }

    pub fn selected_layer(&self) -> usize {
        self.selected_layer
    }

    pub fn select_layer(&mut self, index: usize) -> bool {
        if index >= self.store.len() {
            return false;
        }
        self.selected_layer = index;
        true
    }

    pub fn is_valid_hover(&self) -> bool {
        brush::is_valid_hover(&self.store, self.focused)
    }

    pub fn is_valid_focus(&self, selection: &TileSelection) -> bool {
        brush::is_valid_focus(&self.store, self.focused, selection)
    }

    /// Outline of the brush at the focused cell
    pub fn focus_footprint(&self, selection: &TileSelection) -> Option<(TileId, TileId)> {
        brush::focus_footprint(&self.store, self.focused, selection)
    }

    /// Single click with the active brush
    pub fn place(&mut self, selection: &TileSelection, clear: bool) -> bool {
        self.brush
            .place(&mut self.store, self.selected_layer, self.focused, selection, clear)
    }

    pub fn start_drag(&mut self, selection: &TileSelection, clear: bool) -> bool {
        self.brush
            .start_drag(&self.store, self.selected_layer, self.focused, selection, clear)
    }

    pub fn drag(&mut self, selection: &TileSelection, clear_if_basic: bool) -> bool {
        self.brush.drag(
            &mut self.store,
            self.selected_layer,
            self.focused,
            selection,
            clear_if_basic,
        )
    }

    pub fn end_drag(&mut self, cancelled: bool) -> DragOutcome {
        let outcome = self.brush.end_drag(&mut self.store, cancelled);
        match outcome {
            DragOutcome::Committed(cells) => info!("Committed rectangle of {} cells", cells),
            DragOutcome::Cancelled => info!("Rectangle drag cancelled"),
            DragOutcome::Discarded => info!("Rectangle drag discarded, target layer hidden"),
            DragOutcome::NoDrag => {}
        }
        outcome
    }

    /// Tile the renderer should draw at a cell.
    ///
    /// Cells inside an active rectangle drag on `layer` show the preview.
    pub fn display_tile(&self, layer: usize, x: i32, y: i32) -> Option<Tile> {
        if let Some(session) = self.brush.drag_session() {
            if session.layer == layer && session.covers(x, y) {
                return session.preview.get(x, y);
            }
        }
        self.store.tile(layer, x, y)
    }

    /// Visible layers in paint order
    pub fn visible_layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.store
            .layers()
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.visible)
    }

    /// Add a layer on top and select it
    pub fn create_layer(&mut self) -> usize {
        let index = self.store.create_layer();
        self.selected_layer = index;
        info!("Created layer {}", index);
        index
    }

    /// Remove a layer, keeping the selection on a sensible neighbour.
    ///
    /// Deleting the selected layer selects the one below it and makes it
    /// visible.
    pub fn delete_layer(&mut self, index: usize) -> Option<Layer> {
        let removed = self.store.delete_layer(index)?;
        self.drop_drag_on_layer_change();

        if index == self.selected_layer {
            self.selected_layer = index.saturating_sub(1);
            self.store.set_layer_visible(self.selected_layer, true);
        } else if index < self.selected_layer {
            self.selected_layer -= 1;
        }
        info!("Deleted layer {} ('{}')", index, removed.name);
        Some(removed)
    }

    /// Exchange two layers; the selection follows the layer it was on
    pub fn swap_layers(&mut self, a: usize, b: usize) -> bool {
        if !self.store.swap_layers(a, b) {
            debug!("Ignoring layer swap {} <-> {}", a, b);
            return false;
        }
        self.drop_drag_on_layer_change();

        if self.selected_layer == a {
            self.selected_layer = b;
        } else if self.selected_layer == b {
            self.selected_layer = a;
        }
        info!("Swapped layers {} and {}", a, b);
        true
    }

    pub fn move_selected_layer_up(&mut self) -> bool {
        let index = self.selected_layer;
        self.swap_layers(index, index + 1)
    }

    pub fn move_selected_layer_down(&mut self) -> bool {
        let index = self.selected_layer;
        index > 0 && self.swap_layers(index, index - 1)
    }

    pub fn toggle_layer_visibility(&mut self, index: usize) -> bool {
        self.store.toggle_layer_visibility(index)
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> bool {
        self.store.rename_layer(index, name)
    }

    pub fn clear_tiles_referencing_texture(&mut self, texture_id: i32) -> usize {
        self.store.clear_tiles_referencing_texture(texture_id)
    }

    pub fn clear_out_of_bounds_tiles(&mut self, texture_id: i32, max_x: i32, max_y: i32) -> usize {
        self.store
            .clear_out_of_bounds_tiles(texture_id, max_x, max_y)
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    // A drag locked to an index would otherwise land on the wrong layer
    fn drop_drag_on_layer_change(&mut self) {
        if self.brush.is_dragging() {
            self.brush.abort();
            info!("Rectangle drag dropped after layer order changed");
        }
    }
}
