//! Palette pane: loaded textures, their cameras and the brush selection
//!
//! Each texture keeps its own camera, created on first activation. Reading a
//! camera never creates one; `camera_mut_or_default` is the only inserting
//! accessor.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use bevy::math::Vec2;
use tilemap_core::{Tile, TileId, TileSelection};

use crate::camera::Camera;

/// Metadata of a texture loaded into the palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Tab label, `"{n}. {file_name}"`
    pub name: String,
    pub source_path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl TextureInfo {
    /// Size of the texture in whole tiles
    pub fn tile_dimensions(&self, tile_size: u32) -> (i32, i32) {
        let tile_size = tile_size.max(1);
        let tiles = |pixels: u32| (pixels / tile_size).min(i32::MAX as u32) as i32;
        (tiles(self.pixel_width), tiles(self.pixel_height))
    }

    /// Whole tiles in the texture, saturating at `u32::MAX`
    pub fn tile_count(&self, tile_size: u32) -> u32 {
        let (w, h) = self.tile_dimensions(tile_size);
        (w as u64 * h as u64).min(u32::MAX as u64) as u32
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    textures: BTreeMap<i32, TextureInfo>,
    cameras: HashMap<i32, Camera>,
    active_texture: Option<i32>,
    selected_texture: Option<i32>,
    selection: TileSelection,
    drag_origin: TileId,
    focused: TileId,
    tile_size: u32,
}

impl Palette {
    pub fn new(tile_size: u32) -> Self {
        Self {
            textures: BTreeMap::new(),
            cameras: HashMap::new(),
            active_texture: None,
            selected_texture: None,
            selection: TileSelection::NONE,
            drag_origin: TileId::NONE,
            focused: TileId::NONE,
            tile_size,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Loaded textures ordered by id
    pub fn textures(&self) -> &BTreeMap<i32, TextureInfo> {
        &self.textures
    }

    pub fn texture(&self, id: i32) -> Option<&TextureInfo> {
        self.textures.get(&id)
    }

    pub fn active_texture(&self) -> Option<i32> {
        self.active_texture
    }

    /// Texture the current selection was taken from
    pub fn selected_texture(&self) -> Option<i32> {
        self.selected_texture
    }

    pub fn selection(&self) -> &TileSelection {
        &self.selection
    }

    pub fn focused(&self) -> TileId {
        self.focused
    }

    pub fn set_focused(&mut self, focused: TileId) {
        self.focused = focused;
    }

    /// Switch tabs. Creates the texture's camera if it has none yet.
    pub fn set_active_texture(&mut self, id: i32) -> bool {
        if !self.textures.contains_key(&id) {
            return false;
        }
        self.active_texture = Some(id);
        self.camera_mut_or_default(id);
        true
    }

    pub fn camera(&self, id: i32) -> Option<&Camera> {
        self.cameras.get(&id)
    }

    pub fn camera_mut_or_default(&mut self, id: i32) -> &mut Camera {
        self.cameras.entry(id).or_default()
    }

    /// Camera of the active texture, or the default view
    pub fn active_camera(&self) -> Camera {
        self.active_texture
            .and_then(|id| self.cameras.get(&id).copied())
            .unwrap_or_default()
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        let id = self.active_texture?;
        Some(self.camera_mut_or_default(id))
    }

    /// Update focus from a pane-local pointer position
    pub fn focus_at(&mut self, pane_pixel: Vec2) -> TileId {
        self.focused = self.active_camera().tile_at(pane_pixel, self.tile_size);
        self.focused
    }

    /// Size of a texture in tiles
    pub fn texture_tiles(&self, id: i32) -> Option<(i32, i32)> {
        self.textures
            .get(&id)
            .map(|info| info.tile_dimensions(self.tile_size))
    }

    /// Whether the focused tile lies on the active texture
    pub fn is_valid_focus(&self) -> bool {
        let Some((w, h)) = self.active_texture.and_then(|id| self.texture_tiles(id)) else {
            return false;
        };
        self.focused.is_within(w, h)
    }

    /// Select the single focused tile
    pub fn click(&mut self) -> bool {
        let Some(active) = self.active_texture else {
            return false;
        };
        if !self.is_valid_focus() {
            return false;
        }
        self.selected_texture = Some(active);
        self.selection = TileSelection::single(active, self.focused);
        true
    }

    /// Begin a rectangular selection at the focused tile
    pub fn start_drag(&mut self) -> bool {
        if !self.click() {
            return false;
        }
        self.drag_origin = self.focused;
        true
    }

    /// Stretch the selection between the drag origin and the focused tile
    pub fn drag(&mut self) -> bool {
        let Some(active) = self.active_texture else {
            return false;
        };
        if self.drag_origin == TileId::NONE || !self.is_valid_focus() {
            return false;
        }
        let origin = self.drag_origin;
        self.selection = TileSelection {
            top_left: Tile::new(active, origin.min(self.focused)),
            bottom_right: origin.max(self.focused),
        };
        self.selected_texture = Some(active);
        true
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = TileId::NONE;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin != TileId::NONE
    }

    pub fn clear_selection(&mut self) {
        self.selection = TileSelection::NONE;
        self.selected_texture = None;
    }

    pub fn reset_view(&mut self) {
        if let Some(camera) = self.active_camera_mut() {
            camera.reset();
        }
    }

    /// Register a texture under an already allocated id and activate it
    pub(crate) fn insert_texture(&mut self, id: i32, info: TextureInfo) {
        self.textures.insert(id, info);
        self.set_active_texture(id);
    }

    /// Swap a texture's metadata, keeping its name and camera
    pub(crate) fn replace_texture(&mut self, id: i32, source_path: PathBuf, width: u32, height: u32) {
        if let Some(info) = self.textures.get_mut(&id) {
            info.source_path = source_path;
            info.pixel_width = width;
            info.pixel_height = height;
        }
    }

    /// Drop a texture and its camera; falls back to the first remaining tab
    pub(crate) fn remove_texture(&mut self, id: i32) -> Option<TextureInfo> {
        let info = self.textures.remove(&id)?;
        self.cameras.remove(&id);
        if self.active_texture == Some(id) {
            self.active_texture = self.textures.keys().next().copied();
        }
        if self.selected_texture == Some(id) {
            self.clear_selection();
        }
        Some(info)
    }
}
