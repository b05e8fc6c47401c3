//! Map snapshots for persistence and export
//!
//! A snapshot is a complete, self-consistent copy of the map: every layer and
//! the texture table. Textures carry TMX-style first global ids so exporters
//! can flatten `(texture, tile)` pairs into a single id space.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tilemap_core::{check_layers, Layer, Tile, TileId};

use crate::canvas::Canvas;
use crate::palette::Palette;

#[derive(Debug)]
pub enum ExportError {
    Serialize(String),
    Parse(String),
    Io(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ExportError::Parse(e) => write!(f, "Parse error: {}", e),
            ExportError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

/// One texture in the snapshot's texture table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRecord {
    pub id: i32,
    pub name: String,
    pub source_path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Tiles per row
    pub columns: u32,
    pub tile_count: u32,
    /// Global id of this texture's tile (0, 0)
    pub first_gid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub layers: Vec<Layer>,
    /// Ordered by texture id
    pub textures: Vec<TextureRecord>,
}

impl MapSnapshot {
    /// Copy the current map and texture table
    pub fn capture(canvas: &Canvas, palette: &Palette) -> Self {
        let tile_size = canvas.tile_size();
        let mut next_gid = 1;
        let textures = palette
            .textures()
            .iter()
            .map(|(&id, info)| {
                let (columns, _) = info.tile_dimensions(tile_size);
                let tile_count = info.tile_count(tile_size);
                let record = TextureRecord {
                    id,
                    name: info.name.clone(),
                    source_path: info.source_path.clone(),
                    pixel_width: info.pixel_width,
                    pixel_height: info.pixel_height,
                    columns: columns as u32,
                    tile_count,
                    first_gid: next_gid,
                };
                next_gid = next_gid.saturating_add(tile_count);
                record
            })
            .collect();

        Self {
            width: canvas.store().width(),
            height: canvas.store().height(),
            tile_size,
            layers: canvas.store().layers().to_vec(),
            textures,
        }
    }

    /// First global id assigned to a texture
    pub fn first_gid(&self, texture_id: i32) -> Option<u32> {
        self.textures
            .iter()
            .find(|t| t.id == texture_id)
            .map(|t| t.first_gid)
    }

    /// Global id of a tile; 0 for empty or unresolvable tiles
    pub fn gid(&self, tile: &Tile) -> u32 {
        if tile.is_empty() {
            return 0;
        }
        let Some(texture) = self.textures.iter().find(|t| t.id == tile.texture_id) else {
            return 0;
        };
        let TileId { x, y } = tile.id_on_texture;
        if x < 0 || y < 0 || x as u32 >= texture.columns {
            return 0;
        }
        let local = y as u64 * texture.columns as u64 + x as u64;
        if local >= texture.tile_count as u64 {
            return 0;
        }
        texture.first_gid.checked_add(local as u32).unwrap_or(0)
    }

    /// Row-major global ids of one layer
    pub fn layer_gids(&self, index: usize) -> Option<Vec<u32>> {
        let layer = self.layers.get(index)?;
        Some(layer.grid.tiles().iter().map(|t| self.gid(t)).collect())
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialize(e.to_string()))
    }

    /// Parse a snapshot, rejecting layer data that does not fit the map size
    pub fn from_json(content: &str) -> Result<Self, ExportError> {
        let snapshot: Self =
            serde_json::from_str(content).map_err(|e| ExportError::Parse(e.to_string()))?;
        check_layers(snapshot.width, snapshot.height, &snapshot.layers)
            .map_err(|e| ExportError::Parse(e.to_string()))?;
        Ok(snapshot)
    }

    /// Save snapshot to file
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let content = self.to_json()?;
        std::fs::write(path, content).map_err(|e| ExportError::Io(e.to_string()))?;
        bevy::log::info!("Exported map snapshot to {:?}", path);
        Ok(())
    }

    /// Load snapshot from file
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ExportError::Io(e.to_string()))?;
        Self::from_json(&content)
    }
}
