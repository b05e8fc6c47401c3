//! Tile grids and layer records

use std::fmt;

use crate::{Tile, TileId};
use serde::{Deserialize, Serialize};

/// Loaded grid or store data that does not describe a valid map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Tile vector length differs from `width * height`
    TileCount { expected: usize, found: usize },
    /// A store with no layers
    NoLayers,
    /// A layer whose grid size differs from the store's
    LayerSize { index: usize, width: u32, height: u32 },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::TileCount { expected, found } => {
                write!(f, "expected {} tiles, found {}", expected, found)
            }
            ShapeError::NoLayers => write!(f, "map has no layers"),
            ShapeError::LayerSize {
                index,
                width,
                height,
            } => write!(f, "layer {} has mismatched size {}x{}", index, width, height),
        }
    }
}

impl std::error::Error for ShapeError {}

/// A fixed-size, row-major grid of tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTileGrid")]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

/// Unchecked wire form of `TileGrid`
#[derive(Deserialize)]
struct RawTileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TryFrom<RawTileGrid> for TileGrid {
    type Error = ShapeError;

    fn try_from(raw: RawTileGrid) -> Result<Self, Self::Error> {
        let expected = cell_count(raw.width, raw.height);
        if raw.tiles.len() != expected {
            return Err(ShapeError::TileCount {
                expected,
                found: raw.tiles.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            tiles: raw.tiles,
        })
    }
}

#[inline]
fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl TileGrid {
    /// Create an all-empty grid
    pub fn new(width: u32, height: u32) -> Self {
        let size = cell_count(width, height);
        Self {
            width,
            height,
            tiles: vec![Tile::EMPTY; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Whether `(x, y)` is a cell of this grid
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Get the tile at a cell, `None` when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).and_then(|i| self.tiles.get(i).copied())
    }

    /// Write one cell. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.index(x, y) {
            Some(i) => match self.tiles.get_mut(i) {
                Some(cell) => {
                    *cell = tile;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// One row of tiles, `None` when out of bounds
    pub fn row(&self, y: u32) -> Option<&[Tile]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.tiles.get(start..start + self.width as usize)
    }

    /// Copy the inclusive rectangle `min..=max` from `source` into this grid.
    ///
    /// Cells outside either grid are skipped.
    pub fn copy_region_from(&mut self, source: &TileGrid, min: TileId, max: TileId) {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                if let Some(tile) = source.get(x, y) {
                    self.set(x, y, tile);
                }
            }
        }
    }

    /// Reset every tile matching `predicate` to empty, returning how many changed
    pub fn clear_where(&mut self, mut predicate: impl FnMut(&Tile) -> bool) -> usize {
        let mut cleared = 0;
        for tile in self.tiles.iter_mut() {
            if !tile.is_empty() && predicate(tile) {
                *tile = Tile::EMPTY;
                cleared += 1;
            }
        }
        cleared
    }
}

/// A named, toggleable tile layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub grid: TileGrid,
}

impl Layer {
    /// Create a new all-empty layer
    pub fn new(name: String, width: u32, height: u32) -> Self {
        Self {
            name,
            visible: true,
            grid: TileGrid::new(width, height),
        }
    }

    /// Number of non-empty cells
    pub fn tile_count(&self) -> usize {
        self.grid.tiles().iter().filter(|t| !t.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer() {
        let layer = Layer::new("Ground".to_string(), 10, 8);

        assert_eq!(layer.name, "Ground");
        assert!(layer.visible);
        assert_eq!(layer.grid.tiles().len(), 80);
        assert!(layer.grid.tiles().iter().all(|t| t.is_empty()));
        assert_eq!(layer.tile_count(), 0);
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = TileGrid::new(4, 3);
        let tile = Tile::new(0, TileId::new(1, 1));

        assert!(grid.set(3, 2, tile));
        assert_eq!(grid.get(3, 2), Some(tile));
        assert!(!grid.set(4, 0, tile));
        assert!(!grid.set(0, -1, tile));
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.row(2).map(|r| r[3]), Some(tile));
        assert!(grid.row(3).is_none());
    }

    #[test]
    fn test_copy_region() {
        let mut source = TileGrid::new(5, 5);
        let tile = Tile::new(2, TileId::new(0, 0));
        source.set(1, 1, tile);
        source.set(4, 4, tile);

        let mut target = TileGrid::new(5, 5);
        target.copy_region_from(&source, TileId::new(0, 0), TileId::new(2, 2));

        assert_eq!(target.get(1, 1), Some(tile));
        assert_eq!(target.get(4, 4), Some(Tile::EMPTY));
    }

    #[test]
    fn test_clear_where_counts() {
        let mut grid = TileGrid::new(3, 1);
        grid.set(0, 0, Tile::new(1, TileId::new(0, 0)));
        grid.set(1, 0, Tile::new(2, TileId::new(0, 0)));

        let cleared = grid.clear_where(|t| t.texture_id == 1);
        assert_eq!(cleared, 1);
        assert!(grid.get(0, 0).is_some_and(|t| t.is_empty()));
        assert_eq!(grid.get(1, 0).map(|t| t.texture_id), Some(2));
    }

    #[test]
    fn test_grid_deserialize_checks_tile_count() {
        let short = r#"{"width":2,"height":2,"tiles":[]}"#;
        let err = serde_json::from_str::<TileGrid>(short).unwrap_err();
        assert!(err.to_string().contains("expected 4 tiles, found 0"));

        let grid = TileGrid::new(2, 1);
        let json = serde_json::to_string(&grid).expect("serialize");
        let back: TileGrid = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, grid);
    }
}
