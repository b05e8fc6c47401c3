//! Core data structures for the tilemap editor
//!
//! This crate provides the fundamental types for representing layered tile maps:
//! - `Tile` / `TileId` - A texture reference placed in one grid cell
//! - `TileGrid` / `Layer` - One full-size, named grid of tiles
//! - `LayerStore` - The ordered stack of layers making up a map
//! - `TileSelection` - A rectangle of texture tiles used as a brush pattern

mod layer;
mod selection;
mod store;
mod tile;

pub use layer::{Layer, ShapeError, TileGrid};
pub use selection::TileSelection;
pub use store::{check_layers, LayerStore};
pub use tile::{wrap, Tile, TileId, EMPTY_TEXTURE};
