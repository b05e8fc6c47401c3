//! Grid cell value types

use serde::{Deserialize, Serialize};

/// Texture id stored in empty tiles
pub const EMPTY_TEXTURE: i32 = -1;

/// A coordinate in grid-cell space or texture-tile space.
///
/// No bounds are implied; consumers check against their own grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileId {
    pub x: i32,
    pub y: i32,
}

impl TileId {
    /// Sentinel used for "no coordinate" (drag origins, unset focus)
    pub const NONE: TileId = TileId { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Componentwise minimum
    pub fn min(self, other: TileId) -> TileId {
        TileId::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Componentwise maximum
    pub fn max(self, other: TileId) -> TileId {
        TileId::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Both components are non-negative
    pub fn is_non_negative(self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// Whether this coordinate lies in `0..width` x `0..height`
    pub fn is_within(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }
}

impl From<(i32, i32)> for TileId {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One placed tile: which texture, and which tile on it.
///
/// A tile only references a texture id; it owns nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub texture_id: i32,
    pub id_on_texture: TileId,
}

impl Default for Tile {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        texture_id: EMPTY_TEXTURE,
        id_on_texture: TileId { x: 0, y: 0 },
    };

    pub fn new(texture_id: i32, id_on_texture: TileId) -> Self {
        Self {
            texture_id,
            id_on_texture,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texture_id == EMPTY_TEXTURE
    }

    /// Whether this tile points at `texture_id`
    #[inline]
    pub fn references(&self, texture_id: i32) -> bool {
        !self.is_empty() && self.texture_id == texture_id
    }
}

/// Euclidean modulo; always in `0..m` for positive `m`
#[inline]
pub fn wrap(value: i32, m: i32) -> i32 {
    value.rem_euclid(m)
}
