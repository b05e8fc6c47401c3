//! Rectangular tile selections inside one palette texture

use crate::{Tile, TileId};
use serde::{Deserialize, Serialize};

/// A rectangle of texture tiles used as the brush source pattern.
///
/// `top_left.texture_id` names the source texture; `top_left.id_on_texture`
/// and `bottom_right` are inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSelection {
    pub top_left: Tile,
    pub bottom_right: TileId,
}

impl Default for TileSelection {
    fn default() -> Self {
        Self::NONE
    }
}

impl TileSelection {
    /// The empty selection
    pub const NONE: TileSelection = TileSelection {
        top_left: Tile {
            texture_id: crate::EMPTY_TEXTURE,
            id_on_texture: TileId::NONE,
        },
        bottom_right: TileId::NONE,
    };

    /// A 1x1 selection of `tile` on `texture_id`
    pub fn single(texture_id: i32, tile: TileId) -> Self {
        Self {
            top_left: Tile::new(texture_id, tile),
            bottom_right: tile,
        }
    }

    /// Selection spanning the rectangle between two arbitrary corners
    pub fn spanning(texture_id: i32, a: TileId, b: TileId) -> Self {
        Self {
            top_left: Tile::new(texture_id, a.min(b)),
            bottom_right: a.max(b),
        }
    }

    pub fn texture_id(&self) -> i32 {
        self.top_left.texture_id
    }

    pub fn origin(&self) -> TileId {
        self.top_left.id_on_texture
    }

    /// Width in tiles (may be <= 0 for malformed selections)
    pub fn width(&self) -> i32 {
        self.bottom_right.x - self.top_left.id_on_texture.x + 1
    }

    /// Height in tiles (may be <= 0 for malformed selections)
    pub fn height(&self) -> i32 {
        self.bottom_right.y - self.top_left.id_on_texture.y + 1
    }

    /// Both corners are non-negative and the rectangle is at least 1x1
    pub fn is_valid(&self) -> bool {
        self.top_left.id_on_texture.is_non_negative()
            && self.bottom_right.is_non_negative()
            && self.width() >= 1
            && self.height() >= 1
    }

    /// Whether the whole rectangle fits a texture of `tiles_w` x `tiles_h` tiles
    pub fn fits(&self, tiles_w: i32, tiles_h: i32) -> bool {
        self.is_valid() && self.bottom_right.x < tiles_w && self.bottom_right.y < tiles_h
    }

    /// The texture tile at offset `(dx, dy)` from the top-left corner
    pub fn tile_at(&self, dx: i32, dy: i32) -> Tile {
        let origin = self.origin();
        Tile::new(
            self.texture_id(),
            TileId::new(origin.x + dx, origin.y + dy),
        )
    }
}
