//! Pan/zoom cameras for the canvas and for each palette texture

use bevy::math::Vec2;
use tilemap_core::TileId;

/// Pan offset a fresh camera starts with
pub const DEFAULT_PAN: Vec2 = Vec2::new(-1.0, 0.0);
/// Zoom a fresh camera starts with
pub const DEFAULT_ZOOM: f32 = 1.0;
/// Lowest zoom wheel input can reach
pub const MIN_ZOOM: f32 = 0.1;

/// Map a pixel in grid space to the tile under it
pub fn pixel_to_tile(pixel: Vec2, tile_size: u32, zoom: f32) -> TileId {
    let on_screen = tile_size as f32 * zoom;
    TileId::new(
        (pixel.x / on_screen).floor() as i32,
        (pixel.y / on_screen).floor() as i32,
    )
}

/// A 2D view: where the grid sits and how large it is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: DEFAULT_PAN,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    /// Screen position of the grid's top-left corner, relative to the pane
    pub fn screen_origin(&self) -> Vec2 {
        self.pan * -self.zoom
    }

    /// On-screen size of one tile
    pub fn on_screen_tile_size(&self, tile_size: u32) -> f32 {
        tile_size as f32 * self.zoom
    }

    /// Tile under a pane-local pixel position
    pub fn tile_at(&self, pane_pixel: Vec2, tile_size: u32) -> TileId {
        pixel_to_tile(pane_pixel - self.screen_origin(), tile_size, self.zoom)
    }

    /// Drag the view by a screen-space pointer motion
    pub fn pan_by(&mut self, motion: Vec2) {
        self.pan += motion * (-1.0 / self.zoom);
    }

    /// Apply one frame of wheel zoom
    pub fn zoom_by_wheel(&mut self, wheel: f32, delta_seconds: f32, speed: f32, min_zoom: f32) {
        let multiplier = 1.0 - wheel * delta_seconds * speed;
        self.zoom = (self.zoom * multiplier).max(min_zoom);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
