//! Editor preferences persisted between sessions

mod file;

pub use file::PreferencesError;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::brush::BrushKind;
use crate::camera::MIN_ZOOM;

/// Default tile size for new maps
pub const DEFAULT_TILE_SIZE: u32 = 16;
/// Default map dimensions in tiles
pub const DEFAULT_MAP_SIZE: (u32, u32) = (40, 30);
/// Wheel zoom speed
pub const DEFAULT_WHEEL_SPEED: f32 = 1.2;

/// User preferences stored as JSON in the platform config directory
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    pub tile_size: u32,
    pub map_width: u32,
    pub map_height: u32,
    /// Zoom change per wheel notch per second
    pub wheel_speed: f32,
    pub min_zoom: f32,
    /// Ask before deleting a layer
    pub confirm_layer_delete: bool,
    pub default_brush: BrushKind,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            map_width: DEFAULT_MAP_SIZE.0,
            map_height: DEFAULT_MAP_SIZE.1,
            wheel_speed: DEFAULT_WHEEL_SPEED,
            min_zoom: MIN_ZOOM,
            confirm_layer_delete: true,
            default_brush: BrushKind::Basic,
        }
    }
}
