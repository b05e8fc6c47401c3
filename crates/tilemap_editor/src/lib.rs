//! tilemap_editor - Layered tilemap editing core for Bevy
//!
//! This crate provides the interactive parts of a tilemap editor:
//! - Canvas with a layered tile store, view camera and selected layer
//! - Palette of textures with per-texture cameras and rectangular selection
//! - Basic and rectangle brushes, including wrap-tiled rectangle fills
//! - A guarded state machine that keeps canvas and palette drags exclusive
//! - Texture add/replace/delete with cascading cleanup of placed tiles
//! - Preferences and JSON map snapshots
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use tilemap_editor::TilemapEditorPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TilemapEditorPlugin::new().with_map_size(64, 48))
//!         .run();
//! }
//! ```

pub mod brush;
pub mod camera;
pub mod canvas;
pub mod export;
pub mod fsm;
pub mod map_settings;
pub mod palette;
pub mod preferences;
pub mod session;
pub mod textures;

pub use tilemap_core;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use brush::BrushKind;
use preferences::EditorPreferences;
use session::{EditorSession, Pane, PointerButton, PointerEvent};

/// Frame time used when no `Time` resource exists (headless apps)
const FALLBACK_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Screen rectangles of the two interactive panes, in window coordinates
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PaneLayout {
    pub canvas: Rect,
    pub palette: Rect,
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self {
            canvas: Rect::new(0.0, 0.0, 600.0, 720.0),
            palette: Rect::new(600.0, 0.0, 1200.0, 720.0),
        }
    }
}

impl PaneLayout {
    /// Pane under a window position, and the position relative to that pane
    pub fn locate(&self, cursor: Vec2) -> (Option<Pane>, Vec2) {
        if self.canvas.contains(cursor) {
            (Some(Pane::Canvas), cursor - self.canvas.min)
        } else if self.palette.contains(cursor) {
            (Some(Pane::Palette), cursor - self.palette.min)
        } else {
            (None, cursor)
        }
    }
}

/// Pointer events waiting to be applied this frame
#[derive(Resource, Debug, Default)]
pub struct PointerInput {
    events: Vec<PointerEvent>,
}

impl PointerInput {
    pub fn push(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Tilemap editor plugin with configurable initial state.
///
/// Explicit builder settings take precedence over saved preferences.
///
/// ```rust,ignore
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         TilemapEditorPlugin::new()
///             .with_tile_size(32)
///             .with_brush(BrushKind::Rectangle)
///     )
///     .run();
/// ```
#[derive(Default)]
pub struct TilemapEditorPlugin {
    /// Use these instead of loading from the config dir
    pub preferences: Option<EditorPreferences>,
    pub tile_size: Option<u32>,
    pub map_size: Option<(u32, u32)>,
    pub brush: Option<BrushKind>,
    pub pane_layout: Option<PaneLayout>,
}

impl TilemapEditorPlugin {
    /// Create an editor plugin with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip loading preferences from disk
    pub fn with_preferences(mut self, preferences: EditorPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Set the tile size of the initial map
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    /// Set the initial map size in tiles
    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_size = Some((width, height));
        self
    }

    /// Set the initial brush (default: from preferences)
    pub fn with_brush(mut self, brush: BrushKind) -> Self {
        self.brush = Some(brush);
        self
    }

    /// Set where the canvas and palette panes sit in the window
    pub fn with_pane_layout(mut self, layout: PaneLayout) -> Self {
        self.pane_layout = Some(layout);
        self
    }

    fn resolve_preferences(&self) -> EditorPreferences {
        let mut preferences = self
            .preferences
            .clone()
            .unwrap_or_else(EditorPreferences::load);
        if let Some(tile_size) = self.tile_size {
            preferences.tile_size = tile_size;
        }
        if let Some((width, height)) = self.map_size {
            preferences.map_width = width;
            preferences.map_height = height;
        }
        if let Some(brush) = self.brush {
            preferences.default_brush = brush;
        }
        preferences
    }
}

impl Plugin for TilemapEditorPlugin {
    fn build(&self, app: &mut App) {
        let preferences = self.resolve_preferences();
        info!(
            "TilemapEditorPlugin: {}x{} map, tile size {}, {} brush",
            preferences.map_width,
            preferences.map_height,
            preferences.tile_size,
            preferences.default_brush.display_name()
        );

        app.insert_resource(EditorSession::new(preferences.clone()))
            .insert_resource(preferences)
            .insert_resource(self.pane_layout.unwrap_or_default())
            .init_resource::<PointerInput>()
            .add_systems(Update, (collect_window_input, drive_session).chain());
    }
}

/// Translate window mouse input into queued pointer events
fn collect_window_input(
    mut input: ResMut<PointerInput>,
    mut last_cursor: Local<Option<Vec2>>,
    layout: Res<PaneLayout>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_buttons: Option<Res<ButtonInput<MouseButton>>>,
    scroll: Option<Res<bevy::input::mouse::AccumulatedMouseScroll>>,
) {
    let Some(window) = windows.iter().next() else {
        return;
    };

    if let Some(cursor) = window.cursor_position() {
        if *last_cursor != Some(cursor) {
            let delta = last_cursor.map(|last| cursor - last).unwrap_or(Vec2::ZERO);
            let (pane, position) = layout.locate(cursor);
            input.push(PointerEvent::Moved {
                pane,
                position,
                delta,
            });
            *last_cursor = Some(cursor);
        }
    } else if last_cursor.take().is_some() {
        input.push(PointerEvent::Moved {
            pane: None,
            position: Vec2::ZERO,
            delta: Vec2::ZERO,
        });
    }

    if let Some(mouse_buttons) = mouse_buttons {
        for (mouse, pointer) in [
            (MouseButton::Left, PointerButton::Left),
            (MouseButton::Right, PointerButton::Right),
            (MouseButton::Middle, PointerButton::Middle),
        ] {
            if mouse_buttons.just_pressed(mouse) {
                input.push(PointerEvent::ButtonDown(pointer));
            }
            if mouse_buttons.just_released(mouse) {
                input.push(PointerEvent::ButtonUp(pointer));
            }
        }
    }

    if let Some(scroll) = scroll {
        if scroll.delta.y != 0.0 {
            input.push(PointerEvent::Wheel(scroll.delta.y));
        }
    }
}

/// Apply queued events, then run the frame tick
fn drive_session(
    mut session: ResMut<EditorSession>,
    mut input: ResMut<PointerInput>,
    preferences: Res<EditorPreferences>,
    time: Option<Res<Time>>,
) {
    if preferences.is_changed() {
        session.set_preferences(preferences.clone());
    }
    for event in input.drain() {
        session.handle_event(event);
    }
    let delta_seconds = time
        .map(|t| t.delta_secs())
        .unwrap_or(FALLBACK_FRAME_SECONDS);
    session.update(delta_seconds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DragState, LayerDeleteOutcome};
    use crate::textures::{TextureError, TextureProvider};
    use std::path::Path;
    use tilemap_core::{Tile, TileId};

    struct Atlas;

    impl TextureProvider for Atlas {
        fn dimensions(&self, _path: &Path) -> Result<(u32, u32), TextureError> {
            Ok((32, 32))
        }
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(
            TilemapEditorPlugin::new()
                .with_preferences(EditorPreferences::default())
                .with_map_size(10, 8)
                .with_brush(BrushKind::Rectangle),
        );
        app
    }

    fn push(app: &mut App, events: &[PointerEvent]) {
        let mut input = app.world_mut().resource_mut::<PointerInput>();
        for event in events {
            input.push(*event);
        }
    }

    fn moved(pane: Pane, x: f32, y: f32) -> PointerEvent {
        PointerEvent::Moved {
            pane: Some(pane),
            position: Vec2::new(x, y),
            delta: Vec2::ZERO,
        }
    }

    #[test]
    fn test_plugin_builder_overrides_preferences() {
        let app = app();
        let session = app.world().resource::<EditorSession>();
        assert_eq!(session.canvas().store().width(), 10);
        assert_eq!(session.canvas().store().height(), 8);
        assert_eq!(session.canvas().brush.kind, BrushKind::Rectangle);
        assert_eq!(*app.world().resource::<PaneLayout>(), PaneLayout::default());
    }

    #[test]
    fn test_pane_layout_locate() {
        let layout = PaneLayout::default();
        assert_eq!(
            layout.locate(Vec2::new(10.0, 20.0)),
            (Some(Pane::Canvas), Vec2::new(10.0, 20.0))
        );
        assert_eq!(
            layout.locate(Vec2::new(650.0, 20.0)),
            (Some(Pane::Palette), Vec2::new(50.0, 20.0))
        );
        assert_eq!(layout.locate(Vec2::new(5000.0, 0.0)).0, None);
    }

    #[test]
    fn test_preferences_resource_reaches_session() {
        let mut app = app();
        app.update();
        assert!(app.world().resource::<EditorSession>().preferences().confirm_layer_delete);

        {
            let mut preferences = app.world_mut().resource_mut::<EditorPreferences>();
            preferences.confirm_layer_delete = false;
            preferences.wheel_speed = 2.5;
        }
        app.update();

        let mut session = app.world_mut().resource_mut::<EditorSession>();
        assert_eq!(session.preferences().wheel_speed, 2.5);
        session.add_layer();
        assert_eq!(session.request_delete_layer(0), LayerDeleteOutcome::Deleted);
        assert_eq!(session.canvas().store().len(), 1);
    }

    #[test]
    fn test_headless_app_drives_session() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<EditorSession>()
            .add_texture(&Atlas, "atlas.png")
            .expect("texture");

        // Palette tile (0, 0) under the default camera
        push(
            &mut app,
            &[
                moved(Pane::Palette, 5.0, 5.0),
                PointerEvent::ButtonDown(PointerButton::Left),
                PointerEvent::ButtonUp(PointerButton::Left),
            ],
        );
        app.update();
        assert!(app.world().resource::<PointerInput>().is_empty());

        // Canvas drag from cell (1, 1) to (3, 2)
        push(
            &mut app,
            &[
                moved(Pane::Canvas, 20.0, 20.0),
                PointerEvent::ButtonDown(PointerButton::Left),
            ],
        );
        app.update();
        assert_eq!(
            app.world().resource::<EditorSession>().drag_state(),
            DragState::DraggingCanvasPaint
        );

        push(&mut app, &[moved(Pane::Canvas, 52.0, 36.0)]);
        app.update();
        push(&mut app, &[PointerEvent::ButtonUp(PointerButton::Left)]);
        app.update();

        let session = app.world().resource::<EditorSession>();
        assert_eq!(session.drag_state(), DragState::Idle);
        let store = session.canvas().store();
        assert_eq!(store.layer(0).map(|l| l.tile_count()), Some(6));
        assert_eq!(store.tile(0, 3, 2), Some(Tile::new(0, TileId::new(0, 0))));
    }
}
