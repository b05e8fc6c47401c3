//! Standalone tilemap editor binary
//!
//! Run with: tilemap_editor [texture.png ...]
//!
//! Every path on the command line is loaded into the palette at startup.

use bevy::prelude::*;
use bevy::window::WindowResolution;
use tilemap_editor::session::{DragState, EditorSession};
use tilemap_editor::textures::ImageFileProvider;
use tilemap_editor::{PaneLayout, TilemapEditorPlugin};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Tilemap Editor".to_string(),
                resolution: WindowResolution::new(1200, 720).with_scale_factor_override(1.0),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(TilemapEditorPlugin::new().with_pane_layout(PaneLayout::default()))
        .add_systems(Startup, (setup_camera, load_textures_from_args))
        .add_systems(Update, log_drag_state_changes)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Load textures named on the command line
fn load_textures_from_args(mut session: ResMut<EditorSession>) {
    for path in std::env::args().skip(1) {
        match session.add_texture(&ImageFileProvider, &path) {
            Ok(id) => info!("Loaded texture {} from {}", id, path),
            Err(e) => warn!("Failed to load texture '{}': {}", path, e),
        }
    }
}

fn log_drag_state_changes(session: Res<EditorSession>, mut last: Local<DragState>) {
    let current = session.drag_state();
    if current != *last {
        info!("Drag state: {:?} -> {:?}", *last, current);
        *last = current;
    }
}
