//! Editor session: pointer input, drag arbitration and editing commands
//!
//! Pointer events are applied in arrival order and may fire state machine
//! transitions immediately. `update` then runs one frame: the drag tick for
//! the active drag state, camera pan and zoom, and the frame flag reset.
//!
//! Only one drag can be active at a time since the machine has a single
//! current state. Drag-end transitions have no guard, so releasing a button
//! always returns to `Idle` even if focus moved to another pane mid-drag.

use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use std::path::Path;

use crate::brush::BrushKind;
use crate::canvas::Canvas;
use crate::export::MapSnapshot;
use crate::fsm::{StateMachine, Transition};
use crate::map_settings::MapSettings;
use crate::palette::Palette;
use crate::preferences::EditorPreferences;
use crate::textures::{
    AppliedTextureChange, ReplaceOutcome, TextureError, TextureManager, TextureProvider,
};

/// Interactive surfaces that receive pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Canvas,
    Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

impl PointerButton {
    fn index(self) -> usize {
        match self {
            PointerButton::Left => 0,
            PointerButton::Right => 1,
            PointerButton::Middle => 2,
        }
    }
}

/// Raw input fed to the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved; `position` is relative to `pane`'s top-left corner
    Moved {
        pane: Option<Pane>,
        position: Vec2,
        delta: Vec2,
    },
    ButtonDown(PointerButton),
    ButtonUp(PointerButton),
    /// Wheel notches, positive away from the user
    Wheel(f32),
}

/// Pointer facts accumulated over one frame
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Pane under the pointer
    pub pane: Option<Pane>,
    /// Pane-local position
    pub position: Vec2,
    /// Motion accumulated this frame
    pub motion: Vec2,
    /// Wheel accumulated this frame
    pub wheel: f32,
    held: [bool; 3],
    just_pressed: [bool; 3],
}

impl PointerState {
    pub fn pressed(&self, button: PointerButton) -> bool {
        self.held[button.index()]
    }

    /// Button went down this frame
    pub fn just_pressed(&self, button: PointerButton) -> bool {
        self.just_pressed[button.index()]
    }

    fn end_frame(&mut self) {
        self.just_pressed = [false; 3];
        self.motion = Vec2::ZERO;
        self.wheel = 0.0;
    }
}

/// Which drag owns the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingCanvasPaint,
    DraggingCanvasErase,
    DraggingPalette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragTransition {
    StartCanvasPaint,
    EndCanvasPaint,
    StartCanvasErase,
    EndCanvasErase,
    StartPalette,
    EndPalette,
}

/// Result of asking to delete a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDeleteOutcome {
    Deleted,
    NeedsConfirmation,
    /// Index out of range, or the last layer
    Refused,
}

/// Everything the drag machine's guards and actions operate on
pub struct Workspace {
    pub canvas: Canvas,
    pub palette: Palette,
    pub textures: TextureManager,
    pub pointer: PointerState,
    pub preferences: EditorPreferences,
    pending_layer_delete: Option<usize>,
    skip_layer_delete_confirmation: bool,
}

impl Workspace {
    fn new(settings: MapSettings, preferences: EditorPreferences) -> Self {
        Self {
            canvas: Canvas::new(
                settings.width,
                settings.height,
                settings.tile_size,
                preferences.default_brush,
            ),
            palette: Palette::new(settings.tile_size),
            textures: TextureManager::new(),
            pointer: PointerState::default(),
            preferences,
            pending_layer_delete: None,
            skip_layer_delete_confirmation: false,
        }
    }

    /// Editing is blocked while any confirmation is open
    pub fn allow_input(&self) -> bool {
        self.pending_layer_delete.is_none() && !self.textures.has_pending()
    }

    fn can_start(&self, pane: Pane, button: PointerButton) -> bool {
        self.allow_input() && self.pointer.pane == Some(pane) && self.pointer.just_pressed(button)
    }

    fn start_canvas_drag(&mut self, clear: bool) {
        let selection = *self.palette.selection();
        self.canvas.start_drag(&selection, clear);
    }

    /// End a canvas drag. Cancelled when `cancel_button` went down this frame.
    fn finish_canvas_drag(&mut self, clear: bool, cancel_button: PointerButton) {
        let cancelled = self.pointer.just_pressed(cancel_button);
        if !cancelled && self.allow_input() {
            // Clicks shorter than a frame still paint
            let selection = *self.palette.selection();
            self.canvas.drag(&selection, clear);
        }
        self.canvas.end_drag(cancelled);
    }

    fn start_palette_drag(&mut self) {
        self.palette.start_drag();
    }

    fn finish_palette_drag(&mut self) {
        if self.allow_input() {
            self.palette.drag();
        }
        self.palette.end_drag();
    }

    fn refresh_focus(&mut self) {
        let position = self.pointer.position;
        match self.pointer.pane {
            Some(Pane::Canvas) => {
                self.canvas.focus_at(position);
            }
            Some(Pane::Palette) => {
                self.palette.focus_at(position);
            }
            None => {}
        }
    }
}

fn build_drag_machine() -> StateMachine<DragState, DragTransition, Workspace> {
    use DragState::*;
    use DragTransition::*;

    let mut fsm = StateMachine::new(Idle);
    fsm.add_transition(Transition::new(
        StartCanvasPaint,
        Idle,
        DraggingCanvasPaint,
        |ws: &Workspace| ws.can_start(Pane::Canvas, PointerButton::Left),
        |ws: &mut Workspace| ws.start_canvas_drag(false),
    ));
    fsm.add_transition(Transition::always(
        EndCanvasPaint,
        DraggingCanvasPaint,
        Idle,
        |ws: &mut Workspace| ws.finish_canvas_drag(false, PointerButton::Right),
    ));
    fsm.add_transition(Transition::new(
        StartCanvasErase,
        Idle,
        DraggingCanvasErase,
        |ws: &Workspace| ws.can_start(Pane::Canvas, PointerButton::Right),
        |ws: &mut Workspace| ws.start_canvas_drag(true),
    ));
    fsm.add_transition(Transition::always(
        EndCanvasErase,
        DraggingCanvasErase,
        Idle,
        |ws: &mut Workspace| ws.finish_canvas_drag(true, PointerButton::Left),
    ));
    fsm.add_transition(Transition::new(
        StartPalette,
        Idle,
        DraggingPalette,
        |ws: &Workspace| ws.can_start(Pane::Palette, PointerButton::Left),
        |ws: &mut Workspace| ws.start_palette_drag(),
    ));
    fsm.add_transition(Transition::always(
        EndPalette,
        DraggingPalette,
        Idle,
        |ws: &mut Workspace| ws.finish_palette_drag(),
    ));
    fsm
}

/// The editor's whole mutable state, one per window
#[derive(Resource)]
pub struct EditorSession {
    fsm: StateMachine<DragState, DragTransition, Workspace>,
    pub workspace: Workspace,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorPreferences::default())
    }
}

impl EditorSession {
    /// Start with an empty map sized by the preferences
    pub fn new(preferences: EditorPreferences) -> Self {
        let settings = MapSettings::new(
            preferences.tile_size,
            preferences.map_width,
            preferences.map_height,
        )
        .unwrap_or_else(|e| {
            warn!("Invalid map size in preferences: {}. Using defaults.", e);
            let defaults = EditorPreferences::default();
            MapSettings {
                tile_size: defaults.tile_size,
                width: defaults.map_width,
                height: defaults.map_height,
            }
        });
        Self {
            fsm: build_drag_machine(),
            workspace: Workspace::new(settings, preferences),
        }
    }

    pub fn drag_state(&self) -> DragState {
        self.fsm.current()
    }

    pub fn allow_input(&self) -> bool {
        self.workspace.allow_input()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.workspace.canvas
    }

    pub fn preferences(&self) -> &EditorPreferences {
        &self.workspace.preferences
    }

    /// Replace the preferences in use.
    ///
    /// Zoom and confirmation settings apply at once; map and tile size apply
    /// from the next `new_map`.
    pub fn set_preferences(&mut self, preferences: EditorPreferences) {
        debug!("Editor preferences updated");
        self.workspace.preferences = preferences;
    }

    pub fn palette(&self) -> &Palette {
        &self.workspace.palette
    }

    /// Throw away the map, textures and any drag, and start fresh
    pub fn new_map(&mut self, settings: MapSettings) {
        let preferences = self.workspace.preferences.clone();
        let brush = self.workspace.canvas.brush.kind;
        self.workspace = Workspace::new(settings, preferences);
        self.workspace.canvas.brush.kind = brush;
        self.fsm.reset();
        info!(
            "New map {}x{} with tile size {}",
            settings.width, settings.height, settings.tile_size
        );
    }

    /// Apply one pointer event, firing any transitions it triggers
    pub fn handle_event(&mut self, event: PointerEvent) {
        use DragTransition::*;

        match event {
            PointerEvent::Moved {
                pane,
                position,
                delta,
            } => {
                let pointer = &mut self.workspace.pointer;
                pointer.pane = pane;
                pointer.position = position;
                pointer.motion += delta;
                self.workspace.refresh_focus();
            }
            PointerEvent::ButtonDown(button) => {
                let pointer = &mut self.workspace.pointer;
                if !pointer.held[button.index()] {
                    pointer.just_pressed[button.index()] = true;
                }
                pointer.held[button.index()] = true;
                match button {
                    PointerButton::Left => {
                        self.fire(StartCanvasPaint);
                        self.fire(EndCanvasErase);
                        self.fire(StartPalette);
                    }
                    PointerButton::Right => {
                        self.fire(StartCanvasErase);
                        self.fire(EndCanvasPaint);
                    }
                    PointerButton::Middle => {}
                }
            }
            PointerEvent::ButtonUp(button) => {
                self.workspace.pointer.held[button.index()] = false;
                match button {
                    PointerButton::Left => {
                        self.fire(EndCanvasPaint);
                        self.fire(EndPalette);
                    }
                    PointerButton::Right => {
                        self.fire(EndCanvasErase);
                    }
                    PointerButton::Middle => {}
                }
            }
            PointerEvent::Wheel(notches) => {
                self.workspace.pointer.wheel += notches;
            }
        }
    }

    fn fire(&mut self, transition: DragTransition) -> bool {
        let fired = self.fsm.fire(transition, &mut self.workspace);
        if fired {
            debug!("{:?} -> {:?}", transition, self.fsm.current());
        }
        fired
    }

    /// Run one frame after this frame's events
    pub fn update(&mut self, delta_seconds: f32) {
        let ws = &mut self.workspace;
        ws.refresh_focus();

        if ws.allow_input() {
            let selection = *ws.palette.selection();
            match self.fsm.current() {
                DragState::DraggingCanvasPaint => {
                    ws.canvas.drag(&selection, false);
                }
                DragState::DraggingCanvasErase => {
                    ws.canvas.drag(&selection, true);
                }
                DragState::DraggingPalette => {
                    ws.palette.drag();
                }
                DragState::Idle => {}
            }

            let motion = ws.pointer.motion;
            let wheel = ws.pointer.wheel;
            let panning = ws.pointer.pressed(PointerButton::Middle);
            let (speed, min_zoom) = (ws.preferences.wheel_speed, ws.preferences.min_zoom);
            let camera = match ws.pointer.pane {
                Some(Pane::Canvas) => Some(&mut ws.canvas.camera),
                Some(Pane::Palette) => ws.palette.active_camera_mut(),
                None => None,
            };
            if let Some(camera) = camera {
                if panning {
                    camera.pan_by(motion);
                }
                if wheel != 0.0 {
                    camera.zoom_by_wheel(wheel, delta_seconds, speed, min_zoom);
                }
            }
        }

        ws.pointer.end_frame();
    }

    pub fn set_brush(&mut self, kind: BrushKind) {
        let brush = &mut self.workspace.canvas.brush;
        if brush.kind != kind {
            brush.abort();
            brush.kind = kind;
        }
    }

    pub fn add_layer(&mut self) -> usize {
        self.workspace.canvas.create_layer()
    }

    /// Delete a layer, asking first unless confirmation is turned off
    pub fn request_delete_layer(&mut self, index: usize) -> LayerDeleteOutcome {
        let ws = &mut self.workspace;
        let store = ws.canvas.store();
        if store.len() < 2 || index >= store.len() || !ws.allow_input() {
            return LayerDeleteOutcome::Refused;
        }
        if ws.preferences.confirm_layer_delete && !ws.skip_layer_delete_confirmation {
            ws.pending_layer_delete = Some(index);
            return LayerDeleteOutcome::NeedsConfirmation;
        }
        ws.canvas.delete_layer(index);
        LayerDeleteOutcome::Deleted
    }

    /// Apply the pending layer delete
    pub fn confirm_delete_layer(&mut self, dont_ask_again: bool) -> bool {
        let ws = &mut self.workspace;
        let Some(index) = ws.pending_layer_delete.take() else {
            return false;
        };
        if dont_ask_again {
            ws.skip_layer_delete_confirmation = true;
        }
        ws.canvas.delete_layer(index).is_some()
    }

    pub fn pending_layer_delete(&self) -> Option<usize> {
        self.workspace.pending_layer_delete
    }

    /// Drop whichever confirmation is open
    pub fn cancel_pending(&mut self) -> bool {
        let layer = self.workspace.pending_layer_delete.take().is_some();
        let texture = self.workspace.textures.cancel();
        layer || texture
    }

    pub fn select_layer(&mut self, index: usize) -> bool {
        self.workspace.canvas.select_layer(index)
    }

    pub fn swap_layers(&mut self, a: usize, b: usize) -> bool {
        self.workspace.canvas.swap_layers(a, b)
    }

    pub fn move_selected_layer_up(&mut self) -> bool {
        self.workspace.canvas.move_selected_layer_up()
    }

    pub fn move_selected_layer_down(&mut self) -> bool {
        self.workspace.canvas.move_selected_layer_down()
    }

    pub fn toggle_layer_visibility(&mut self, index: usize) -> bool {
        self.workspace.canvas.toggle_layer_visibility(index)
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> bool {
        self.workspace.canvas.rename_layer(index, name)
    }

    pub fn add_texture(
        &mut self,
        provider: &dyn TextureProvider,
        path: impl AsRef<Path>,
    ) -> Result<i32, TextureError> {
        let ws = &mut self.workspace;
        ws.textures.add_texture(&mut ws.palette, provider, path)
    }

    pub fn request_replace_texture(
        &mut self,
        provider: &dyn TextureProvider,
        id: i32,
        path: impl AsRef<Path>,
    ) -> Result<ReplaceOutcome, TextureError> {
        if self.workspace.pending_layer_delete.is_some() {
            return Err(TextureError::ConfirmationPending);
        }
        let ws = &mut self.workspace;
        ws.textures
            .request_replace(&mut ws.palette, provider, id, path)
    }

    pub fn request_delete_texture(&mut self, id: i32) -> Result<(), TextureError> {
        if self.workspace.pending_layer_delete.is_some() {
            return Err(TextureError::ConfirmationPending);
        }
        let ws = &mut self.workspace;
        ws.textures.request_delete(&ws.palette, id)
    }

    /// Apply the pending texture replace or delete
    pub fn confirm_texture_change(&mut self) -> Option<AppliedTextureChange> {
        let ws = &mut self.workspace;
        ws.textures.confirm(&mut ws.palette, &mut ws.canvas)
    }

    pub fn set_active_texture(&mut self, id: i32) -> bool {
        self.workspace.palette.set_active_texture(id)
    }

    pub fn reset_canvas_view(&mut self) {
        self.workspace.canvas.reset_view();
    }

    pub fn reset_palette_view(&mut self) {
        self.workspace.palette.reset_view();
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot::capture(&self.workspace.canvas, &self.workspace.palette)
    }
}
