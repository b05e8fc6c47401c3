//! Brush engine - single-stamp and rectangle-drag painting
//!
//! The basic brush writes straight into the target layer on every call.
//! The rectangle brush paints into a full-size preview grid while the drag is
//! in progress and merges the dragged rectangle into the layer on release.
//!
//! The rectangle brush tiles the selected palette block across the dragged
//! area, anchored at the drag origin. Offsets are walked away from the origin
//! in the direction of travel; a reversed axis is shifted by one so the block
//! ends, rather than starts, at the origin cell.

use serde::{Deserialize, Serialize};
use tilemap_core::{wrap, LayerStore, Tile, TileGrid, TileId, TileSelection};

/// Which painting algorithm is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushKind {
    /// Stamp the selection's top-left tile at the focused cell
    #[default]
    Basic,
    /// Drag out a rectangle filled with the tiled selection
    Rectangle,
}

impl BrushKind {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            BrushKind::Basic => "Basic",
            BrushKind::Rectangle => "Rectangle",
        }
    }
}

/// Transient state of an in-progress rectangle drag
#[derive(Debug, Clone)]
pub struct DragSession {
    pub origin: TileId,
    pub top_left: TileId,
    pub bottom_right: TileId,
    /// Layer locked in at drag start
    pub layer: usize,
    /// Erase instead of paint
    pub clear: bool,
    /// Speculative edits, same size as the map
    pub preview: TileGrid,
}

impl DragSession {
    /// Whether a cell lies in the currently dragged rectangle
    pub fn covers(&self, x: i32, y: i32) -> bool {
        self.top_left.x <= x
            && x <= self.bottom_right.x
            && self.top_left.y <= y
            && y <= self.bottom_right.y
    }

    /// Number of cells in the dragged rectangle
    pub fn cell_count(&self) -> usize {
        let w = (self.bottom_right.x - self.top_left.x + 1) as usize;
        let h = (self.bottom_right.y - self.top_left.y + 1) as usize;
        w * h
    }
}

/// How a drag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No rectangle drag was active
    NoDrag,
    /// The preview was merged; carries the number of cells written
    Committed(usize),
    /// The caller cancelled; the layer is untouched
    Cancelled,
    /// The target layer vanished or was hidden; the preview was dropped
    Discarded,
}

/// Whether the focused cell is inside the map
pub fn is_valid_hover(store: &LayerStore, focused: TileId) -> bool {
    store.contains(focused.x, focused.y)
}

/// Whether a brush sized by `selection` fits the map at `focused`.
///
/// Requires a non-empty selection and the whole footprint, not just the
/// hovered cell, inside the map.
pub fn is_valid_focus(store: &LayerStore, focused: TileId, selection: &TileSelection) -> bool {
    if !selection.is_valid() || !is_valid_hover(store, focused) {
        return false;
    }
    let (width, height) = (store.width() as i64, store.height() as i64);
    (focused.x as i64 + selection.width() as i64 - 1) < width
        && (focused.y as i64 + selection.height() as i64 - 1) < height
}

/// Inclusive corners of the brush outline at `focused`, if it fits
pub fn focus_footprint(
    store: &LayerStore,
    focused: TileId,
    selection: &TileSelection,
) -> Option<(TileId, TileId)> {
    if !is_valid_focus(store, focused, selection) {
        return None;
    }
    Some((
        focused,
        TileId::new(
            focused.x + selection.width() - 1,
            focused.y + selection.height() - 1,
        ),
    ))
}

/// Paints selections into a `LayerStore`
#[derive(Debug, Clone, Default)]
pub struct BrushEngine {
    pub kind: BrushKind,
    drag: Option<DragSession>,
}

impl BrushEngine {
    pub fn new(kind: BrushKind) -> Self {
        Self { kind, drag: None }
    }

    /// The active rectangle drag, if any
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Stamp the selection's top-left tile (or an empty tile) at `focused`
    pub fn place(
        &self,
        store: &mut LayerStore,
        layer: usize,
        focused: TileId,
        selection: &TileSelection,
        clear: bool,
    ) -> bool {
        if !is_valid_focus(store, focused, selection) {
            return false;
        }
        let tile = if clear {
            Tile::EMPTY
        } else {
            selection.top_left
        };
        store.set_tile(layer, focused.x, focused.y, tile)
    }

    /// Begin a drag. Only the rectangle brush keeps drag state.
    ///
    /// Returns true when a rectangle session was opened.
    pub fn start_drag(
        &mut self,
        store: &LayerStore,
        layer: usize,
        focused: TileId,
        selection: &TileSelection,
        clear: bool,
    ) -> bool {
        if !is_valid_focus(store, focused, selection) {
            return false;
        }
        if !store.is_layer_visible(layer) || self.drag.is_some() {
            return false;
        }
        if self.kind != BrushKind::Rectangle {
            return false;
        }

        self.drag = Some(DragSession {
            origin: focused,
            top_left: focused,
            bottom_right: focused,
            layer,
            clear,
            preview: TileGrid::new(store.width(), store.height()),
        });
        true
    }

    /// One frame of drag input.
    ///
    /// The basic brush stamps immediately (erasing when `clear_if_basic`);
    /// the rectangle brush repaints its preview. Returns whether anything
    /// was written.
    pub fn drag(
        &mut self,
        store: &mut LayerStore,
        layer: usize,
        focused: TileId,
        selection: &TileSelection,
        clear_if_basic: bool,
    ) -> bool {
        if !is_valid_focus(store, focused, selection) {
            return false;
        }
        match self.kind {
            BrushKind::Basic => {
                if !store.is_layer_visible(layer) {
                    return false;
                }
                self.place(store, layer, focused, selection, clear_if_basic)
            }
            BrushKind::Rectangle => {
                let Some(session) = self.drag.as_mut() else {
                    return false;
                };
                if !store.is_layer_visible(session.layer) {
                    return false;
                }
                paint_rectangle(session, focused, selection);
                true
            }
        }
    }

    /// Finish the drag, merging the preview unless `cancelled`.
    ///
    /// The drag slot is always released.
    pub fn end_drag(&mut self, store: &mut LayerStore, cancelled: bool) -> DragOutcome {
        let Some(session) = self.drag.take() else {
            return DragOutcome::NoDrag;
        };
        if cancelled {
            return DragOutcome::Cancelled;
        }
        let Some(layer) = store.layer_mut(session.layer) else {
            return DragOutcome::Discarded;
        };
        if !layer.visible {
            return DragOutcome::Discarded;
        }
        layer
            .grid
            .copy_region_from(&session.preview, session.top_left, session.bottom_right);
        DragOutcome::Committed(session.cell_count())
    }

    /// Drop any drag without touching the store
    pub fn abort(&mut self) {
        self.drag = None;
    }
}

/// Repaint the preview for the rectangle between the origin and `focused`
fn paint_rectangle(session: &mut DragSession, focused: TileId, selection: &TileSelection) {
    let origin = session.origin;
    session.top_left = origin.min(focused);
    session.bottom_right = origin.max(focused);

    let span_x = session.bottom_right.x - session.top_left.x;
    let span_y = session.bottom_right.y - session.top_left.y;

    // Direction of travel and the phase shift for reversed axes
    let (step_x, phase_x) = if focused.x >= origin.x { (1, 0) } else { (-1, -1) };
    let (step_y, phase_y) = if focused.y >= origin.y { (1, 0) } else { (-1, -1) };

    let (sel_w, sel_h) = (selection.width(), selection.height());

    // 0..=span always runs at least once, so a 1x1 drag paints its origin
    for k_y in 0..=span_y {
        let dy = k_y * step_y;
        for k_x in 0..=span_x {
            let dx = k_x * step_x;
            let tile = if session.clear {
                Tile::EMPTY
            } else {
                selection.tile_at(wrap(dx + phase_x, sel_w), wrap(dy + phase_y, sel_h))
            };
            session.preview.set(origin.x + dx, origin.y + dy, tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x0: i32, y0: i32, x1: i32, y1: i32) -> TileSelection {
        TileSelection::spanning(0, TileId::new(x0, y0), TileId::new(x1, y1))
    }

    fn rect_drag(
        store: &mut LayerStore,
        selection: &TileSelection,
        from: TileId,
        to: TileId,
    ) -> DragOutcome {
        let mut brush = BrushEngine::new(BrushKind::Rectangle);
        assert!(brush.start_drag(store, 0, from, selection, false));
        brush.drag(store, 0, to, selection, false);
        brush.end_drag(store, false)
    }

    fn changed_cells(a: &LayerStore, b: &LayerStore) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        for y in 0..a.height() as i32 {
            for x in 0..a.width() as i32 {
                if a.tile(0, x, y) != b.tile(0, x, y) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    #[test]
    fn test_valid_focus_rejects_overhanging_footprint() {
        let store = LayerStore::new(10, 8);
        for w in 1..=4 {
            for h in 1..=4 {
                let sel = block(0, 0, w - 1, h - 1);
                for x in -1..=11 {
                    for y in -1..=9 {
                        let ok = is_valid_focus(&store, TileId::new(x, y), &sel);
                        let expected = x >= 0 && y >= 0 && x + w - 1 < 10 && y + h - 1 < 8;
                        assert_eq!(ok, expected, "focus ({x},{y}) sel {w}x{h}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_valid_focus_requires_selection() {
        let store = LayerStore::new(4, 4);
        assert!(!is_valid_focus(&store, TileId::new(0, 0), &TileSelection::NONE));
    }

    #[test]
    fn test_basic_place_and_erase() {
        let mut store = LayerStore::new(4, 4);
        let brush = BrushEngine::new(BrushKind::Basic);
        let sel = block(2, 3, 2, 3);

        assert!(brush.place(&mut store, 0, TileId::new(1, 1), &sel, false));
        assert_eq!(store.tile(0, 1, 1), Some(sel.top_left));

        assert!(brush.place(&mut store, 0, TileId::new(1, 1), &sel, true));
        assert_eq!(store.tile(0, 1, 1), Some(Tile::EMPTY));
    }

    #[test]
    fn test_erase_outside_grid_is_noop() {
        let mut store = LayerStore::new(4, 4);
        store.set_tile(0, 0, 0, Tile::new(0, TileId::new(0, 0)));
        let before = store.clone();
        let mut brush = BrushEngine::new(BrushKind::Basic);
        let sel = block(0, 0, 0, 0);

        assert!(!brush.place(&mut store, 0, TileId::new(-1, 0), &sel, true));
        assert!(!brush.drag(&mut store, 0, TileId::new(-1, 0), &sel, true));
        assert_eq!(store, before);
    }

    #[test]
    fn test_basic_drag_stamps_each_tick() {
        let mut store = LayerStore::new(4, 4);
        let mut brush = BrushEngine::new(BrushKind::Basic);
        let sel = block(0, 0, 0, 0);

        assert!(!brush.start_drag(&store, 0, TileId::new(0, 0), &sel, false));
        assert!(brush.drag(&mut store, 0, TileId::new(0, 0), &sel, false));
        assert!(brush.drag(&mut store, 0, TileId::new(3, 3), &sel, false));
        assert_eq!(store.layer(0).map(|l| l.tile_count()), Some(2));
        assert_eq!(brush.end_drag(&mut store, false), DragOutcome::NoDrag);
    }

    #[test]
    fn test_zero_extent_rectangle_matches_basic_stamp() {
        let sel = block(1, 2, 2, 3);
        let at = TileId::new(4, 4);

        let mut rect_store = LayerStore::new(10, 8);
        let original = rect_store.clone();
        assert_eq!(rect_drag(&mut rect_store, &sel, at, at), DragOutcome::Committed(1));
        assert_eq!(changed_cells(&original, &rect_store), vec![(4, 4)]);

        let mut basic_store = LayerStore::new(10, 8);
        BrushEngine::new(BrushKind::Basic).place(&mut basic_store, 0, at, &sel, false);
        assert_eq!(rect_store, basic_store);
    }

    #[test]
    fn test_rectangle_tiles_selection_from_origin() {
        let mut store = LayerStore::new(10, 8);
        let sel = block(0, 0, 1, 1);

        let outcome = rect_drag(&mut store, &sel, TileId::new(2, 2), TileId::new(5, 5));
        assert_eq!(outcome, DragOutcome::Committed(16));

        for y in 2..=5 {
            for x in 2..=5 {
                let expected = Tile::new(0, TileId::new((x - 2) % 2, (y - 2) % 2));
                assert_eq!(store.tile(0, x, y), Some(expected), "cell ({x},{y})");
            }
        }
        assert_eq!(store.layer(0).map(|l| l.tile_count()), Some(16));
    }

    #[test]
    fn test_rectangle_period_equals_selection_width() {
        let sel = block(3, 0, 5, 0);
        let sel_w = sel.width();
        let width = 9;

        for (from, to) in [(0, width - 1), (width - 1, 0)] {
            let mut store = LayerStore::new(width as u32, 1);
            rect_drag(&mut store, &sel, TileId::new(from, 0), TileId::new(to, 0));
            let step = if to >= from { 1 } else { -1 };
            for k in 0..(width - sel_w) {
                let a = store.tile(0, from + k * step, 0).map(|t| t.id_on_texture.x);
                let b = store.tile(0, from + (k + sel_w) * step, 0).map(|t| t.id_on_texture.x);
                assert_eq!(a, b, "offset {k} drag {from}->{to}");
            }
        }
    }

    #[test]
    fn test_reversed_drag_ends_block_at_origin() {
        let mut store = LayerStore::new(6, 1);
        let sel = block(0, 0, 1, 0);
        rect_drag(&mut store, &sel, TileId::new(5, 0), TileId::new(2, 0));

        let xs: Vec<_> = (2..=5)
            .map(|x| store.tile(0, x, 0).map(|t| t.id_on_texture.x))
            .collect();
        assert_eq!(xs, vec![Some(0), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn test_cancelled_drag_leaves_layer_untouched() {
        let mut store = LayerStore::new(6, 6);
        let before = store.clone();
        let sel = block(0, 0, 0, 0);
        let mut brush = BrushEngine::new(BrushKind::Rectangle);

        brush.start_drag(&store, 0, TileId::new(0, 0), &sel, false);
        brush.drag(&mut store, 0, TileId::new(3, 3), &sel, false);
        assert_eq!(store, before);
        assert_eq!(brush.end_drag(&mut store, true), DragOutcome::Cancelled);
        assert_eq!(store, before);
        assert!(!brush.is_dragging());
    }

    #[test]
    fn test_clear_mode_rectangle_erases() {
        let mut store = LayerStore::new(4, 4);
        let sel = block(0, 0, 0, 0);
        for y in 0..4 {
            for x in 0..4 {
                store.set_tile(0, x, y, sel.top_left);
            }
        }
        let mut brush = BrushEngine::new(BrushKind::Rectangle);
        brush.start_drag(&store, 0, TileId::new(1, 1), &sel, true);
        brush.drag(&mut store, 0, TileId::new(2, 2), &sel, false);
        assert_eq!(brush.end_drag(&mut store, false), DragOutcome::Committed(4));
        assert_eq!(store.layer(0).map(|l| l.tile_count()), Some(12));
        assert_eq!(store.tile(0, 1, 1), Some(Tile::EMPTY));
    }

    #[test]
    fn test_shrinking_drag_commits_final_rectangle_only() {
        let mut store = LayerStore::new(8, 8);
        let sel = block(0, 0, 0, 0);
        let mut brush = BrushEngine::new(BrushKind::Rectangle);
        brush.start_drag(&store, 0, TileId::new(0, 0), &sel, false);
        brush.drag(&mut store, 0, TileId::new(5, 5), &sel, false);
        brush.drag(&mut store, 0, TileId::new(1, 1), &sel, false);
        assert_eq!(brush.end_drag(&mut store, false), DragOutcome::Committed(4));
        assert_eq!(store.layer(0).map(|l| l.tile_count()), Some(4));
    }

    #[test]
    fn test_drag_slot_is_exclusive() {
        let store = LayerStore::new(4, 4);
        let sel = block(0, 0, 0, 0);
        let mut brush = BrushEngine::new(BrushKind::Rectangle);
        assert!(brush.start_drag(&store, 0, TileId::new(0, 0), &sel, false));
        assert!(!brush.start_drag(&store, 0, TileId::new(1, 1), &sel, false));
        assert_eq!(brush.drag_session().map(|s| s.origin), Some(TileId::new(0, 0)));
    }

    #[test]
    fn test_hidden_layer_blocks_painting() {
        let mut store = LayerStore::new(4, 4);
        store.set_layer_visible(0, false);
        let sel = block(0, 0, 0, 0);

        let mut basic = BrushEngine::new(BrushKind::Basic);
        assert!(!basic.drag(&mut store, 0, TileId::new(0, 0), &sel, false));

        let mut rect = BrushEngine::new(BrushKind::Rectangle);
        assert!(!rect.start_drag(&store, 0, TileId::new(0, 0), &sel, false));
    }

    #[test]
    fn test_layer_hidden_mid_drag_is_discarded() {
        let mut store = LayerStore::new(4, 4);
        let sel = block(0, 0, 0, 0);
        let mut brush = BrushEngine::new(BrushKind::Rectangle);
        brush.start_drag(&store, 0, TileId::new(0, 0), &sel, false);
        brush.drag(&mut store, 0, TileId::new(2, 2), &sel, false);
        store.set_layer_visible(0, false);

        assert_eq!(brush.end_drag(&mut store, false), DragOutcome::Discarded);
        assert!(!brush.is_dragging());
        assert_eq!(store.layer(0).map(|l| l.tile_count()), Some(0));
    }

    #[test]
    fn test_focus_footprint() {
        let store = LayerStore::new(10, 8);
        let sel = block(0, 0, 2, 1);
        assert_eq!(
            focus_footprint(&store, TileId::new(1, 1), &sel),
            Some((TileId::new(1, 1), TileId::new(3, 2)))
        );
        assert_eq!(focus_footprint(&store, TileId::new(8, 1), &sel), None);
    }
}
