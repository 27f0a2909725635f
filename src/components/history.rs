//! Bounded undo/redo history of full-state snapshots.
//!
//! Every completed state-mutating action records a deep copy of the
//! layers, the clipboard and the selection list.  The ring holds at most
//! 20 entries; exceeding the cap evicts the oldest (FIFO).
//!
//! Recording always appends at the tail, regardless of where the current
//! index sits: an undo followed by a new action does NOT truncate the
//! previously-redoable entries — they stay buried before the new tail.
//! That append-only behavior is part of the contract and is tested
//! explicitly rather than silently replaced with conventional
//! truncate-on-push semantics.

use std::collections::VecDeque;

use image::RgbaImage;

use crate::canvas::{CanvasState, Layer};

/// Maximum number of retained snapshots.
pub const MAX_HISTORY: usize = 20;

/// Deep copy of one layer.
#[derive(Clone)]
pub struct LayerSnapshot {
    pub name: String,
    pub enabled: bool,
    pub pixels: RgbaImage,
}

/// Immutable deep copy of everything undo must be able to restore.
#[derive(Clone)]
pub struct CanvasSnapshot {
    pub layers: Vec<LayerSnapshot>,
    pub active_layer_index: usize,
    pub clipboard_image: RgbaImage,
    pub clipboard_pixels: Vec<(u32, u32)>,
    pub clipboard_offset: (i32, i32),
    pub selection_pixels: Vec<(u32, u32)>,
}

impl CanvasSnapshot {
    /// Capture the current canvas state.
    pub fn capture(state: &CanvasState) -> Self {
        Self {
            layers: state
                .layers
                .iter()
                .map(|l| LayerSnapshot {
                    name: l.name.clone(),
                    enabled: l.enabled,
                    pixels: l.pixels.clone(),
                })
                .collect(),
            active_layer_index: state.active_layer_index,
            clipboard_image: state.clipboard.image().clone(),
            clipboard_pixels: state.clipboard.pixel_list().to_vec(),
            clipboard_offset: state.clipboard.drag_offset(),
            selection_pixels: state.selection.pixel_list().to_vec(),
        }
    }

    /// Restore this snapshot into `state`.
    pub fn restore_into(&self, state: &mut CanvasState) {
        state.layers = self
            .layers
            .iter()
            .map(|s| Layer {
                name: s.name.clone(),
                enabled: s.enabled,
                pixels: s.pixels.clone(),
            })
            .collect();
        state.active_layer_index = self.active_layer_index;
        state.revalidate_active_index();
        state.clipboard.restore(
            self.clipboard_image.clone(),
            self.clipboard_pixels.clone(),
            self.clipboard_offset,
        );
        state.selection.clear();
        state.selection.add_pixels(&self.selection_pixels);
    }
}

/// Bounded ring of snapshots plus the current index.
/// Invariant: `0 <= current < snapshots.len()` whenever non-empty.
pub struct HistorySnapshotManager {
    snapshots: VecDeque<CanvasSnapshot>,
    current: usize,
}

impl Default for HistorySnapshotManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorySnapshotManager {
    pub fn new() -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.current < self.snapshots.len() - 1
    }

    /// Append a snapshot at the tail and move the current index onto it.
    /// Evicts the oldest entry past the cap.
    pub fn record(&mut self, snapshot: CanvasSnapshot) {
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > MAX_HISTORY {
            self.snapshots.pop_front();
        }
        self.current = self.snapshots.len() - 1;
    }

    /// Step back one snapshot, returning the one to restore.
    pub fn undo(&mut self) -> Option<&CanvasSnapshot> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        self.snapshots.get(self.current)
    }

    /// Step forward one snapshot, returning the one to restore.
    pub fn redo(&mut self) -> Option<&CanvasSnapshot> {
        if self.snapshots.is_empty() || self.current + 1 >= self.snapshots.len() {
            return None;
        }
        self.current += 1;
        self.snapshots.get(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn snapshot_with_marker(marker: u8) -> CanvasSnapshot {
        let mut state = CanvasState::new(2, 2);
        state.layers[0]
            .pixels
            .put_pixel(0, 0, Rgba([marker, 0, 0, 255]));
        CanvasSnapshot::capture(&state)
    }

    fn marker(snapshot: &CanvasSnapshot) -> u8 {
        snapshot.layers[0].pixels.get_pixel(0, 0).0[0]
    }

    #[test]
    fn undo_redo_walk() {
        let mut history = HistorySnapshotManager::new();
        for i in 0..3 {
            history.record(snapshot_with_marker(i));
        }
        assert_eq!(history.current_index(), 2);
        assert_eq!(marker(history.undo().unwrap()), 1);
        assert_eq!(marker(history.undo().unwrap()), 0);
        assert!(history.undo().is_none());
        assert_eq!(marker(history.redo().unwrap()), 1);
        assert_eq!(marker(history.redo().unwrap()), 2);
        assert!(history.redo().is_none());
    }

    #[test]
    fn n_records_n_undos_n_redos_round_trip() {
        let mut history = HistorySnapshotManager::new();
        history.record(snapshot_with_marker(0));
        for i in 1..=5u8 {
            history.record(snapshot_with_marker(i));
        }
        for _ in 0..5 {
            assert!(history.undo().is_some());
        }
        let mut last = 0;
        for _ in 0..5 {
            last = marker(history.redo().unwrap());
        }
        assert_eq!(last, 5);
        assert_eq!(history.current_index(), history.len() - 1);
    }

    #[test]
    fn cap_evicts_oldest_fifo() {
        let mut history = HistorySnapshotManager::new();
        for i in 0..=(MAX_HISTORY as u8) {
            // 21 records
            history.record(snapshot_with_marker(i));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        // Index still addresses the newest entry...
        assert_eq!(history.current_index(), MAX_HISTORY - 1);
        // ...and the oldest surviving snapshot is the second ever recorded.
        while history.can_undo() {
            history.undo();
        }
        assert_eq!(marker(&history.snapshots[history.current]), 1);
    }

    #[test]
    fn record_after_undo_appends_without_truncating() {
        // The documented append-only behavior: undoing and then recording
        // keeps the old tail buried instead of discarding it.
        let mut history = HistorySnapshotManager::new();
        for i in 0..3 {
            history.record(snapshot_with_marker(i));
        }
        history.undo();
        history.undo(); // back at marker 0
        history.record(snapshot_with_marker(9));
        assert_eq!(history.len(), 4);
        assert_eq!(history.current_index(), 3);
        // Walking back passes through the buried entries 2 and 1.
        assert_eq!(marker(history.undo().unwrap()), 2);
        assert_eq!(marker(history.undo().unwrap()), 1);
    }

    #[test]
    fn capture_restore_round_trip() {
        let mut state = CanvasState::new(3, 3);
        state.add_layer("Ink");
        state.layers[1].pixels.put_pixel(1, 1, Rgba([9, 9, 9, 255]));
        state.selection.add_pixel(2, 2);
        let snapshot = CanvasSnapshot::capture(&state);

        state.delete_layer(1);
        state.selection.clear();
        snapshot.restore_into(&mut state);

        assert_eq!(state.layers.len(), 2);
        assert_eq!(state.layers[1].name, "Ink");
        assert_eq!(*state.layers[1].pixels.get_pixel(1, 1), Rgba([9, 9, 9, 255]));
        assert!(state.selection.is_selected(2, 2));
        assert_eq!(state.active_layer_index, 1);
    }
}
