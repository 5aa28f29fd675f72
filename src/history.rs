use std::collections::VecDeque;

use crate::surface::{RasterSurface, Snapshot};

pub const HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl HistoryAction {
    const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "undo stack empty",
            Self::Redo => "redo stack empty",
        }
    }
}

/// Snapshot sequence that drops its oldest entry once full.
#[derive(Debug, Clone)]
struct BoundedStack {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl BoundedStack {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns true when the push evicted the oldest snapshot.
    fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front().is_some()
        } else {
            false
        };
        self.entries.push_back(snapshot);
        evicted
    }

    fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Bounded undo/redo history of full-surface snapshots.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo: BoundedStack,
    redo: BoundedStack,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// `capacity` is clamped to `1..=HISTORY_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, HISTORY_CAPACITY);
        Self {
            undo: BoundedStack::new(capacity),
            redo: BoundedStack::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.undo.capacity
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_len() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.redo_len() > 0
    }

    /// Snapshots the surface ahead of a mutation. A new edit forks the
    /// timeline, so the redo sequence is dropped.
    pub fn record_before_edit(&mut self, surface: &RasterSurface) {
        if self.undo.push(surface.snapshot()) {
            tracing::debug!(capacity = self.capacity(), "undo history full; evicted oldest snapshot");
        }
        self.redo.clear();
    }

    /// Returns false (and leaves the surface alone) when there is nothing to undo.
    pub fn undo(&mut self, surface: &mut RasterSurface) -> bool {
        self.step(HistoryAction::Undo, surface)
    }

    pub fn redo(&mut self, surface: &mut RasterSurface) -> bool {
        self.step(HistoryAction::Redo, surface)
    }

    fn step(&mut self, action: HistoryAction, surface: &mut RasterSurface) -> bool {
        let (source, target) = match action {
            HistoryAction::Undo => (&mut self.undo, &mut self.redo),
            HistoryAction::Redo => (&mut self.redo, &mut self.undo),
        };

        let Some(snapshot) = source.pop() else {
            tracing::debug!("{}", action.empty_message());
            return false;
        };
        target.push(surface.snapshot());
        surface.restore(snapshot);
        tracing::debug!(
            undo = self.undo.len(),
            redo = self.redo.len(),
            "{}",
            action.applied_message()
        );
        true
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Point};

    fn edit(history: &mut HistoryManager, surface: &mut RasterSurface, step: i32) {
        history.record_before_edit(surface);
        surface.draw_segment(
            Point::new(step % 40, 0),
            Point::new(step % 40, 39),
            Color::new((step * 7 % 255) as u8, 0, 0),
            1,
        );
    }

    #[test]
    fn undo_all_edits_restores_blank_buffer() {
        for edits in [1, 5, 30] {
            let mut surface = RasterSurface::create(40, 40);
            let blank = surface.snapshot();
            let mut history = HistoryManager::new();
            for step in 0..edits {
                edit(&mut history, &mut surface, step);
            }

            for _ in 0..edits {
                assert!(history.undo(&mut surface));
            }
            assert_eq!(surface.pixels(), blank.pixels(), "{edits} edits");
            assert!(!history.can_undo());
        }
    }

    #[test]
    fn undo_then_redo_restores_pre_undo_buffer() {
        let mut surface = RasterSurface::create(40, 40);
        let mut history = HistoryManager::new();
        edit(&mut history, &mut surface, 3);
        let edited = surface.snapshot();

        assert!(history.undo(&mut surface));
        assert_ne!(surface.pixels(), edited.pixels());
        assert!(history.redo(&mut surface));
        assert_eq!(surface.pixels(), edited.pixels());
    }

    #[test]
    fn undo_depth_never_exceeds_capacity_and_evicts_oldest() {
        let mut surface = RasterSurface::create(40, 40);
        let mut history = HistoryManager::new();
        edit(&mut history, &mut surface, 0);
        let after_first = surface.snapshot();
        for step in 1..=HISTORY_CAPACITY as i32 {
            edit(&mut history, &mut surface, step);
            assert!(history.undo_len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.undo_len(), HISTORY_CAPACITY);

        while history.undo(&mut surface) {}
        // The blank snapshot was evicted; the oldest survivor is after edit one.
        assert_eq!(surface.pixels(), after_first.pixels());
    }

    #[test]
    fn redo_depth_is_bounded_too() {
        let mut surface = RasterSurface::create(40, 40);
        let mut history = HistoryManager::with_capacity(3);
        for step in 0..3 {
            edit(&mut history, &mut surface, step);
        }
        while history.undo(&mut surface) {}
        assert_eq!(history.redo_len(), 3);
        while history.redo(&mut surface) {}
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn requested_capacity_is_kept_within_bounds() {
        assert_eq!(HistoryManager::with_capacity(100).capacity(), HISTORY_CAPACITY);
        assert_eq!(HistoryManager::with_capacity(0).capacity(), 1);

        let mut surface = RasterSurface::create(40, 40);
        let mut history = HistoryManager::with_capacity(0);
        edit(&mut history, &mut surface, 1);
        assert!(history.undo(&mut surface));
    }

    #[test]
    fn new_edit_after_undo_clears_redo() {
        let mut surface = RasterSurface::create(40, 40);
        let mut history = HistoryManager::new();
        edit(&mut history, &mut surface, 1);
        edit(&mut history, &mut surface, 2);
        history.undo(&mut surface);
        assert!(history.can_redo());

        edit(&mut history, &mut surface, 3);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut surface));
    }

    #[test]
    fn undo_and_redo_on_empty_history_are_no_ops() {
        let mut surface = RasterSurface::create(10, 10);
        let before = surface.snapshot();
        let mut history = HistoryManager::new();
        assert!(!history.undo(&mut surface));
        assert!(!history.redo(&mut surface));
        assert_eq!(surface.pixels(), before.pixels());
        assert_eq!(history.redo_len(), 0);
    }
}
