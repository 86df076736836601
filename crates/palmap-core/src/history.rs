//! Undo/redo history of palette color edits
//!
//! Each record is a location (palette tab, slot) and the color that was
//! there before the edit. Both stacks are bounded; the oldest record is
//! dropped when a push would exceed the depth.

use crate::color::Color;
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Default undo/redo depth.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One recorded color at a palette location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    /// Palette tab index
    pub palette: usize,
    /// Slot index within the palette
    pub index: usize,
    /// Color at that location when the record was made
    pub color: Color,
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Edit>,
    redo: VecDeque<Edit>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            max_depth,
        }
    }

    /// Record the value about to be overwritten. Clears the redo stack.
    pub fn record(&mut self, edit: Edit) {
        push_bounded(&mut self.undo, edit, self.max_depth);
        self.redo.clear();
    }

    /// Pop the newest undo record.
    pub fn pop_undo(&mut self) -> Option<Edit> {
        self.undo.pop_back()
    }

    /// Pop the newest redo record.
    pub fn pop_redo(&mut self) -> Option<Edit> {
        self.redo.pop_back()
    }

    /// Push onto the redo stack without touching the undo stack.
    pub fn push_redo(&mut self, edit: Edit) {
        push_bounded(&mut self.redo, edit, self.max_depth);
    }

    /// Push onto the undo stack without clearing the redo stack.
    pub fn push_undo(&mut self, edit: Edit) {
        push_bounded(&mut self.undo, edit, self.max_depth);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Follow the removal of palette tab `palette`: its records are
    /// dropped and records of later tabs shift down by one.
    pub fn forget_palette(&mut self, palette: usize) {
        self.retarget(|edit| match edit.palette.cmp(&palette) {
            Ordering::Less => Some(edit),
            Ordering::Equal => None,
            Ordering::Greater => Some(Edit {
                palette: edit.palette - 1,
                ..edit
            }),
        });
    }

    /// Follow the removal of slot `index` from tab `palette`.
    pub fn forget_slot(&mut self, palette: usize, index: usize) {
        self.retarget(|edit| {
            if edit.palette != palette {
                return Some(edit);
            }
            match edit.index.cmp(&index) {
                Ordering::Less => Some(edit),
                Ordering::Equal => None,
                Ordering::Greater => Some(Edit {
                    index: edit.index - 1,
                    ..edit
                }),
            }
        });
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn retarget(&mut self, mut f: impl FnMut(Edit) -> Option<Edit>) {
        for stack in [&mut self.undo, &mut self.redo] {
            *stack = stack.drain(..).filter_map(&mut f).collect();
        }
    }
}

fn push_bounded(stack: &mut VecDeque<Edit>, edit: Edit, max_depth: usize) {
    if max_depth == 0 {
        return;
    }
    stack.push_back(edit);
    while stack.len() > max_depth {
        stack.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(index: usize) -> Edit {
        Edit {
            palette: 0,
            index,
            color: Color::BLACK,
        }
    }

    #[test]
    fn test_record_clears_redo() {
        let mut h = History::default();
        h.record(edit(0));
        let e = h.pop_undo().unwrap();
        h.push_redo(e);
        assert!(h.can_redo());
        h.record(edit(1));
        assert!(!h.can_redo());
    }

    #[test]
    fn test_depth_drops_oldest() {
        let mut h = History::new(2);
        h.record(edit(0));
        h.record(edit(1));
        h.record(edit(2));
        assert_eq!(h.undo_len(), 2);
        assert_eq!(h.pop_undo().unwrap().index, 2);
        assert_eq!(h.pop_undo().unwrap().index, 1);
        assert!(h.pop_undo().is_none());
    }

    #[test]
    fn test_zero_depth_records_nothing() {
        let mut h = History::new(0);
        h.record(edit(0));
        assert!(!h.can_undo());
    }

    #[test]
    fn test_forget_palette_shifts_later_tabs() {
        let mut h = History::default();
        for palette in 0..3 {
            h.record(Edit {
                palette,
                index: 1,
                color: Color::WHITE,
            });
        }
        h.forget_palette(1);
        assert_eq!(h.undo_len(), 2);
        assert_eq!(h.pop_undo().map(|e| e.palette), Some(1));
        assert_eq!(h.pop_undo().map(|e| e.palette), Some(0));
    }

    #[test]
    fn test_forget_slot_shifts_later_slots() {
        let mut h = History::default();
        h.record(edit(0));
        h.record(edit(1));
        h.record(edit(2));
        h.record(Edit {
            palette: 1,
            ..edit(3)
        });
        h.push_redo(edit(3));

        h.forget_slot(0, 1);
        assert_eq!(h.undo_len(), 3);
        let at = |e: Option<Edit>| e.map(|e| (e.palette, e.index));
        assert_eq!(at(h.pop_undo()), Some((1, 3)));
        assert_eq!(at(h.pop_undo()), Some((0, 1)));
        assert_eq!(at(h.pop_undo()), Some((0, 0)));
        assert_eq!(at(h.pop_redo()), Some((0, 2)));
    }
}
