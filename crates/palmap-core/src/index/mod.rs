//! PositionIndex - palette slot to pixel coordinate mapping
//!
//! For each palette slot the index lists every coordinate of the
//! original raster whose pixel equals that slot's color exactly, in
//! row-major scan order.
//!
//! # Duplicate slots
//!
//! Every slot is matched independently. When two slots share a color
//! both receive the full coordinate list of that color; the lists
//! overlap instead of partitioning the pixels.
//!
//! # Strategies
//!
//! - Palettes without duplicates are indexed with a single pass over the
//!   raster through a color-to-slot map.
//! - Palettes with duplicates fall back to one full scan per slot
//!   ([`scan_slot`]), the same unit of work the
//!   [`IncrementalIndexBuilder`] performs per step.

mod incremental;

pub use incremental::{BuildState, IncrementalIndexBuilder, Step};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::palette::Palette;
use crate::raster::{Position, Raster};
use std::collections::HashMap;

/// One slot of a [`PositionIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// 1-based slot id
    pub id: usize,
    /// Slot color at build time
    pub color: Color,
    /// Matching coordinates, row-major
    pub positions: Vec<Position>,
}

/// Mapping from palette slot to the pixel coordinates it occupies.
///
/// Entries are kept sorted by ascending id. An index built from a
/// palette has ids `1..=len`; a decoded one may be sparse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionIndex {
    entries: Vec<IndexEntry>,
}

impl PositionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build the index of `palette` over `raster`.
    pub fn build(raster: &Raster, palette: &Palette) -> Self {
        if palette.has_duplicates() {
            log::debug!(
                "palette of {} has duplicate slots, indexing with per-slot scans",
                palette.len()
            );
            let entries = palette
                .iter()
                .enumerate()
                .map(|(i, &c)| IndexEntry {
                    id: Palette::id_of(i),
                    color: c,
                    positions: scan_slot(raster, c),
                })
                .collect();
            return Self { entries };
        }

        let slots: HashMap<Color, usize> = palette
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        let mut entries: Vec<IndexEntry> = palette
            .iter()
            .enumerate()
            .map(|(i, &c)| IndexEntry {
                id: Palette::id_of(i),
                color: c,
                positions: Vec::new(),
            })
            .collect();
        for (pos, c) in raster.iter_positions() {
            if let Some(&slot) = slots.get(&c) {
                entries[slot].positions.push(pos);
            }
        }
        Self { entries }
    }

    /// Assemble an index from entries in any order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for id 0 or a repeated id.
    pub fn from_entries(mut entries: Vec<IndexEntry>) -> Result<Self> {
        entries.sort_by_key(|e| e.id);
        for pair in entries.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(Error::format(format!("duplicate slot id {}", pair[0].id)));
            }
        }
        if entries.first().is_some_and(|e| e.id == 0) {
            return Err(Error::format("slot ids are 1-based, got 0"));
        }
        Ok(Self { entries })
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Look up a slot by 1-based id.
    pub fn get(&self, id: usize) -> Option<&IndexEntry> {
        // Built indexes are dense, so try the direct slot first.
        if let Some(e) = Palette::index_of_id(id).and_then(|i| self.entries.get(i))
            && e.id == id
        {
            return Some(e);
        }
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Coordinates of a slot, empty for an unknown id.
    pub fn positions(&self, id: usize) -> &[Position] {
        self.get(id)
            .map(|e| e.positions.as_slice())
            .unwrap_or_default()
    }

    /// Total coordinates over all slots, counting overlaps.
    pub fn total_positions(&self) -> usize {
        self.entries.iter().map(|e| e.positions.len()).sum()
    }

    /// Slot colors in id order.
    pub fn palette(&self) -> Palette {
        self.entries.iter().map(|e| e.color).collect()
    }

    /// Paint every slot's coordinates with its color.
    ///
    /// Coordinates outside `raster` are skipped and counted; the return
    /// value is the number skipped.
    pub fn paint(&self, raster: &mut Raster) -> usize {
        let mut skipped = 0;
        for entry in &self.entries {
            for p in &entry.positions {
                if raster.set(p.x, p.y, entry.color).is_err() {
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            log::warn!("skipped {skipped} index coordinates outside the raster");
        }
        skipped
    }
}

impl<'a> IntoIterator for &'a PositionIndex {
    type Item = &'a IndexEntry;
    type IntoIter = std::slice::Iter<'a, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Every coordinate whose pixel equals `color`, row-major.
pub fn scan_slot(raster: &Raster, color: Color) -> Vec<Position> {
    raster
        .iter_positions()
        .filter_map(|(p, c)| (c == color).then_some(p))
        .collect()
}

/// Replace-in-place palette merge used when importing a JSON index.
///
/// Each slot of `current` takes the imported color with the same id if
/// one exists and keeps its own color otherwise. Imported ids beyond the
/// resulting length are then appended in ascending id order. Returns the
/// merged palette and the number of slots that took an imported color.
pub fn merge_palette_from_index(current: &Palette, imported: &PositionIndex) -> (Palette, usize) {
    let mut merged = Palette::new();
    let mut mapped = 0;
    for (i, &c) in current.iter().enumerate() {
        match imported.get(Palette::id_of(i)) {
            Some(entry) => {
                merged.push(entry.color);
                mapped += 1;
            }
            None => {
                merged.push(c);
            }
        }
    }
    for entry in imported {
        if entry.id > merged.len() {
            merged.push(entry.color);
        }
    }
    (merged, mapped)
}
