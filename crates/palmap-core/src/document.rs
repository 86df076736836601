//! Document - one open image and its palette editing session
//!
//! A document owns the original raster (never modified after open), the
//! working raster shown to the user, the palette extracted from the
//! original, and a list of editable palette tabs with one active tab.
//! The working raster is always the original with the original palette
//! remapped onto the active tab.
//!
//! Position indexes are built over the original raster against the
//! active palette and memoized in a [`ResultCache`]. Every mutation
//! re-applies the active palette and invalidates the cache.

use crate::EngineConfig;
use crate::apply::apply_palette;
use crate::cache::{Fingerprint, ResultCache};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::history::{Edit, History};
use crate::index::{IncrementalIndexBuilder, PositionIndex, merge_palette_from_index};
use crate::palette::Palette;
use crate::pmap::PmapDocument;
use crate::raster::Raster;

/// Summary of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInfo {
    pub width: u32,
    pub height: u32,
    /// Size of the RGBA buffer in bytes
    pub byte_size: usize,
    /// Slots in the active palette
    pub palette_len: usize,
    /// Number of palette tabs
    pub palette_count: usize,
}

/// Editing session over one raster.
#[derive(Debug)]
pub struct Document {
    original: Raster,
    original_digest: u64,
    working: Raster,
    original_palette: Palette,
    palettes: Vec<Palette>,
    active: usize,
    history: History,
    cache: ResultCache,
    config: EngineConfig,
}

impl Document {
    /// Open a raster, extracting its palette.
    pub fn open(raster: Raster, config: EngineConfig) -> Self {
        let palette = Palette::extract(&raster);
        Self::open_with_palette(raster, palette, config)
    }

    /// Open a raster with a known palette, e.g. one restored from an
    /// embedded PMAP chunk.
    ///
    /// The palette becomes both the remapping basis and the only tab.
    pub fn open_with_palette(raster: Raster, palette: Palette, config: EngineConfig) -> Self {
        log::info!(
            "opened {}x{} document with {} colors",
            raster.width(),
            raster.height(),
            palette.len()
        );
        Self {
            original_digest: raster.digest(),
            working: raster.clone(),
            original: raster,
            original_palette: palette.clone(),
            palettes: vec![palette],
            active: 0,
            history: History::new(config.max_history),
            cache: ResultCache::new(),
            config,
        }
    }

    pub fn original(&self) -> &Raster {
        &self.original
    }

    /// Original raster with the active palette applied.
    pub fn working(&self) -> &Raster {
        &self.working
    }

    /// Palette extracted at open; the source side of every remap.
    pub fn original_palette(&self) -> &Palette {
        &self.original_palette
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_palette(&self) -> &Palette {
        &self.palettes[self.active]
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace one slot of the active palette, recording the old color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for a bad slot; nothing changes.
    pub fn set_color(&mut self, index: usize, color: Color) -> Result<()> {
        let palette = self.active;
        let old = self.palettes[palette].set(index, color)?;
        if old == color {
            return Ok(());
        }
        self.history.record(Edit {
            palette,
            index,
            color: old,
        });
        self.refresh();
        Ok(())
    }

    /// Delete a slot of the active palette. Not recorded in history;
    /// records for the slot are dropped and later slots' records follow
    /// their colors down.
    pub fn remove_color(&mut self, index: usize) -> Result<Color> {
        let removed = self.palettes[self.active].remove(index)?;
        self.history.forget_slot(self.active, index);
        log::debug!("removed slot {index} from palette {}", self.active);
        self.refresh();
        Ok(removed)
    }

    /// Restore the most recent recorded color.
    ///
    /// Returns `false` when there is nothing to undo or the recorded
    /// location no longer exists; such a record is discarded.
    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.history.pop_undo() else {
            return false;
        };
        match self.swap_in(edit) {
            Some(current) => {
                self.history.push_redo(current);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone color.
    pub fn redo(&mut self) -> bool {
        let Some(edit) = self.history.pop_redo() else {
            return false;
        };
        match self.swap_in(edit) {
            Some(current) => {
                self.history.push_undo(current);
                true
            }
            None => false,
        }
    }

    /// Add a copy of the active palette as a new tab and select it.
    ///
    /// Returns the index of the new tab.
    pub fn duplicate_palette(&mut self) -> usize {
        let copy = self.active_palette().clone();
        self.palettes.push(copy);
        self.active = self.palettes.len() - 1;
        // Same colors, so only the cache key needs refreshing.
        self.cache.invalidate();
        self.active
    }

    /// Close a palette tab.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for a bad tab and
    /// [`Error::InvalidParameter`] when it is the last one.
    pub fn close_palette(&mut self, index: usize) -> Result<()> {
        if index >= self.palettes.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.palettes.len(),
            });
        }
        if self.palettes.len() == 1 {
            return Err(Error::InvalidParameter(
                "cannot close the last palette".into(),
            ));
        }
        self.palettes.remove(index);
        self.history.forget_palette(index);
        if self.active >= self.palettes.len() {
            self.active = self.palettes.len() - 1;
        } else if self.active > index {
            self.active -= 1;
        }
        self.refresh();
        Ok(())
    }

    /// Make another tab the active palette.
    pub fn select_palette(&mut self, index: usize) -> Result<()> {
        if index >= self.palettes.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.palettes.len(),
            });
        }
        if index != self.active {
            self.active = index;
            self.refresh();
        }
        Ok(())
    }

    /// Replace the active palette with one of the same length, e.g. an
    /// imported palette strip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] when the lengths differ.
    pub fn replace_active_palette(&mut self, palette: Palette) -> Result<()> {
        let expected = self.active_palette().len();
        if palette.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: palette.len(),
            });
        }
        self.palettes[self.active] = palette;
        self.refresh();
        Ok(())
    }

    /// Merge an imported index into a new active palette tab.
    ///
    /// Returns how many slots took an imported color.
    pub fn import_index(&mut self, index: &PositionIndex) -> usize {
        let (merged, mapped) = merge_palette_from_index(self.active_palette(), index);
        log::info!(
            "imported index: {mapped} slots mapped, palette now {} colors",
            merged.len()
        );
        self.palettes.push(merged);
        self.active = self.palettes.len() - 1;
        self.refresh();
        mapped
    }

    /// Position index of the active palette over the original raster.
    ///
    /// Served from the cache when nothing changed since the last build.
    /// Rasters above the large-image threshold are indexed one slot at a
    /// time with an [`IncrementalIndexBuilder`].
    pub fn position_index(&mut self) -> &PositionIndex {
        let key = self.fingerprint();
        let raster = &self.original;
        let palette = &self.palettes[self.active];
        let incremental = raster.len() > self.config.large_image_threshold;
        self.cache.get_or_build_with(key, || {
            if incremental {
                IncrementalIndexBuilder::started(raster, palette)
                    .run_to_completion()
                    .unwrap_or_default()
            } else {
                PositionIndex::build(raster, palette)
            }
        })
    }

    /// Whether the next [`position_index`](Self::position_index) call
    /// would do a full build.
    pub fn needs_index_build(&self) -> bool {
        self.cache.get(&self.fingerprint()).is_none()
    }

    /// True when the raster is above the large-image threshold.
    pub fn is_large(&self) -> bool {
        self.original.len() > self.config.large_image_threshold
    }

    /// Start a cooperative build for a host that drives the steps.
    ///
    /// The returned fingerprint identifies the state the build runs
    /// against; hand it back to [`finish_index_build`](Self::finish_index_build).
    pub fn begin_index_build(&self) -> (IncrementalIndexBuilder, Fingerprint) {
        let builder = IncrementalIndexBuilder::started(&self.original, self.active_palette());
        (builder, self.fingerprint())
    }

    /// Publish a finished cooperative build.
    ///
    /// Returns `false` and drops the index if the document changed since
    /// the build began.
    pub fn finish_index_build(&mut self, key: Fingerprint, index: PositionIndex) -> bool {
        if key != self.fingerprint() {
            log::debug!("discarding stale index build");
            return false;
        }
        self.cache.insert(key, index);
        true
    }

    /// PMAP of the working raster against the active palette.
    pub fn pmap(&self) -> PmapDocument {
        PmapDocument::encode(&self.working, self.active_palette())
    }

    /// Original raster with everything but one original color cleared.
    pub fn isolate(&self, index: usize) -> Option<Raster> {
        self.original_palette
            .get(index)
            .map(|c| self.original.isolate(c))
    }

    /// Working color at a pixel.
    pub fn color_at(&self, x: u32, y: u32) -> Option<Color> {
        self.working.get(x, y)
    }

    /// Active palette slot of the working color at a pixel.
    pub fn slot_at(&self, x: u32, y: u32) -> Option<usize> {
        self.color_at(x, y)
            .and_then(|c| self.active_palette().slot_for(c))
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            width: self.original.width(),
            height: self.original.height(),
            byte_size: self.original.byte_size(),
            palette_len: self.active_palette().len(),
            palette_count: self.palettes.len(),
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::with_raster_digest(&self.original, self.original_digest, self.active_palette())
    }

    /// Write `edit.color` to its location and return a record of the
    /// color it replaced, or `None` if the location is gone.
    fn swap_in(&mut self, edit: Edit) -> Option<Edit> {
        let Some(old) = self
            .palettes
            .get_mut(edit.palette)
            .and_then(|p| p.set(edit.index, edit.color).ok())
        else {
            log::debug!(
                "dropping history record for missing slot {} of palette {}",
                edit.index,
                edit.palette
            );
            return None;
        };
        self.refresh();
        Some(Edit { color: old, ..edit })
    }

    fn refresh(&mut self) {
        self.working = apply_palette(
            &self.original,
            &self.original_palette,
            &self.palettes[self.active],
        );
        self.cache.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Position;

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn sample() -> Document {
        let raster = Raster::from_pixels(2, 2, vec![RED, GREEN, RED, BLUE]).unwrap();
        Document::open(raster, EngineConfig::default())
    }

    #[test]
    fn test_set_color_reapplies() {
        let mut doc = sample();
        doc.set_color(0, Color::WHITE).unwrap();
        assert_eq!(doc.working().get(0, 0), Some(Color::WHITE));
        assert_eq!(doc.working().get(0, 1), Some(Color::WHITE));
        assert_eq!(doc.original().get(0, 0), Some(RED));
        assert!(doc.set_color(9, Color::WHITE).is_err());
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = sample();
        doc.set_color(1, Color::WHITE).unwrap();
        doc.set_color(1, Color::BLACK).unwrap();

        assert!(doc.undo());
        assert_eq!(doc.active_palette().get(1), Some(Color::WHITE));
        assert!(doc.undo());
        assert_eq!(doc.active_palette().get(1), Some(GREEN));
        assert!(!doc.undo());

        assert!(doc.redo());
        assert_eq!(doc.working().get(1, 0), Some(Color::WHITE));

        // A new edit drops the remaining redo record
        doc.set_color(2, Color::WHITE).unwrap();
        assert!(!doc.redo());
    }

    #[test]
    fn test_undo_discards_missing_slot() {
        let mut doc = sample();
        doc.set_color(2, Color::WHITE).unwrap();
        doc.remove_color(2).unwrap();
        assert!(!doc.undo());
        assert!(!doc.history().can_undo());
    }

    #[test]
    fn test_palette_tabs() {
        let mut doc = sample();
        assert_eq!(doc.duplicate_palette(), 1);
        doc.set_color(0, Color::BLACK).unwrap();
        assert_eq!(doc.palettes()[0].get(0), Some(RED));

        doc.select_palette(0).unwrap();
        assert_eq!(doc.working().get(0, 0), Some(RED));

        doc.close_palette(1).unwrap();
        assert!(matches!(
            doc.close_palette(0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(doc.select_palette(3).is_err());
    }

    #[test]
    fn test_undo_after_closing_earlier_tab() {
        let mut doc = sample();
        doc.duplicate_palette();
        doc.duplicate_palette();
        doc.set_color(0, Color::WHITE).unwrap();
        doc.select_palette(1).unwrap();
        doc.set_color(0, Color::BLACK).unwrap();

        doc.close_palette(1).unwrap();
        assert_eq!(doc.history().undo_len(), 1);
        assert_eq!(doc.active_index(), 1);

        // The edit made on the old third tab lands on it at its new index
        assert!(doc.undo());
        assert_eq!(doc.palettes()[1].get(0), Some(RED));
        assert_eq!(doc.palettes()[0].get(0), Some(RED));
        assert!(!doc.undo());
    }

    #[test]
    fn test_undo_after_removing_earlier_slot() {
        let mut doc = sample();
        doc.set_color(2, Color::WHITE).unwrap();
        doc.remove_color(0).unwrap();
        assert!(doc.undo());
        assert_eq!(doc.active_palette().colors(), &[GREEN, BLUE]);
    }

    #[test]
    fn test_replace_active_palette_size_checked() {
        let mut doc = sample();
        let err = doc
            .replace_active_palette(Palette::from(vec![Color::WHITE]))
            .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 3, actual: 1 }));
        assert_eq!(doc.active_palette().len(), 3);

        doc.replace_active_palette(Palette::from(vec![BLUE, GREEN, RED]))
            .unwrap();
        assert_eq!(doc.working().get(1, 1), Some(RED));
    }

    #[test]
    fn test_position_index_cached() {
        let mut doc = sample();
        assert!(doc.needs_index_build());
        assert_eq!(doc.position_index().positions(1).len(), 2);
        assert!(!doc.needs_index_build());
        doc.position_index();
        assert_eq!(doc.cache.builds(), 1);

        doc.set_color(0, Color::WHITE).unwrap();
        assert!(doc.needs_index_build());
    }

    #[test]
    fn test_large_image_uses_incremental_build() {
        let raster = Raster::from_pixels(2, 2, vec![RED, GREEN, RED, BLUE]).unwrap();
        let config = EngineConfig {
            large_image_threshold: 1,
            ..EngineConfig::default()
        };
        let mut doc = Document::open(raster.clone(), config);
        assert!(doc.is_large());
        let expected = PositionIndex::build(&raster, &Palette::extract(&raster));
        assert_eq!(doc.position_index(), &expected);
    }

    #[test]
    fn test_cooperative_build_publish() {
        let mut doc = sample();
        let (mut builder, key) = doc.begin_index_build();
        let index = builder.run_to_completion().unwrap();
        assert!(doc.finish_index_build(key, index.clone()));
        assert!(!doc.needs_index_build());

        // Stale after an edit
        let (mut builder, key) = doc.begin_index_build();
        doc.set_color(0, Color::WHITE).unwrap();
        let index = builder.run_to_completion().unwrap();
        assert!(!doc.finish_index_build(key, index));
        assert!(doc.needs_index_build());
    }

    #[test]
    fn test_import_index_adds_tab() {
        let mut doc = sample();
        let imported = PmapDocument::parse("1\n#FFFFFF 1 0;0").unwrap().to_index();
        assert_eq!(doc.import_index(&imported), 1);
        assert_eq!(doc.palettes().len(), 2);
        assert_eq!(doc.active_index(), 1);
        assert_eq!(doc.working().get(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_isolate_and_slot_at() {
        let doc = sample();
        let iso = doc.isolate(0).unwrap();
        assert_eq!(iso.get(1, 0), Some(Color::TRANSPARENT));
        assert_eq!(iso.get(0, 1), Some(RED));
        assert!(doc.isolate(7).is_none());
        assert_eq!(doc.slot_at(1, 1), Some(2));
        assert_eq!(doc.slot_at(5, 5), None);
    }

    #[test]
    fn test_pmap_of_working_raster() {
        let mut doc = sample();
        doc.set_color(2, GREEN).unwrap();
        let pmap = doc.pmap();
        assert_eq!(pmap.len(), 2);
        assert_eq!(
            pmap.entries()[1].positions,
            vec![Position::new(1, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn test_info() {
        let doc = sample();
        let info = doc.info();
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.byte_size, 16);
        assert_eq!(info.palette_len, 3);
        assert_eq!(info.palette_count, 1);
    }
}
