//! ResultCache - memoized PositionIndex keyed by content fingerprint
//!
//! The cache holds at most one index, the last one built. A lookup is a
//! hit only when the fingerprint of the queried raster and palette equals
//! the fingerprint the index was built under. Owners call
//! [`ResultCache::invalidate`] on every raster or palette mutation; the
//! fingerprint comparison is the only implicit check.

use crate::index::PositionIndex;
use crate::palette::Palette;
use crate::raster::Raster;

/// Opaque summary of a raster and palette pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    width: u32,
    height: u32,
    raster: u64,
    palette_len: usize,
    palette: u64,
}

impl Fingerprint {
    /// Fingerprint of a raster and palette snapshot.
    pub fn new(raster: &Raster, palette: &Palette) -> Self {
        Self::with_raster_digest(raster, raster.digest(), palette)
    }

    /// Fingerprint reusing an already computed [`Raster::digest`].
    ///
    /// For owners of an immutable raster that digest it once.
    pub fn with_raster_digest(raster: &Raster, digest: u64, palette: &Palette) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            raster: digest,
            palette_len: palette.len(),
            palette: palette.digest(),
        }
    }
}

/// Single-entry memo of the last built [`PositionIndex`].
#[derive(Debug, Default)]
pub struct ResultCache {
    entry: Option<(Fingerprint, PositionIndex)>,
    builds: usize,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached index or build it with [`PositionIndex::build`].
    pub fn get_or_build(&mut self, raster: &Raster, palette: &Palette) -> &PositionIndex {
        let key = Fingerprint::new(raster, palette);
        self.get_or_build_with(key, || PositionIndex::build(raster, palette))
    }

    /// Return the index cached under `key`, or run `build` and cache it.
    pub fn get_or_build_with<F>(&mut self, key: Fingerprint, build: F) -> &PositionIndex
    where
        F: FnOnce() -> PositionIndex,
    {
        if matches!(&self.entry, Some((k, _)) if *k == key) {
            log::debug!("position index cache hit");
        } else {
            log::debug!("position index cache miss, building");
            self.entry = None;
        }
        let builds = &mut self.builds;
        let (_, index) = self.entry.get_or_insert_with(|| {
            *builds += 1;
            (key, build())
        });
        index
    }

    /// Cached index if its fingerprint equals `key`.
    pub fn get(&self, key: &Fingerprint) -> Option<&PositionIndex> {
        match &self.entry {
            Some((k, index)) if k == key => Some(index),
            _ => None,
        }
    }

    /// Store an index built elsewhere, e.g. by an incremental build.
    pub fn insert(&mut self, key: Fingerprint, index: PositionIndex) {
        self.entry = Some((key, index));
    }

    /// Forget the cached index.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Fingerprint of the cached index, if any.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.entry.as_ref().map(|(k, _)| *k)
    }

    /// Number of builds this cache has run.
    pub fn builds(&self) -> usize {
        self.builds
    }
}
