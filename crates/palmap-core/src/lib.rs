//! palmap core - palette extraction, position indexing and PMAP encoding
//!
//! This crate holds the in-memory side of palmap:
//!
//! - [`Color`] and the color text codec ([`color::parse`], [`color::format_hex`])
//! - [`Raster`] - row-major RGBA pixel grid
//! - [`Palette`] - ordered color list, extracted in first-occurrence order
//! - [`PositionIndex`] - palette slot to pixel coordinates, built at once or
//!   one slot at a time with [`IncrementalIndexBuilder`]
//! - [`apply_palette`] - bulk color substitution between aligned palettes
//! - [`ResultCache`] - memo of the last index keyed by content fingerprint
//! - [`PmapDocument`] - the PMAP text format
//! - [`Document`] - one open image with palette tabs and undo history
//!
//! File formats that need an image codec or JSON live in `palmap-io`.

pub mod apply;
pub mod atomic;
pub mod cache;
pub mod color;
pub mod document;
pub mod error;
pub mod history;
pub mod index;
pub mod palette;
pub mod pmap;
pub mod raster;

pub use apply::{apply_palette, substitution_map};
pub use cache::{Fingerprint, ResultCache};
pub use color::{AlphaFormat, Color};
pub use document::{Document, DocumentInfo};
pub use error::{Error, Result};
pub use history::{DEFAULT_MAX_HISTORY, Edit, History};
pub use index::{
    BuildState, IncrementalIndexBuilder, IndexEntry, PositionIndex, Step,
    merge_palette_from_index,
};
pub use palette::Palette;
pub use pmap::{PmapDocument, PmapEntry, decode_pmap, encode_pmap, palette_from_pmap};
pub use raster::{Position, Raster};

/// Pixel count above which indexing goes through the incremental builder.
pub const DEFAULT_LARGE_IMAGE_THRESHOLD: usize = 50_000;

/// Engine tuning shared by every [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Rasters with more pixels than this are indexed incrementally
    pub large_image_threshold: usize,
    /// Undo and redo depth
    pub max_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            large_image_threshold: DEFAULT_LARGE_IMAGE_THRESHOLD,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}
