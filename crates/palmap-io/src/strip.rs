//! Palette strip images
//!
//! A strip is a one pixel tall raster with one column per palette slot,
//! in slot order. Any lossless format works; PNG is the usual choice.

use crate::file::{load_raster, save_raster};
use crate::{IoError, IoResult};
use palmap_core::Palette;
use std::path::Path;

/// Write `palette` as a `len x 1` strip.
pub fn export_palette_strip(path: impl AsRef<Path>, palette: &Palette) -> IoResult<()> {
    if palette.is_empty() {
        return Err(IoError::InvalidData("cannot export an empty palette".into()));
    }
    save_raster(path, &palette.to_strip(), None)
}

/// Read a palette from the first row of a strip image.
///
/// With `expected_len`, a strip of any other width fails with
/// [`palmap_core::Error::SizeMismatch`] (wrapped in [`IoError::Core`]).
pub fn import_palette_strip(
    path: impl AsRef<Path>,
    expected_len: Option<usize>,
) -> IoResult<Palette> {
    let path = path.as_ref();
    let strip = load_raster(path)?;
    if strip.height() > 1 {
        log::debug!(
            "strip {} has {} rows, reading the first",
            path.display(),
            strip.height()
        );
    }
    Ok(Palette::from_strip(&strip, expected_len)?)
}
