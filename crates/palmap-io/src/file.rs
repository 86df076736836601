//! Raster files on disk
//!
//! PNG goes through [`crate::png`] so the `PMAP` text chunk can be read
//! and written. Every other format the `image` crate was built with is
//! decoded to RGBA and encoded from it.

use crate::png::{read_png, write_png};
use crate::{IoError, IoResult};
use image::{DynamicImage, ImageFormat, RgbaImage};
use palmap_core::Raster;
use palmap_core::atomic::write_atomic;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Output format chosen from a file extension.
pub fn format_for_path(path: &Path) -> IoResult<ImageFormat> {
    ImageFormat::from_path(path).map_err(|_| {
        IoError::UnsupportedFormat(format!("no raster format for '{}'", path.display()))
    })
}

/// Load a raster as RGBA.
pub fn load_raster(path: impl AsRef<Path>) -> IoResult<Raster> {
    Ok(load_raster_with_pmap(path)?.0)
}

/// Load a raster together with its embedded PMAP text, if it has one.
///
/// Only PNG files carry the chunk; other formats always yield `None`.
pub fn load_raster_with_pmap(path: impl AsRef<Path>) -> IoResult<(Raster, Option<String>)> {
    let path = path.as_ref();
    if is_png(path) {
        let file = File::open(path)?;
        let (raster, pmap) = read_png(BufReader::new(file))?;
        log::debug!(
            "loaded {}x{} PNG {} (embedded PMAP: {})",
            raster.width(),
            raster.height(),
            path.display(),
            pmap.is_some()
        );
        return Ok((raster, pmap));
    }

    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let raster = Raster::from_rgba_bytes(width, height, rgba.as_raw())?;
    log::debug!("loaded {width}x{height} raster {}", path.display());
    Ok((raster, None))
}

/// Embedded PMAP text of a PNG file.
///
/// Returns `None` when the file has no such chunk, is not a PNG, or
/// cannot be read.
pub fn probe_embedded_pmap(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    if !is_png(path) {
        return None;
    }
    match load_raster_with_pmap(path) {
        Ok((_, pmap)) => pmap,
        Err(e) => {
            log::debug!("no embedded PMAP in {}: {}", path.display(), e);
            None
        }
    }
}

/// Save a raster, replacing the destination only once fully written.
///
/// The format follows the extension. `pmap` is embedded as a text chunk
/// when saving PNG and ignored with a warning otherwise.
pub fn save_raster(path: impl AsRef<Path>, raster: &Raster, pmap: Option<&str>) -> IoResult<()> {
    let path = path.as_ref();
    let format = format_for_path(path)?;
    if format == ImageFormat::Png {
        write_atomic(path, |w| write_png(raster, pmap, w))?;
        log::info!("saved {} (embedded PMAP: {})", path.display(), pmap.is_some());
        return Ok(());
    }

    if pmap.is_some() {
        log::warn!(
            "{:?} cannot carry a PMAP chunk, saving {} without it",
            format,
            path.display()
        );
    }
    let rgba = RgbaImage::from_raw(raster.width(), raster.height(), raster.to_rgba_bytes())
        .ok_or_else(|| IoError::InvalidData("raster buffer does not match its size".into()))?;
    let image = match format {
        // No alpha channel in JPEG
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };
    write_atomic(path, |w| image.write_to(w, format).map_err(IoError::from))?;
    log::info!("saved {}", path.display());
    Ok(())
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use palmap_core::Color;

    fn sample() -> Raster {
        Raster::from_pixels(
            2,
            1,
            vec![Color::rgb(10, 20, 30), Color::new(40, 50, 60, 70)],
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load_png() {
        let dir = std::env::temp_dir().join("palmap_io_file_png");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.png");

        save_raster(&path, &sample(), Some("0")).unwrap();
        assert_eq!(load_raster(&path).unwrap(), sample());
        assert_eq!(probe_embedded_pmap(&path).as_deref(), Some("0"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_bmp() {
        let dir = std::env::temp_dir().join("palmap_io_file_bmp");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.bmp");

        let opaque = Raster::new(3, 2, Color::rgb(1, 2, 3));
        save_raster(&path, &opaque, Some("0")).unwrap();
        assert_eq!(load_raster(&path).unwrap(), opaque);
        assert!(probe_embedded_pmap(&path).is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_extension() {
        let path = std::env::temp_dir().join("palmap_io_file.xyz");
        assert!(matches!(
            save_raster(&path, &sample(), None),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_probe_missing_file() {
        assert!(probe_embedded_pmap("/nonexistent/palmap.png").is_none());
    }
}
