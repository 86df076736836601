//! Opening and saving documents, and document-level exports

use crate::config::PalmapConfig;
use crate::file::{format_for_path, load_raster_with_pmap, save_raster};
use crate::json::{read_index_json, write_index_json};
use crate::strip::{export_palette_strip, import_palette_strip};
use crate::IoResult;
use image::ImageFormat;
use palmap_core::{Document, PmapDocument};
use std::path::Path;

/// How [`open_document`] chose the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Restored from the embedded `PMAP` chunk
    Restored { colors: usize },
    /// Extracted from the pixels
    Extracted { colors: usize },
}

/// Open a raster file as a [`Document`].
///
/// When the file carries a `PMAP` chunk and the config allows it, the
/// palette is restored from the chunk, keeping slot order and edits that
/// extraction would lose. Restored colors take their alpha from the
/// pixels the chunk lists. A chunk that fails to parse, or that does not
/// match the pixels, is logged and the palette is extracted instead.
pub fn open_document(
    path: impl AsRef<Path>,
    config: &PalmapConfig,
) -> IoResult<(Document, OpenOutcome)> {
    let path = path.as_ref();
    let (raster, pmap) = load_raster_with_pmap(path)?;

    if config.restore_embedded_pmap
        && let Some(text) = pmap
    {
        match PmapDocument::parse(&text).and_then(|pmap| pmap.resolve_palette(&raster)) {
            Ok(palette) if !palette.is_empty() => {
                let colors = palette.len();
                log::info!("restored {colors} colors from PMAP in {}", path.display());
                let doc = Document::open_with_palette(raster, palette, config.engine());
                return Ok((doc, OpenOutcome::Restored { colors }));
            }
            Ok(_) => log::debug!("embedded PMAP in {} is empty", path.display()),
            Err(e) => log::warn!("ignoring embedded PMAP in {}: {}", path.display(), e),
        }
    }

    let doc = Document::open(raster, config.engine());
    let colors = doc.active_palette().len();
    Ok((doc, OpenOutcome::Extracted { colors }))
}

/// Save the working raster, embedding its PMAP when saving PNG.
pub fn save_document(
    path: impl AsRef<Path>,
    doc: &Document,
    config: &PalmapConfig,
) -> IoResult<()> {
    let path = path.as_ref();
    let embed = config.embed_pmap_on_save && format_for_path(path)? == ImageFormat::Png;
    let pmap = embed.then(|| doc.pmap().to_text());
    save_raster(path, doc.working(), pmap.as_deref())
}

/// Write the document's PMAP to a `.pmap` file.
pub fn export_pmap(path: impl AsRef<Path>, doc: &Document) -> IoResult<()> {
    write_pmap_file(path, &doc.pmap())
}

/// Write the active palette's position index as JSON.
pub fn export_index_json(
    path: impl AsRef<Path>,
    doc: &mut Document,
    config: &PalmapConfig,
) -> IoResult<()> {
    write_index_json(path, doc.position_index(), config.json_pretty)
}

/// Merge a JSON index into a new palette tab. Returns the mapped slot count.
pub fn import_index_json(path: impl AsRef<Path>, doc: &mut Document) -> IoResult<usize> {
    let index = read_index_json(path)?;
    Ok(doc.import_index(&index))
}

/// Write the active palette as a strip image.
pub fn export_active_strip(path: impl AsRef<Path>, doc: &Document) -> IoResult<()> {
    export_palette_strip(path, doc.active_palette())
}

/// Replace the active palette from a strip of the same length.
pub fn import_active_strip(path: impl AsRef<Path>, doc: &mut Document) -> IoResult<()> {
    let palette = import_palette_strip(path, Some(doc.active_palette().len()))?;
    doc.replace_active_palette(palette)?;
    Ok(())
}

/// Write a PMAP document to a file, replacing it atomically.
pub fn write_pmap_file(path: impl AsRef<Path>, pmap: &PmapDocument) -> IoResult<()> {
    let path = path.as_ref();
    pmap.write_to_file(path)?;
    log::info!("wrote {} PMAP lines to {}", pmap.len(), path.display());
    Ok(())
}

/// Read a PMAP document from a file.
pub fn read_pmap_file(path: impl AsRef<Path>) -> IoResult<PmapDocument> {
    Ok(PmapDocument::read_from_file(path)?)
}
