//! PMAP - line-based palette map text format
//!
//! # Format
//!
//! ```text
//! N
//! #RRGGBB COUNT x;y x;y ...
//! ...
//! ```
//!
//! The first line is the number of color lines that follow. Each color
//! line holds an uppercase RGB hex value, the number of coordinate pairs
//! on the line, and the pairs themselves in row-major scan order. Lines
//! are joined with `\n`; there is no trailing newline.
//!
//! # Alpha
//!
//! PMAP carries RGB only. Encoding matches pixels by RGB and decoding
//! yields opaque colors, so alpha values and fully transparent padding
//! do not survive a round trip. The JSON index keeps full RGBA per slot
//! when that matters.
//!
//! # Duplicate slots
//!
//! One line is written per distinct RGB value, in the palette order of
//! the first slot holding it. Colors with no matching pixels are not
//! written.

use crate::atomic::write_atomic;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::index::{IndexEntry, PositionIndex};
use crate::palette::Palette;
use crate::raster::{Position, Raster};
use std::collections::HashMap;
use std::fmt;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Maximum input size in bytes.
const MAX_INPUT_SIZE: usize = 100_000_000;

/// Largest raster [`PmapDocument::render`] will allocate, in pixels.
pub const MAX_RENDER_PIXELS: u64 = 100_000_000;

/// One color line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmapEntry {
    /// Opaque color of the line
    pub color: Color,
    /// Coordinates, in the order they appear on the line
    pub positions: Vec<Position>,
}

/// Parsed or encoded PMAP content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PmapDocument {
    entries: Vec<PmapEntry>,
}

impl PmapDocument {
    /// Encode the pixels of `raster` that match some palette color.
    pub fn encode(raster: &Raster, palette: &Palette) -> Self {
        let mut lines: HashMap<(u8, u8, u8), usize> = HashMap::with_capacity(palette.len());
        let mut entries: Vec<PmapEntry> = Vec::new();
        for &c in palette {
            lines.entry(c.rgb_tuple()).or_insert_with(|| {
                entries.push(PmapEntry {
                    color: c.opaque(),
                    positions: Vec::new(),
                });
                entries.len() - 1
            });
        }
        for (pos, c) in raster.iter_positions() {
            if let Some(&line) = lines.get(&c.rgb_tuple()) {
                entries[line].positions.push(pos);
            }
        }
        entries.retain(|e| !e.positions.is_empty());
        log::debug!(
            "encoded PMAP: {} lines from {} palette slots",
            entries.len(),
            palette.len()
        );
        Self { entries }
    }

    /// Build a document from explicit lines.
    pub fn from_entries(entries: Vec<PmapEntry>) -> Self {
        Self { entries }
    }

    /// Parse PMAP text.
    ///
    /// Surrounding whitespace is ignored. Hex digits may be either case
    /// and a line may declare zero pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for a bad header, fewer color lines
    /// than declared, extra non-blank lines, a malformed hex value or
    /// pair, or a declared pair count that differs from the pairs given.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.trim().lines();
        let header = lines.next().map(str::trim).unwrap_or_default();
        if header.is_empty() {
            return Err(Error::format("empty PMAP data"));
        }
        let count: usize = header.parse().map_err(|_| {
            Error::format(format!(
                "PMAP header must be a color count, got '{header}'"
            ))
        })?;

        let mut entries = Vec::with_capacity(count.min(4096));
        for n in 0..count {
            let line = lines.next().ok_or_else(|| {
                Error::format(format!("expected {count} color lines, got {n}"))
            })?;
            entries.push(parse_entry(line, n + 2)?);
        }
        if let Some(extra) = lines.find(|l| !l.trim().is_empty()) {
            return Err(Error::format(format!(
                "unexpected line after {count} color lines: '{extra}'"
            )));
        }
        Ok(Self { entries })
    }

    /// Read a PMAP document from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> Result<Self> {
        let buf = read_limited(reader)?;
        Self::read_from_bytes(&buf)
    }

    /// Read a PMAP document from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file))
    }

    /// Read a PMAP document from a byte slice.
    pub fn read_from_bytes(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::format(format!("invalid UTF-8: {e}")))?;
        Self::parse(text)
    }

    /// Write the PMAP text to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> Result<()> {
        write!(writer, "{self}")?;
        Ok(())
    }

    /// Write the PMAP text to a file, replacing it atomically.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        write_atomic(path, |w| self.write_to_writer(w))
    }

    /// Write the PMAP text to a byte vector.
    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }

    /// The PMAP text.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn entries(&self) -> &[PmapEntry] {
        &self.entries
    }

    /// Number of color lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One opaque palette slot per line.
    pub fn palette(&self) -> Palette {
        self.entries.iter().map(|e| e.color).collect()
    }

    /// Palette for `raster` with the alpha the text format dropped.
    ///
    /// Each line becomes the distinct RGBA values found at its listed
    /// coordinates, in coordinate order; a line with no coordinate inside
    /// the raster keeps its opaque color. Fails with [`Error::Format`]
    /// when a listed pixel's RGB differs from its line, i.e. the PMAP
    /// does not describe this raster.
    pub fn resolve_palette(&self, raster: &Raster) -> Result<Palette> {
        let mut colors = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let mut found: Vec<Color> = Vec::new();
            for pos in &entry.positions {
                let Some(pixel) = raster.get(pos.x, pos.y) else {
                    continue;
                };
                if !pixel.same_rgb(entry.color) {
                    return Err(Error::format(format!(
                        "PMAP lists {} at {};{} but the raster has {}",
                        entry.color, pos.x, pos.y, pixel
                    )));
                }
                if !found.contains(&pixel) {
                    found.push(pixel);
                }
            }
            if found.is_empty() {
                found.push(entry.color);
            }
            colors.extend(found);
        }
        Ok(Palette::from(colors))
    }

    /// Position index with one slot per line, ids in line order.
    pub fn to_index(&self) -> PositionIndex {
        let entries = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| IndexEntry {
                id: Palette::id_of(i),
                color: e.color,
                positions: e.positions.clone(),
            })
            .collect();
        // Ids are dense and unique by construction.
        PositionIndex::from_entries(entries).unwrap_or_default()
    }

    /// `(max_x + 1, max_y + 1)` over all coordinates, `(0, 0)` if none.
    pub fn dimensions(&self) -> (u32, u32) {
        let mut width = 0u32;
        let mut height = 0u32;
        for p in self.entries.iter().flat_map(|e| &e.positions) {
            width = width.max(p.x.saturating_add(1));
            height = height.max(p.y.saturating_add(1));
        }
        (width, height)
    }

    /// Reconstruct the raster: transparent everywhere except the listed
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] when the raster would exceed
    /// [`MAX_RENDER_PIXELS`].
    pub fn render(&self) -> Result<Raster> {
        let (width, height) = self.dimensions();
        if width as u64 * height as u64 > MAX_RENDER_PIXELS {
            return Err(Error::InvalidDimension { width, height });
        }
        let mut raster = Raster::new(width, height, Color::TRANSPARENT);
        self.render_into(&mut raster);
        Ok(raster)
    }

    /// Paint every line's coordinates onto an existing raster.
    ///
    /// Coordinates outside `raster` are skipped; returns how many were.
    pub fn render_into(&self, raster: &mut Raster) -> usize {
        let mut skipped = 0;
        for entry in &self.entries {
            for p in &entry.positions {
                if raster.set(p.x, p.y, entry.color).is_err() {
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            log::warn!("skipped {skipped} PMAP coordinates outside the raster");
        }
        skipped
    }
}

impl fmt::Display for PmapDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entries.len())?;
        for entry in &self.entries {
            let (r, g, b) = entry.color.rgb_tuple();
            write!(f, "\n#{r:02X}{g:02X}{b:02X} {}", entry.positions.len())?;
            for p in &entry.positions {
                write!(f, " {};{}", p.x, p.y)?;
            }
        }
        Ok(())
    }
}

/// Encode `raster` against `palette` straight to PMAP text.
pub fn encode_pmap(raster: &Raster, palette: &Palette) -> String {
    PmapDocument::encode(raster, palette).to_text()
}

/// Decode PMAP text into its palette and reconstructed raster.
pub fn decode_pmap(text: &str) -> Result<(Palette, Raster)> {
    let doc = PmapDocument::parse(text)?;
    let raster = doc.render()?;
    Ok((doc.palette(), raster))
}

/// Palette of a PMAP text, without rendering the raster.
pub fn palette_from_pmap(text: &str) -> Result<Palette> {
    Ok(PmapDocument::parse(text)?.palette())
}

// ============================================================================
// Internal helpers
// ============================================================================

/// Read from a reader with a size limit.
fn read_limited(reader: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take((MAX_INPUT_SIZE + 1) as u64)
        .read_to_end(&mut buf)?;
    if buf.len() > MAX_INPUT_SIZE {
        return Err(Error::format(format!(
            "input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"
        )));
    }
    Ok(buf)
}

/// Parse "#RRGGBB COUNT x;y x;y ..." (`line_no` is 1-based, for messages).
fn parse_entry(line: &str, line_no: usize) -> Result<PmapEntry> {
    let mut fields = line.split_whitespace();
    let hex = fields
        .next()
        .ok_or_else(|| Error::format(format!("line {line_no}: empty color line")))?;
    let color = parse_hex6(hex)
        .ok_or_else(|| Error::format(format!("line {line_no}: invalid hex color '{hex}'")))?;
    let count_field = fields.next().ok_or_else(|| {
        Error::format(format!("line {line_no}: expected #RRGGBB COUNT PAIRS"))
    })?;
    let declared: usize = count_field.parse().map_err(|_| {
        Error::format(format!("line {line_no}: invalid pair count '{count_field}'"))
    })?;

    let positions = fields
        .map(|pair| {
            parse_pair(pair).ok_or_else(|| {
                Error::format(format!("line {line_no}: invalid coordinate pair '{pair}'"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if positions.len() != declared {
        return Err(Error::format(format!(
            "line {line_no}: declared {declared} pairs, found {}",
            positions.len()
        )));
    }
    Ok(PmapEntry { color, positions })
}

/// "#RRGGBB" to an opaque color.
fn parse_hex6(field: &str) -> Option<Color> {
    let digits = field.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// "x;y" to a position.
fn parse_pair(field: &str) -> Option<Position> {
    let (x, y) = field.split_once(';')?;
    Some(Position::new(x.parse().ok()?, y.parse().ok()?))
}
