//! JSON position index
//!
//! # Format
//!
//! ```text
//! {
//!   "1": { "hex": "#ff0000ff", "positions": [ { "x": 0, "y": 0 }, ... ] },
//!   "2": { ... }
//! }
//! ```
//!
//! Keys are 1-based slot ids written in ascending order. Colors are
//! 8-digit lowercase hex, so alpha survives. Duplicate palette slots stay
//! separate entries with their own coordinate lists.
//!
//! On read, keys may come in any order. Colors must be `#RRGGBBAA` in
//! either case.

use crate::{IoError, IoResult};
use palmap_core::atomic::write_atomic;
use palmap_core::color::{self, AlphaFormat};
use palmap_core::{IndexEntry, Position, PositionIndex};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Maximum input size in bytes.
const MAX_INPUT_SIZE: usize = 100_000_000;

#[derive(Serialize, Deserialize)]
struct Point {
    x: u32,
    y: u32,
}

struct Points<'a>(&'a [Position]);

impl Serialize for Points<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for p in self.0 {
            seq.serialize_element(&Point { x: p.x, y: p.y })?;
        }
        seq.end()
    }
}

#[derive(Serialize)]
struct EntryOut<'a> {
    hex: String,
    positions: Points<'a>,
}

#[derive(Deserialize)]
struct EntryIn {
    hex: String,
    positions: Vec<Point>,
}

/// Serializable view of a [`PositionIndex`].
pub struct IndexJson<'a>(pub &'a PositionIndex);

impl Serialize for IndexJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(
                &entry.id.to_string(),
                &EntryOut {
                    hex: color::format_hex(entry.color, AlphaFormat::Always),
                    positions: Points(&entry.positions),
                },
            )?;
        }
        map.end()
    }
}

/// Owned index decoded from JSON.
pub struct IndexFromJson(pub PositionIndex);

impl<'de> Deserialize<'de> for IndexFromJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(IndexVisitor)
    }
}

struct IndexVisitor;

impl<'de> Visitor<'de> for IndexVisitor {
    type Value = IndexFromJson;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of slot ids to {hex, positions}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = access.next_entry::<String, EntryIn>()? {
            let id: usize = key
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("slot id '{key}' is not an integer")))?;
            let color = parse_rgba_hex(&value.hex).map_err(de::Error::custom)?;
            entries.push(IndexEntry {
                id,
                color,
                positions: value
                    .positions
                    .into_iter()
                    .map(|p| Position::new(p.x, p.y))
                    .collect(),
            });
        }
        PositionIndex::from_entries(entries)
            .map(IndexFromJson)
            .map_err(de::Error::custom)
    }
}

/// Parse the `#RRGGBBAA` form of a JSON `hex` field.
fn parse_rgba_hex(hex: &str) -> palmap_core::Result<palmap_core::Color> {
    match hex.strip_prefix('#') {
        Some(digits) if digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            color::parse(hex)
        }
        _ => Err(palmap_core::Error::Format(format!(
            "hex '{hex}' is not #RRGGBBAA"
        ))),
    }
}

/// Serialize an index; `pretty` uses two-space indentation.
pub fn index_to_json(index: &PositionIndex, pretty: bool) -> IoResult<String> {
    let view = IndexJson(index);
    let text = if pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    Ok(text)
}

/// Parse an index from JSON text.
pub fn index_from_json(text: &str) -> IoResult<PositionIndex> {
    let IndexFromJson(index) = serde_json::from_str(text)?;
    Ok(index)
}

/// Write an index to a JSON file, replacing it atomically.
pub fn write_index_json(
    path: impl AsRef<Path>,
    index: &PositionIndex,
    pretty: bool,
) -> IoResult<()> {
    let path = path.as_ref();
    write_atomic(path, |w| {
        let view = IndexJson(index);
        if pretty {
            serde_json::to_writer_pretty(w, &view)?;
        } else {
            serde_json::to_writer(w, &view)?;
        }
        Ok::<(), IoError>(())
    })?;
    log::info!("wrote {} index entries to {}", index.len(), path.display());
    Ok(())
}

/// Read an index from a JSON file.
pub fn read_index_json(path: impl AsRef<Path>) -> IoResult<PositionIndex> {
    let file = File::open(path.as_ref())?;
    let mut buf = Vec::new();
    BufReader::new(file)
        .take((MAX_INPUT_SIZE + 1) as u64)
        .read_to_end(&mut buf)?;
    if buf.len() > MAX_INPUT_SIZE {
        return Err(IoError::InvalidData(format!(
            "input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"
        )));
    }
    let IndexFromJson(index) = serde_json::from_slice(&buf)?;
    Ok(index)
}
