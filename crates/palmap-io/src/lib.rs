//! palmap-io - file formats and configuration for palmap
//!
//! - [`file`] - raster files through `png` and `image`
//! - [`png`] - PNG with the embedded `PMAP` text chunk
//! - [`strip`] - palette strip images
//! - [`json`] - JSON position index
//! - [`session`] - opening and saving whole documents
//! - [`config`] - TOML configuration
//!
//! Every write goes to a temporary file first and replaces the
//! destination only once complete.

pub mod config;
mod error;
pub mod file;
pub mod json;
pub mod png;
pub mod session;
pub mod strip;

pub use config::{ConfigError, PalmapConfig};
pub use error::{IoError, IoResult};
pub use file::{load_raster, load_raster_with_pmap, probe_embedded_pmap, save_raster};
pub use json::{index_from_json, index_to_json, read_index_json, write_index_json};
pub use session::{
    OpenOutcome, export_active_strip, export_index_json, export_pmap, import_active_strip,
    import_index_json, open_document, read_pmap_file, save_document, write_pmap_file,
};
pub use strip::{export_palette_strip, import_palette_strip};
