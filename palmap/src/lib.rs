//! palmap - palette remapping for indexed images
//!
//! Extract the distinct colors of an image, edit them as a palette and
//! re-render the image live. Palette-to-pixel position maps travel as
//! PMAP text, as JSON, or embedded in a saved PNG.
//!
//! # Example
//!
//! ```
//! use palmap::{Color, Document, EngineConfig, Raster};
//!
//! let red = Color::rgb(255, 0, 0);
//! let raster = Raster::from_pixels(2, 1, vec![red, Color::BLACK]).unwrap();
//! let mut doc = Document::open(raster, EngineConfig::default());
//!
//! doc.set_color(0, Color::WHITE).unwrap();
//! assert_eq!(doc.working().get(0, 0), Some(Color::WHITE));
//! assert_eq!(doc.pmap().to_text(), "2\n#FFFFFF 1 0;0\n#000000 1 1;0");
//! ```

// Re-export core types (primary data structures used everywhere)
pub use palmap_core::*;

// File formats and configuration as a module
pub use palmap_io as io;
