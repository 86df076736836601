//! Raster - row-major RGBA pixel grid
//!
//! # Ownership model
//!
//! Pixel storage sits behind an `Arc`, so cloning a `Raster` is cheap and
//! produces an immutable snapshot. Mutating methods go through
//! `Arc::make_mut`, which copies the buffer first if a snapshot still
//! shares it. An in-flight index build therefore never observes a write
//! made after it started.

use crate::color::Color;
use crate::error::{Error, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Position {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// RGBA image, `width * height` colors in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Arc<Vec<Color>>,
}

impl Raster {
    /// Create a raster filled with one color.
    ///
    /// Zero-sized rasters are allowed; they are what an empty PMAP
    /// document decodes to.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: Arc::new(vec![fill; len]),
        }
    }

    /// Build a raster from an existing pixel vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    /// Build a raster from a packed `RGBARGBA...` byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the buffer is not exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Color::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    /// Packed `RGBARGBA...` bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Size of the decoded RGBA buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len() * 4
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Get the color at `(x, y)`, or `None` outside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.pixels[self.offset(x, y)])
    }

    /// Set the color at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] outside the raster.
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        if !self.contains(x, y) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let offset = self.offset(x, y);
        Arc::make_mut(&mut self.pixels)[offset] = color;
        Ok(())
    }

    /// Iterate `(position, color)` in row-major scan order.
    pub fn iter_positions(&self) -> impl Iterator<Item = (Position, Color)> + '_ {
        let width = self.width.max(1);
        self.pixels.iter().enumerate().map(move |(i, &c)| {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            (Position::new(x, y), c)
        })
    }

    /// Copy where every pixel not exactly equal to `color` is transparent.
    ///
    /// Used for hover previews that show where one palette color sits.
    pub fn isolate(&self, color: Color) -> Raster {
        let pixels = self
            .pixels
            .iter()
            .map(|&c| if c == color { c } else { Color::TRANSPARENT })
            .collect();
        Raster {
            width: self.width,
            height: self.height,
            pixels: Arc::new(pixels),
        }
    }

    /// Structural digest of dimensions and pixel content.
    ///
    /// Stable for identical content within one process.
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        for c in self.pixels.iter() {
            c.to_packed().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// True when both rasters share the same pixel buffer.
    pub fn shares_buffer(&self, other: &Raster) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
