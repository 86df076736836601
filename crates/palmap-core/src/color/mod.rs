//! Color - 32-bit RGBA color value
//!
//! A [`Color`] is four 8-bit channels compared exactly, with no
//! tolerance. Colors are the keys of every palette lookup, so they are
//! `Copy`, `Eq` and `Hash`.
//!
//! Parsing and formatting of textual color notations lives in
//! [`parse`]; this module holds the value type and the small numeric
//! helpers around it.

mod parse;

pub use parse::{AlphaFormat, format_hex, format_rgba, parse};

use std::fmt;

/// Shift amounts for a packed `0xRRGGBBAA` pixel.
pub const RED_SHIFT: u32 = 24;
pub const GREEN_SHIFT: u32 = 16;
pub const BLUE_SHIFT: u32 = 8;
pub const ALPHA_SHIFT: u32 = 0;

/// RGBA color entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
    /// Alpha component
    pub a: u8,
}

impl Color {
    /// Fully transparent black, the fill of reconstructed rasters.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create a new RGBA color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an RGB color (alpha = 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Build a color from a packed `0xRRGGBBAA` value.
    #[inline]
    pub fn from_packed(pixel: u32) -> Self {
        Self::new(
            ((pixel >> RED_SHIFT) & 0xff) as u8,
            ((pixel >> GREEN_SHIFT) & 0xff) as u8,
            ((pixel >> BLUE_SHIFT) & 0xff) as u8,
            ((pixel >> ALPHA_SHIFT) & 0xff) as u8,
        )
    }

    /// Pack into `0xRRGGBBAA`.
    #[inline]
    pub fn to_packed(self) -> u32 {
        ((self.r as u32) << RED_SHIFT)
            | ((self.g as u32) << GREEN_SHIFT)
            | ((self.b as u32) << BLUE_SHIFT)
            | ((self.a as u32) << ALPHA_SHIFT)
    }

    /// Build a color from an `[r, g, b, a]` array.
    #[inline]
    pub fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// RGB channels only.
    #[inline]
    pub fn rgb_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Same RGB channels with alpha forced to 255.
    #[inline]
    pub fn opaque(self) -> Self {
        Self::rgb(self.r, self.g, self.b)
    }

    /// True when the RGB channels match, ignoring alpha.
    #[inline]
    pub fn same_rgb(self, other: Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Perceived brightness, `(299 r + 587 g + 114 b) / 1000`.
    ///
    /// Integer division, so the result is always in `0..=255`.
    pub fn luma(self) -> u8 {
        let sum = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        (sum / 1000) as u8
    }

    /// Black or white, whichever reads better as a label on top of `self`.
    pub fn contrast_label(self) -> Color {
        if self.luma() >= 128 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    /// Euclidean distance over all four channels.
    pub fn distance(self, other: Color) -> f64 {
        let d = |a: u8, b: u8| {
            let v = a as f64 - b as f64;
            v * v
        };
        (d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b) + d(self.a, other.a)).sqrt()
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::from_array(c)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::new(r, g, b, a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hex(*self, AlphaFormat::Compact))
    }
}

impl std::str::FromStr for Color {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_roundtrip() {
        let c = Color::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_packed(), 0x12345678);
        assert_eq!(Color::from_packed(0x12345678), c);
    }

    #[test]
    fn test_luma() {
        assert_eq!(Color::WHITE.luma(), 255);
        assert_eq!(Color::BLACK.luma(), 0);
        // 299 * 255 / 1000 = 76.245
        assert_eq!(Color::rgb(255, 0, 0).luma(), 76);
        assert_eq!(Color::rgb(0, 255, 0).luma(), 149);
        assert_eq!(Color::rgb(0, 0, 255).luma(), 29);
    }

    #[test]
    fn test_contrast_label() {
        assert_eq!(Color::rgb(250, 250, 200).contrast_label(), Color::BLACK);
        assert_eq!(Color::rgb(0, 0, 255).contrast_label(), Color::WHITE);
    }

    #[test]
    fn test_distance() {
        let a = Color::new(0, 0, 0, 0);
        let b = Color::new(3, 4, 0, 0);
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_same_rgb_ignores_alpha() {
        assert!(Color::new(1, 2, 3, 0).same_rgb(Color::rgb(1, 2, 3)));
        assert!(!Color::new(1, 2, 4, 255).same_rgb(Color::rgb(1, 2, 3)));
        assert_eq!(Color::new(1, 2, 3, 9).opaque(), Color::rgb(1, 2, 3));
    }
}
