//! Palette application - bulk color substitution
//!
//! Slot `i` of the original palette maps to slot `i` of the replacement
//! palette. Slots past the shorter palette are ignored. When the original
//! palette repeats a color, the highest slot index wins, as with any
//! overwrite-on-insert map.

use crate::color::Color;
use crate::palette::Palette;
use crate::raster::Raster;
use std::collections::HashMap;

/// Source color to replacement color, built from two aligned palettes.
pub fn substitution_map(original: &Palette, replacement: &Palette) -> HashMap<Color, Color> {
    let mut map = HashMap::with_capacity(original.len().min(replacement.len()));
    for (&from, &to) in original.iter().zip(replacement.iter()) {
        map.insert(from, to);
    }
    map
}

/// Produce a new raster with every mapped color substituted.
///
/// Pixels whose color is not in `original` are copied unchanged. The
/// input raster is not modified.
pub fn apply_palette(raster: &Raster, original: &Palette, replacement: &Palette) -> Raster {
    let map = substitution_map(original, replacement);
    if map.iter().all(|(from, to)| from == to) {
        // Identity mapping: share the buffer instead of copying it.
        return raster.clone();
    }
    let pixels = raster
        .pixels()
        .iter()
        .map(|c| map.get(c).copied().unwrap_or(*c))
        .collect();
    Raster::from_pixels(raster.width(), raster.height(), pixels)
        .unwrap_or_else(|_| raster.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn sample() -> Raster {
        Raster::from_pixels(2, 2, vec![RED, GREEN, RED, BLUE]).unwrap()
    }

    #[test]
    fn test_apply_replaces_aligned_slots() {
        let raster = sample();
        let original = Palette::extract(&raster);
        let replacement = Palette::from(vec![Color::WHITE, GREEN, Color::BLACK]);
        let out = apply_palette(&raster, &original, &replacement);
        assert_eq!(
            out.pixels(),
            &[Color::WHITE, GREEN, Color::WHITE, Color::BLACK]
        );
        // Input untouched
        assert_eq!(raster.get(0, 0), Some(RED));
    }

    #[test]
    fn test_identity_is_byte_identical() {
        let raster = sample();
        let palette = Palette::extract(&raster);
        let out = apply_palette(&raster, &palette, &palette);
        assert_eq!(out.to_rgba_bytes(), raster.to_rgba_bytes());
    }

    #[test]
    fn test_shorter_replacement_ignores_extra_slots() {
        let raster = sample();
        let original = Palette::extract(&raster);
        let replacement = Palette::from(vec![Color::WHITE]);
        let out = apply_palette(&raster, &original, &replacement);
        assert_eq!(out.pixels(), &[Color::WHITE, GREEN, Color::WHITE, BLUE]);
    }

    #[test]
    fn test_duplicate_source_last_writer_wins() {
        let raster = sample();
        let original = Palette::from(vec![RED, RED]);
        let replacement = Palette::from(vec![Color::WHITE, Color::BLACK]);
        let out = apply_palette(&raster, &original, &replacement);
        assert_eq!(out.get(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_unmapped_pixels_copied() {
        let raster = sample();
        let original = Palette::from(vec![Color::WHITE]);
        let replacement = Palette::from(vec![Color::BLACK]);
        let out = apply_palette(&raster, &original, &replacement);
        assert_eq!(out, raster);
    }
}
