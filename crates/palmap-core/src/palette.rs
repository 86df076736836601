//! Palette - ordered, editable list of colors
//!
//! Slot identity is positional. After extraction every slot holds a
//! distinct color, but edits may collide two slots onto the same value;
//! that is allowed and nothing here deduplicates it again.
//!
//! Slots are addressed two ways:
//!
//! - 0-based `index` for in-memory access
//! - 1-based `id` in every external representation (PMAP, JSON index)

use crate::color::Color;
use crate::error::{Error, Result};
use crate::raster::Raster;
use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Ordered list of colors associated with an image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create an empty palette.
    pub fn new() -> Self {
        Self { colors: Vec::new() }
    }

    /// Extract the distinct colors of a raster in first-occurrence order.
    ///
    /// Pixels are scanned row-major; a color enters the palette the
    /// first time it is seen. Two extractions of the same raster always
    /// yield the same palette in the same order.
    ///
    /// O(W*H) time, O(U) extra space for U unique colors.
    pub fn extract(raster: &Raster) -> Self {
        let mut seen = HashSet::new();
        let mut colors = Vec::new();
        for &c in raster.pixels() {
            if seen.insert(c) {
                colors.push(c);
            }
        }
        log::debug!(
            "extracted {} colors from {}x{} raster",
            colors.len(),
            raster.width(),
            raster.height()
        );
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get a color by 0-based index.
    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Get a color by 1-based id.
    pub fn get_by_id(&self, id: usize) -> Option<Color> {
        Self::index_of_id(id).and_then(|i| self.get(i))
    }

    /// All colors as a slice.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Iterate colors in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }

    /// Append a color, returning its index.
    pub fn push(&mut self, color: Color) -> usize {
        self.colors.push(color);
        self.colors.len() - 1
    }

    /// Replace the color at `index`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len`.
    pub fn set(&mut self, index: usize, color: Color) -> Result<Color> {
        let len = self.colors.len();
        let slot = self
            .colors
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, color))
    }

    /// Remove the color at `index`; later slots shift down by one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<Color> {
        let len = self.colors.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(self.colors.remove(index))
    }

    /// 1-based id of a 0-based index.
    #[inline]
    pub fn id_of(index: usize) -> usize {
        index + 1
    }

    /// 0-based index of a 1-based id; `None` for id 0.
    #[inline]
    pub fn index_of_id(id: usize) -> Option<usize> {
        id.checked_sub(1)
    }

    /// First slot holding exactly `color`.
    pub fn slot_for(&self, color: Color) -> Option<usize> {
        self.colors.iter().position(|&c| c == color)
    }

    /// True if two or more slots share a color.
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.colors.len());
        !self.colors.iter().all(|c| seen.insert(*c))
    }

    /// Nearest entry by Euclidean RGBA distance.
    ///
    /// Ties go to the lowest index. Returns `None` for an empty palette.
    pub fn find_closest(&self, target: Color) -> Option<(usize, Color)> {
        let mut best: Option<(usize, Color, f64)> = None;
        for (i, &c) in self.colors.iter().enumerate() {
            let d = target.distance(c);
            if best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((i, c, d));
            }
        }
        best.map(|(i, c, _)| (i, c))
    }

    /// Structural digest of the slot contents.
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.colors.len().hash(&mut hasher);
        for c in &self.colors {
            c.to_packed().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Render as a `len x 1` strip, one column per slot.
    pub fn to_strip(&self) -> Raster {
        // A palette longer than u32::MAX cannot come from a raster.
        Raster::from_pixels(self.colors.len() as u32, 1, self.colors.clone())
            .unwrap_or_else(|_| Raster::new(0, 1, Color::TRANSPARENT))
    }

    /// Read a palette from the first row of a strip raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] when `expected_len` is given and the
    /// strip width differs, and [`Error::InvalidDimension`] for a strip
    /// with no rows.
    pub fn from_strip(strip: &Raster, expected_len: Option<usize>) -> Result<Self> {
        if strip.height() == 0 {
            return Err(Error::InvalidDimension {
                width: strip.width(),
                height: strip.height(),
            });
        }
        let width = strip.width() as usize;
        if let Some(expected) = expected_len
            && expected != width
        {
            return Err(Error::SizeMismatch {
                expected,
                actual: width,
            });
        }
        Ok(Self {
            colors: strip.pixels()[..width].to_vec(),
        })
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Self { colors }
    }
}

impl FromIterator<Color> for Palette {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
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
    fn test_extract_first_occurrence_order() {
        let palette = Palette::extract(&sample());
        assert_eq!(palette.colors(), &[RED, GREEN, BLUE]);
        assert_eq!(palette, Palette::extract(&sample()));
    }

    #[test]
    fn test_extract_distinguishes_alpha() {
        let r = Raster::from_pixels(2, 1, vec![RED, Color::new(255, 0, 0, 0)]).unwrap();
        assert_eq!(Palette::extract(&r).len(), 2);
    }

    #[test]
    fn test_extract_empty() {
        let r = Raster::new(0, 0, Color::BLACK);
        assert!(Palette::extract(&r).is_empty());
    }

    #[test]
    fn test_set_and_remove() {
        let mut p = Palette::extract(&sample());
        assert_eq!(p.set(1, BLUE).unwrap(), GREEN);
        assert!(p.has_duplicates());
        assert_eq!(p.remove(0).unwrap(), RED);
        assert_eq!(p.colors(), &[BLUE, BLUE]);
        assert!(matches!(
            p.set(5, RED),
            Err(Error::IndexOutOfRange { index: 5, len: 2 })
        ));
        assert!(p.remove(2).is_err());
    }

    #[test]
    fn test_ids() {
        let p = Palette::extract(&sample());
        assert_eq!(Palette::id_of(0), 1);
        assert_eq!(Palette::index_of_id(0), None);
        assert_eq!(p.get_by_id(3), Some(BLUE));
        assert_eq!(p.get_by_id(4), None);
        assert_eq!(p.slot_for(GREEN), Some(1));
    }

    #[test]
    fn test_find_closest() {
        let p = Palette::extract(&sample());
        assert_eq!(p.find_closest(Color::rgb(250, 10, 10)), Some((0, RED)));
        assert_eq!(p.find_closest(Color::rgb(0, 10, 240)), Some((2, BLUE)));
        assert_eq!(Palette::new().find_closest(RED), None);
    }

    #[test]
    fn test_strip_roundtrip() {
        let p = Palette::extract(&sample());
        let strip = p.to_strip();
        assert_eq!((strip.width(), strip.height()), (3, 1));
        assert_eq!(Palette::from_strip(&strip, Some(3)).unwrap(), p);
        assert!(matches!(
            Palette::from_strip(&strip, Some(4)),
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_digest_tracks_edits() {
        let mut p = Palette::extract(&sample());
        let d = p.digest();
        p.set(0, GREEN).unwrap();
        assert_ne!(d, p.digest());
        p.set(0, RED).unwrap();
        assert_eq!(d, p.digest());
    }
}
