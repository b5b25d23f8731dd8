//! Ordered palette with nearest-color matching.

use std::collections::HashSet;

use super::error::PaletteError;
use crate::color::Rgb;

/// Maximum number of entries a palette can hold.
///
/// Quantized pixels store their palette index as `u8`.
pub const MAX_PALETTE_LEN: usize = 256;

/// An ordered set of distinct colors.
///
/// The order is part of the value: two palettes with the same colors in a
/// different order are different palettes, and quantized images refer to
/// entries by position.
///
/// # Example
///
/// ```
/// use posterize::{Palette, Rgb};
///
/// let palette = Palette::new(&[Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]).unwrap();
///
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.nearest(Rgb::new(200, 200, 200)), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Create a palette from colors in the order given.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::TooManyColors`] if there are more than 256 colors
    /// - [`PaletteError::DuplicateColor`] if a color appears twice
    pub fn new(colors: &[Rgb]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > MAX_PALETTE_LEN {
            return Err(PaletteError::TooManyColors { len: colors.len() });
        }

        let mut seen = HashSet::with_capacity(colors.len());
        for (index, color) in colors.iter().enumerate() {
            if !seen.insert(*color) {
                return Err(PaletteError::DuplicateColor { index });
            }
        }

        Ok(Self {
            colors: colors.to_vec(),
        })
    }

    /// Build from entries the engine already knows to be distinct.
    pub(crate) fn from_distinct(colors: Vec<Rgb>) -> Self {
        debug_assert!(!colors.is_empty() && colors.len() <= MAX_PALETTE_LEN);
        debug_assert_eq!(
            colors.iter().collect::<HashSet<_>>().len(),
            colors.len(),
            "palette entries must be distinct"
        );
        Self { colors }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a palette has at least one entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Entry at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index]
    }

    /// All entries in palette order.
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Iterate over the entries in palette order.
    pub fn iter(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors.iter().copied()
    }

    /// Whether `color` is one of the entries.
    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Position of `color` in the palette, if present.
    pub fn position(&self, color: Rgb) -> Option<usize> {
        self.colors.iter().position(|&c| c == color)
    }

    /// Whether every entry is a neutral gray.
    pub fn is_grayscale(&self) -> bool {
        self.colors.iter().all(|c| c.is_gray())
    }

    /// Index of the entry closest to `color` in RGB distance.
    ///
    /// Ties go to the lowest index, so the result only depends on the
    /// palette order.
    pub fn nearest(&self, color: Rgb) -> usize {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, &entry) in self.colors.iter().enumerate() {
            let dist = entry.distance_sq(color);
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Entries formatted as `#RRGGBB`.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Rgb;
    type IntoIter = std::slice::Iter<'a, Rgb>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
