//! Exact color histogram.

use std::collections::HashMap;

use crate::buffer::PixelBuffer;
use crate::color::Rgb;

/// Distinct colors of an image with their pixel counts.
///
/// Entries are sorted by packed RGB value so that everything built on top
/// of the histogram sees the colors in the same order on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    entries: Vec<(Rgb, u32)>,
}

impl Histogram {
    /// Count every pixel of `buffer`. Alpha is ignored.
    ///
    /// The caller must have checked that the format is quantizable.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let mut counts: HashMap<Rgb, u32> = HashMap::new();
        for i in 0..buffer.pixel_count() {
            *counts.entry(buffer.rgb_at(i)).or_insert(0) += 1;
        }

        let mut entries: Vec<(Rgb, u32)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|&(color, _)| color);
        Self { entries }
    }

    /// Number of distinct colors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(color, count)` pairs, ascending by color.
    #[inline]
    pub fn entries(&self) -> &[(Rgb, u32)] {
        &self.entries
    }
}
