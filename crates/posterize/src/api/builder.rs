//! Posterizer builder -- the primary entry point for the crate.

use std::collections::HashMap;

use super::error::{PosterizeError, MAX_COLORS, MIN_COLORS};
use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::output::PosterizedImage;
use crate::palette::{Palette, PaletteError};
use crate::quantize::{median_cut, order_by_population, Histogram};

/// Reduces an image to a small ordered palette.
///
/// # Design
///
/// - Configuration methods consume and return `self`
/// - [`quantize()`](Self::quantize) takes `&self`, so one posterizer can be
///   reused across images
/// - Identical inputs always produce identical output: histogram entries,
///   box splits and palette order all have explicit tie-breaks
///
/// # Example
///
/// ```
/// use posterize::{PixelBuffer, Posterizer, Rgb};
///
/// let pixels: Vec<Rgb> = (0..16).map(|i| Rgb::gray(i * 16)).collect();
/// let source = PixelBuffer::from_colors(4, 4, &pixels).unwrap();
///
/// let image = Posterizer::new(4).quantize(&source).unwrap();
/// assert_eq!(image.palette().len(), 4);
///
/// let mono = Posterizer::new(4).monochrome(true).quantize(&source).unwrap();
/// assert!(mono.palette().is_grayscale());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posterizer {
    color_count: u16,
    monochrome: bool,
}

impl Posterizer {
    /// Create a posterizer producing at most `color_count` colors.
    ///
    /// The count is validated when [`quantize`](Self::quantize) runs.
    pub fn new(color_count: u16) -> Self {
        Self {
            color_count,
            monochrome: false,
        }
    }

    /// Convert the reduced image to grays.
    #[inline]
    pub fn monochrome(mut self, enabled: bool) -> Self {
        self.monochrome = enabled;
        self
    }

    #[inline]
    pub fn color_count(&self) -> u16 {
        self.color_count
    }

    #[inline]
    pub fn is_monochrome(&self) -> bool {
        self.monochrome
    }

    /// Quantize `source`.
    ///
    /// In monochrome mode the color reduction runs first and the grays are
    /// derived from its result, see [`PosterizedImage::to_monochrome`].
    ///
    /// # Errors
    ///
    /// - [`PosterizeError::InvalidParameter`] for a color count outside `2..=256`
    /// - [`PosterizeError::UnsupportedFormat`] for 16-bit buffers
    /// - [`PosterizeError::Palette`] with [`PaletteError::EmptyPalette`] for
    ///   an image without pixels
    pub fn quantize(&self, source: &PixelBuffer) -> Result<PosterizedImage, PosterizeError> {
        let reduced = self.reduce(source)?;
        if self.monochrome {
            Ok(reduced.to_monochrome())
        } else {
            Ok(reduced)
        }
    }

    fn reduce(&self, source: &PixelBuffer) -> Result<PosterizedImage, PosterizeError> {
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.color_count) {
            return Err(PosterizeError::InvalidParameter {
                color_count: self.color_count,
            });
        }
        if !source.format().is_quantizable() {
            return Err(PosterizeError::UnsupportedFormat(source.format()));
        }

        let histogram = Histogram::from_buffer(source);
        if histogram.is_empty() {
            return Err(PaletteError::EmptyPalette.into());
        }

        // 1. Representatives, deduplicated in color order
        let mut candidates = median_cut(histogram.entries(), self.color_count as usize);
        candidates.sort_unstable();
        candidates.dedup();

        // 2. Nearest representative for every histogram color
        let candidates = Palette::from_distinct(candidates);
        let mut counts = vec![0u64; candidates.len()];
        let mut assigned = HashMap::with_capacity(histogram.len());
        for &(color, count) in histogram.entries() {
            let idx = candidates.nearest(color);
            counts[idx] += count as u64;
            assigned.insert(color, idx);
        }

        // 3. Final order; representatives nothing maps to are dropped
        let order = order_by_population(candidates.colors(), &counts);
        let mut new_index = vec![0u8; candidates.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new as u8;
        }
        let palette = Palette::from_distinct(order.iter().map(|&i| candidates.color(i)).collect());
        let lookup: HashMap<Rgb, u8> = assigned
            .into_iter()
            .map(|(color, idx)| (color, new_index[idx]))
            .collect();

        // 4. Per-pixel indices
        let mut indices = Vec::with_capacity(source.pixel_count());
        for i in 0..source.pixel_count() {
            indices.push(lookup[&source.rgb_at(i)]);
        }
        let alpha = source
            .format()
            .has_alpha()
            .then(|| (0..source.pixel_count()).map(|i| source.alpha_at(i)).collect());

        Ok(PosterizedImage::new(
            indices,
            alpha,
            source.width(),
            source.height(),
            source.format(),
            palette,
        ))
    }
}

/// Quantize `source` to at most `color_count` colors.
///
/// Shorthand for `Posterizer::new(color_count).monochrome(monochrome).quantize(source)`.
pub fn quantize(
    source: &PixelBuffer,
    color_count: u16,
    monochrome: bool,
) -> Result<PosterizedImage, PosterizeError> {
    Posterizer::new(color_count)
        .monochrome(monochrome)
        .quantize(source)
}
