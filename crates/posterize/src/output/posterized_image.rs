//! PosterizedImage: palette indices plus the palette they refer to.

use std::collections::HashMap;

use crate::buffer::{PixelBuffer, PixelFormat};
use crate::color::Rgb;
use crate::palette::Palette;
use crate::quantize::order_by_population;

/// The output of quantization.
///
/// Stores one `u8` palette index per pixel in row-major order, the
/// source's pixel layout and, for layouts with alpha, the untouched alpha
/// channel. Because every pixel is an index, the closed-palette property
/// holds by construction.
///
/// # Example
///
/// ```
/// use posterize::{quantize, PixelBuffer, Rgb};
///
/// let source = PixelBuffer::from_colors(
///     2,
///     1,
///     &[Rgb::new(200, 0, 0), Rgb::new(0, 0, 200)],
/// )
/// .unwrap();
///
/// let image = quantize(&source, 2, false).unwrap();
/// assert_eq!(image.palette().len(), 2);
/// assert_eq!(image.to_buffer(), source);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterizedImage {
    indices: Vec<u8>,
    alpha: Option<Vec<u8>>,
    width: u32,
    height: u32,
    format: PixelFormat,
    palette: Palette,
}

impl PosterizedImage {
    pub(crate) fn new(
        indices: Vec<u8>,
        alpha: Option<Vec<u8>>,
        width: u32,
        height: u32,
        format: PixelFormat,
        palette: Palette,
    ) -> Self {
        debug_assert_eq!(indices.len(), width as usize * height as usize);
        debug_assert!(indices.iter().all(|&i| (i as usize) < palette.len()));
        Self {
            indices,
            alpha,
            width,
            height,
            format,
            palette,
        }
    }

    /// Palette indices, one per pixel, row-major.
    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout of the source, reused by [`to_buffer`](Self::to_buffer).
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Color of pixel `index`.
    #[inline]
    pub fn color_at(&self, index: usize) -> Rgb {
        self.palette.color(self.indices[index] as usize)
    }

    /// Pixel count per palette entry.
    pub fn population(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.palette.len()];
        for &idx in &self.indices {
            counts[idx as usize] += 1;
        }
        counts
    }

    /// Render into a new buffer with the same layout as the source.
    ///
    /// Gray sources get the palette's red channel, which equals the gray
    /// value since every entry derived from a gray image is gray.
    pub fn to_buffer(&self) -> PixelBuffer {
        let bpp = self.format.bytes_per_pixel();
        let mut data = Vec::with_capacity(self.indices.len() * bpp);
        for (i, &idx) in self.indices.iter().enumerate() {
            let color = self.palette.color(idx as usize);
            match self.format {
                PixelFormat::Gray8 => data.push(color.r),
                PixelFormat::Rgb8 => data.extend_from_slice(&color.to_bytes()),
                PixelFormat::Rgba8 | PixelFormat::Rgba16 => {
                    let a = self.alpha.as_ref().map_or(255, |alpha| alpha[i]);
                    if self.format == PixelFormat::Rgba8 {
                        data.extend_from_slice(&[color.r, color.g, color.b, a]);
                    } else {
                        for v in [color.r, color.g, color.b, a] {
                            data.extend_from_slice(&[v, v]);
                        }
                    }
                }
            }
        }

        PixelBuffer::from_parts(self.width, self.height, self.format, data)
    }

    /// 8-bit RGBA rendering for viewers.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.indices.len() * 4);
        for (i, &idx) in self.indices.iter().enumerate() {
            let [r, g, b] = self.palette.color(idx as usize).to_bytes();
            let a = self.alpha.as_ref().map_or(255, |alpha| alpha[i]);
            rgba.extend_from_slice(&[r, g, b, a]);
        }
        rgba
    }

    /// Grayscale version derived from this (already reduced) image.
    ///
    /// Each palette entry becomes the gray of its luma. Entries that land on
    /// the same gray are merged, so the palette can only shrink. The merged
    /// palette is reordered by population like any other palette.
    pub fn to_monochrome(&self) -> PosterizedImage {
        let population = self.population();

        // Merge entries by gray value, in palette order
        let mut grays: Vec<Rgb> = Vec::with_capacity(self.palette.len());
        let mut counts: Vec<u64> = Vec::with_capacity(self.palette.len());
        let mut slot_of_gray: HashMap<Rgb, usize> = HashMap::new();
        let mut merged_slot = Vec::with_capacity(self.palette.len());
        for (i, color) in self.palette.iter().enumerate() {
            let gray = Rgb::gray(color.luma());
            let slot = *slot_of_gray.entry(gray).or_insert_with(|| {
                grays.push(gray);
                counts.push(0);
                grays.len() - 1
            });
            counts[slot] += population[i];
            merged_slot.push(slot);
        }

        let order = order_by_population(&grays, &counts);
        let mut new_index = vec![0u8; grays.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new as u8;
        }

        let remap: Vec<u8> = merged_slot.iter().map(|&slot| new_index[slot]).collect();
        let indices = self.indices.iter().map(|&i| remap[i as usize]).collect();
        let palette = Palette::from_distinct(order.iter().map(|&old| grays[old]).collect());

        PosterizedImage::new(
            indices,
            self.alpha.clone(),
            self.width,
            self.height,
            self.format,
            palette,
        )
    }
}
