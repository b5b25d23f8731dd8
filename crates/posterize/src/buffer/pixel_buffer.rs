//! Raw pixel storage.

use std::fmt;

use crate::api::PosterizeError;
use crate::color::Rgb;

/// Memory layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One byte of luminance per pixel.
    Gray8,
    /// Three bytes per pixel, R G B.
    Rgb8,
    /// Four bytes per pixel, R G B A (straight alpha).
    Rgba8,
    /// Eight bytes per pixel, big-endian 16-bit R G B A.
    ///
    /// Can be stored and moved around but not quantized.
    Rgba16,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgba16 => 8,
        }
    }

    /// Whether the engine can quantize this layout.
    #[inline]
    pub fn is_quantizable(self) -> bool {
        !matches!(self, PixelFormat::Rgba16)
    }

    /// Whether the layout carries an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8 | PixelFormat::Rgba16)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Rgb8 => "rgb8",
            PixelFormat::Rgba8 => "rgba8",
            PixelFormat::Rgba16 => "rgba16",
        };
        f.write_str(name)
    }
}

/// An image as a flat, row-major byte buffer in one [`PixelFormat`].
///
/// # Example
///
/// ```
/// use posterize::{PixelBuffer, PixelFormat, Rgb};
///
/// let buffer = PixelBuffer::new(2, 1, PixelFormat::Rgb8, vec![255, 0, 0, 0, 0, 255]).unwrap();
/// assert_eq!(buffer.rgb_at(1), Rgb::new(0, 0, 255));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap `data` as a `width` x `height` image.
    ///
    /// # Errors
    ///
    /// [`PosterizeError::BufferSize`] if `data` does not hold exactly
    /// `width * height` pixels of `format`.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, PosterizeError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(PosterizeError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Assemble a buffer whose length the caller has already guaranteed.
    pub(crate) fn from_parts(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * format.bytes_per_pixel()
        );
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Build an RGB image from a list of colors in row-major order.
    pub fn from_colors(width: u32, height: u32, colors: &[Rgb]) -> Result<Self, PosterizeError> {
        let data = colors.iter().flat_map(|c| c.to_bytes()).collect();
        Self::new(width, height, PixelFormat::Rgb8, data)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Give up the buffer and return its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Color of pixel `index` (row-major). Alpha is ignored.
    ///
    /// # Panics
    ///
    /// Panics for [`PixelFormat::Rgba16`] or an out-of-range index.
    #[inline]
    pub fn rgb_at(&self, index: usize) -> Rgb {
        match self.format {
            PixelFormat::Gray8 => Rgb::gray(self.data[index]),
            PixelFormat::Rgb8 => {
                let i = index * 3;
                Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
            }
            PixelFormat::Rgba8 => {
                let i = index * 4;
                Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
            }
            PixelFormat::Rgba16 => panic!("rgb_at is not defined for rgba16 buffers"),
        }
    }

    /// Alpha of pixel `index`; 255 for layouts without alpha.
    #[inline]
    pub fn alpha_at(&self, index: usize) -> u8 {
        match self.format {
            PixelFormat::Rgba8 => self.data[index * 4 + 3],
            PixelFormat::Rgba16 => self.data[index * 8 + 6],
            PixelFormat::Gray8 | PixelFormat::Rgb8 => 255,
        }
    }

    /// Whether every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        match self.format {
            PixelFormat::Gray8 | PixelFormat::Rgb8 => true,
            _ => (0..self.pixel_count()).all(|i| self.alpha_at(i) == 255),
        }
    }

    /// Expand to 8-bit RGBA, the layout handed to viewers.
    ///
    /// 16-bit buffers keep the high byte of each channel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixel_count() * 4);
        match self.format {
            PixelFormat::Rgba8 => rgba.extend_from_slice(&self.data),
            PixelFormat::Rgba16 => {
                for px in self.data.chunks_exact(8) {
                    rgba.extend_from_slice(&[px[0], px[2], px[4], px[6]]);
                }
            }
            PixelFormat::Gray8 | PixelFormat::Rgb8 => {
                for i in 0..self.pixel_count() {
                    let [r, g, b] = self.rgb_at(i).to_bytes();
                    rgba.extend_from_slice(&[r, g, b, 255]);
                }
            }
        }
        rgba
    }
}
