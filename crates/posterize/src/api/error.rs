//! Unified error type for the posterize public API.

use crate::buffer::PixelFormat;
use crate::palette::PaletteError;
use std::fmt;

/// Smallest color count the engine accepts.
pub const MIN_COLORS: u16 = 2;
/// Largest color count the engine accepts.
pub const MAX_COLORS: u16 = 256;

/// Errors returned by buffer construction and quantization.
///
/// The engine never clamps its inputs: an out-of-range color count or an
/// unsupported layout is reported, and the source buffer is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum PosterizeError {
    /// Color count outside `MIN_COLORS..=MAX_COLORS`
    InvalidParameter {
        /// The rejected color count
        color_count: u16,
    },
    /// The buffer's pixel layout cannot be quantized
    UnsupportedFormat(PixelFormat),
    /// Byte length does not match the declared dimensions
    BufferSize {
        /// Bytes required by width, height and format
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },
    /// Palette validation error
    Palette(PaletteError),
}

impl fmt::Display for PosterizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosterizeError::InvalidParameter { color_count } => write!(
                f,
                "color count {} is outside {}..={}",
                color_count, MIN_COLORS, MAX_COLORS
            ),
            PosterizeError::UnsupportedFormat(format) => {
                write!(f, "pixel format {} cannot be quantized", format)
            }
            PosterizeError::BufferSize { expected, actual } => write!(
                f,
                "pixel data has {} bytes, expected {}",
                actual, expected
            ),
            PosterizeError::Palette(err) => write!(f, "palette error: {}", err),
        }
    }
}

impl std::error::Error for PosterizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PosterizeError::Palette(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PaletteError> for PosterizeError {
    fn from(err: PaletteError) -> Self {
        PosterizeError::Palette(err)
    }
}
