#![allow(clippy::module_inception, clippy::needless_range_loop)]

//! posterize: deterministic color reduction for photographs
//!
//! This library reduces an image to a small, ordered palette using a
//! weighted median cut over the exact color histogram, and can derive a
//! grayscale rendition from the reduced result.
//!
//! # Quick Start
//!
//! The [`Posterizer`] builder is the primary entry point:
//!
//! ```
//! use posterize::{PixelBuffer, Posterizer, Rgb};
//!
//! let pixels = [
//!     Rgb::new(250, 10, 10),
//!     Rgb::new(240, 20, 20),
//!     Rgb::new(10, 10, 250),
//!     Rgb::new(20, 20, 240),
//! ];
//! let source = PixelBuffer::from_colors(2, 2, &pixels).unwrap();
//!
//! let image = Posterizer::new(2).quantize(&source).unwrap();
//! assert_eq!(image.palette().len(), 2);
//! let idx = image.indices();
//! assert_eq!(idx[0], idx[1]);
//! assert_ne!(idx[1], idx[2]);
//! ```
//!
//! # Guarantees
//!
//! - **Closed palette**: every output pixel is one of the palette entries.
//!   [`PosterizedImage`] stores indices, so this holds by construction.
//! - **Bounded size**: the palette never has more entries than requested,
//!   and never more than the image has distinct colors.
//! - **Determinism**: the same buffer and settings always give the same
//!   palette (same order) and the same pixels.
//! - **Monochrome**: with [`Posterizer::monochrome`] every entry is a gray,
//!   and there are never more grays than the color reduction produced.
//!
//! # Palette Order
//!
//! Entries are ordered by the number of pixels they cover, most first.
//! Equal counts are ordered by ascending `0xRRGGBB` value.
//!
//! # Pixel Layouts
//!
//! [`PixelFormat::Gray8`], [`PixelFormat::Rgb8`] and [`PixelFormat::Rgba8`]
//! can be quantized. Alpha is carried through unchanged and does not take
//! part in the reduction. [`PixelFormat::Rgba16`] buffers are rejected with
//! [`PosterizeError::UnsupportedFormat`].

pub mod api;
pub mod buffer;
pub mod color;
pub mod output;
pub mod palette;
pub mod quantize;

#[cfg(test)]
mod domain_tests;

pub use api::{quantize, PosterizeError, Posterizer, MAX_COLORS, MIN_COLORS};
pub use buffer::{PixelBuffer, PixelFormat};
pub use color::Rgb;
pub use output::PosterizedImage;
pub use palette::{Palette, PaletteError, MAX_PALETTE_LEN};
