//! Palette types and utilities
//!
//! This module provides the ordered [`Palette`] produced by quantization and
//! the error raised when a palette is built from invalid colors.

mod error;
mod palette;

pub use error::PaletteError;
pub use palette::{Palette, MAX_PALETTE_LEN};
