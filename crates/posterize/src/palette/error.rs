//! Palette construction errors.

use std::fmt;

use super::palette::MAX_PALETTE_LEN;

/// Why a list of colors cannot become a [`Palette`](super::Palette).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
    /// The list has no colors; also raised for images without pixels
    EmptyPalette,
    /// More entries than a `u8` index can address
    TooManyColors { len: usize },
    /// Entry `index` repeats an earlier entry
    DuplicateColor { index: usize },
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PaletteError::EmptyPalette => f.write_str("no colors to build a palette from"),
            PaletteError::TooManyColors { len } => {
                write!(f, "{len} colors exceed the {MAX_PALETTE_LEN}-entry limit")
            }
            PaletteError::DuplicateColor { index } => {
                write!(f, "entry {index} repeats an earlier color")
            }
        }
    }
}

impl std::error::Error for PaletteError {}
