//! Public API for the posterize crate.
//!
//! This module provides the high-level API: the [`Posterizer`] builder, the
//! [`quantize`] shorthand and the [`PosterizeError`] error type.

mod builder;
mod error;

pub use builder::{quantize, Posterizer};
pub use error::{PosterizeError, MAX_COLORS, MIN_COLORS};
