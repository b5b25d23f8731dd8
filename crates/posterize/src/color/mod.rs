//! Color type used for palettes and quantized pixels
//!
//! # Example
//!
//! ```
//! use posterize::Rgb;
//!
//! let teal = Rgb::new(0x00, 0x80, 0x80);
//! assert_eq!(teal.to_hex(), "#008080");
//! assert!(!teal.is_gray());
//! ```

mod rgb;

pub use rgb::Rgb;
