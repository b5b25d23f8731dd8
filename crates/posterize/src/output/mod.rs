//! Quantization results.

mod posterized_image;

pub use posterized_image::PosterizedImage;
