//! Pixel buffers handed to and returned from the engine.

mod pixel_buffer;

pub use pixel_buffer::{PixelBuffer, PixelFormat};
