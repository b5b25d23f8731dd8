//! Paletti - reduce an image to a small, adjustable palette
//!
//! Session plumbing around the `posterize` engine: buffer ownership,
//! debounced recomputation and result publishing.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod console;
pub mod error;
pub mod models;
pub mod services;
