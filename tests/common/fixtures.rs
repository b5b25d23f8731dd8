//! Test images and constants.

use image::{Rgba, RgbaImage};

/// Colors of the four-color fixture, in pixel order
pub mod colors {
    pub const RED: [u8; 3] = [255, 0, 0];
    pub const GREEN: [u8; 3] = [0, 255, 0];
    pub const BLUE: [u8; 3] = [0, 0, 255];
    pub const WHITE: [u8; 3] = [255, 255, 255];

    pub const ALL: [[u8; 3]; 4] = [RED, GREEN, BLUE, WHITE];
}

/// 2x2 image with one pixel of each of [`colors::ALL`]
pub fn four_colors() -> RgbaImage {
    let mut img = RgbaImage::new(2, 2);
    for (i, [r, g, b]) in colors::ALL.into_iter().enumerate() {
        img.put_pixel(i as u32 % 2, i as u32 / 2, Rgba([r, g, b, 255]));
    }
    img
}

/// Two gray clusters: dark left half, light right half
pub fn two_clusters() -> RgbaImage {
    RgbaImage::from_fn(4, 2, |x, y| {
        let v = match (x, y) {
            (0, 0) => 0,
            (1, 0) => 10,
            (0, 1) => 4,
            (1, 1) => 6,
            (2, 0) => 245,
            (3, 0) => 255,
            (2, 1) => 249,
            _ => 251,
        };
        Rgba([v, v, v, 255])
    })
}

/// Smooth color gradient with many distinct colors
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(2).saturating_sub(1)) as u8;
        let g = (y * 255 / height.max(2).saturating_sub(1)) as u8;
        let b = ((x + y) * 127 / (width + height).max(1)) as u8;
        Rgba([r, g, b, 255])
    })
}

/// Expected RGBA bytes of an image, row-major
pub fn rgba_bytes(img: &RgbaImage) -> Vec<u8> {
    img.as_raw().clone()
}
