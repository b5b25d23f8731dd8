//! 8-bit RGB color type
//!
//! Palettes and quantized pixels are exchanged as plain 8-bit sRGB triples.
//! No gamma handling happens here: the engine works on the encoded values
//! exactly as they are stored in the image.

use std::fmt;

/// A color with 8-bit red, green and blue channels.
///
/// Ordering follows the packed `0xRRGGBB` value, which is what the engine
/// uses to break ties deterministically.
///
/// Colors are built from channel values; `Rgb` is not parsed from text:
///
/// ```compile_fail
/// let color: posterize::Rgb = "€".parse().unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    /// Red channel (0..=255)
    pub r: u8,
    /// Green channel (0..=255)
    pub g: u8,
    /// Blue channel (0..=255)
    pub b: u8,
}

impl Rgb {
    /// Create a color from its three channels.
    ///
    /// # Example
    /// ```
    /// use posterize::Rgb;
    /// let red = Rgb::new(255, 0, 0);
    /// assert_eq!(red.packed(), 0xFF0000);
    /// ```
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A gray with all three channels set to `v`.
    #[inline]
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Create a color from a byte array [R, G, B].
    #[inline]
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Convert to a byte array [R, G, B].
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// The color packed as `0xRRGGBB`.
    #[inline]
    pub fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Inverse of [`packed`](Self::packed). Bits above 24 are ignored.
    #[inline]
    pub fn from_packed(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Channel value along one axis (0 = red, 1 = green, 2 = blue).
    #[inline]
    pub fn channel(self, axis: usize) -> u8 {
        match axis {
            0 => self.r,
            1 => self.g,
            _ => self.b,
        }
    }

    /// Rec. 601 luma, rounded to the nearest integer.
    ///
    /// Integer arithmetic keeps the result identical on every platform.
    ///
    /// # Example
    /// ```
    /// use posterize::Rgb;
    /// assert_eq!(Rgb::new(255, 255, 255).luma(), 255);
    /// assert_eq!(Rgb::new(0, 0, 0).luma(), 0);
    /// ```
    #[inline]
    pub fn luma(self) -> u8 {
        let weighted = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        ((weighted + 500) / 1000) as u8
    }

    /// Whether the color is a neutral gray (R == G == B).
    #[inline]
    pub fn is_gray(self) -> bool {
        self.r == self.g && self.g == self.b
    }

    /// Squared Euclidean distance in RGB.
    #[inline]
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Format as `#RRGGBB` (uppercase).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_round_trip_keeps_channels() {
        let color = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(color.packed(), 0x123456);
        assert_eq!(Rgb::from_packed(0x123456), color);
    }

    #[test]
    fn test_ordering_follows_packed_value() {
        let mut colors = vec![
            Rgb::new(0, 0, 255),
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
        ];
        colors.sort();
        assert_eq!(
            colors,
            vec![Rgb::new(0, 0, 255), Rgb::new(0, 255, 0), Rgb::new(255, 0, 0)]
        );
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(Rgb::new(255, 0, 0).luma(), 76);
        assert_eq!(Rgb::new(0, 255, 0).luma(), 150);
        assert_eq!(Rgb::new(0, 0, 255).luma(), 29);
        for v in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(Rgb::gray(v).luma(), v, "gray {v} must keep its value");
        }
    }

    #[test]
    fn test_distance_sq() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        assert_eq!(black.distance_sq(black), 0);
        assert_eq!(black.distance_sq(white), 3 * 255 * 255);
        assert_eq!(white.distance_sq(black), black.distance_sq(white));
    }

    #[test]
    fn test_hex_formatting() {
        let color = Rgb::new(0xAB, 0x05, 0xFF);
        assert_eq!(color.to_hex(), "#AB05FF");
        assert_eq!(color.to_string(), "#AB05FF");
    }
}
