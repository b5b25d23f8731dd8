//! Image decoding off the worker's control loop.

use async_trait::async_trait;
use image::DynamicImage;
use posterize::{PixelBuffer, PixelFormat};
use std::path::{Path, PathBuf};

use crate::error::SessionError;

/// An image handed over without a file, e.g. from the clipboard
#[derive(Debug, Clone)]
pub enum InMemoryImage {
    /// Encoded file contents (PNG, JPEG, ...)
    Encoded(Vec<u8>),
    /// Already decoded pixels
    Raw(PixelBuffer),
}

/// Trait for turning files and in-memory images into pixel buffers
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Decode the image file at `path`
    async fn decode_path(&self, path: &Path) -> Result<PixelBuffer, SessionError>;

    /// Decode an in-memory image
    async fn decode_image(&self, image: InMemoryImage) -> Result<PixelBuffer, SessionError>;
}

/// [`ImageSource`] backed by the `image` crate
///
/// Decoding runs on the blocking pool. 8-bit gray and RGB images keep their
/// layout; everything else is converted to 8-bit RGBA.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

#[async_trait]
impl ImageSource for ImageDecoder {
    async fn decode_path(&self, path: &Path) -> Result<PixelBuffer, SessionError> {
        let path: PathBuf = path.to_path_buf();
        let label = path.display().to_string();
        let decoded = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| SessionError::Decode(format!("{label}: decoder task failed: {e}")))?
            .map_err(|e| SessionError::Decode(format!("{label}: {e}")))?;

        tracing::debug!(
            path = %label,
            width = decoded.width(),
            height = decoded.height(),
            color = ?decoded.color(),
            "Decoded image file"
        );
        to_pixel_buffer(decoded)
    }

    async fn decode_image(&self, image: InMemoryImage) -> Result<PixelBuffer, SessionError> {
        match image {
            InMemoryImage::Raw(pixels) => Ok(pixels),
            InMemoryImage::Encoded(bytes) => {
                let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
                    .await
                    .map_err(|e| SessionError::Decode(format!("decoder task failed: {e}")))?
                    .map_err(|e| SessionError::Decode(e.to_string()))?;
                tracing::debug!(
                    width = decoded.width(),
                    height = decoded.height(),
                    "Decoded in-memory image"
                );
                to_pixel_buffer(decoded)
            }
        }
    }
}

fn to_pixel_buffer(decoded: DynamicImage) -> Result<PixelBuffer, SessionError> {
    let (width, height) = (decoded.width(), decoded.height());
    let (format, data) = match decoded {
        DynamicImage::ImageLuma8(buf) => (PixelFormat::Gray8, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (PixelFormat::Rgb8, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (PixelFormat::Rgba8, buf.into_raw()),
        other => (PixelFormat::Rgba8, other.to_rgba8().into_raw()),
    };
    Ok(PixelBuffer::new(width, height, format, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb as ImageRgb, RgbImage};
    use posterize::Rgb;
    use std::io::Cursor;

    fn encoded_rgb() -> Vec<u8> {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, ImageRgb([255, 0, 0]));
        img.put_pixel(1, 0, ImageRgb([0, 0, 255]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[tokio::test]
    async fn test_decode_encoded_png_keeps_rgb_layout() {
        let pixels = ImageDecoder
            .decode_image(InMemoryImage::Encoded(encoded_rgb()))
            .await
            .unwrap();
        assert_eq!(pixels.format(), PixelFormat::Rgb8);
        assert_eq!(pixels.rgb_at(0), Rgb::new(255, 0, 0));
        assert_eq!(pixels.rgb_at(1), Rgb::new(0, 0, 255));
    }

    #[tokio::test]
    async fn test_decode_raw_passes_through() {
        let raw = PixelBuffer::new(1, 1, PixelFormat::Rgba16, vec![0; 8]).unwrap();
        let pixels = ImageDecoder
            .decode_image(InMemoryImage::Raw(raw.clone()))
            .await
            .unwrap();
        assert_eq!(pixels, raw);
    }

    #[tokio::test]
    async fn test_decode_garbage_is_decode_error() {
        let err = ImageDecoder
            .decode_image(InMemoryImage::Encoded(b"not an image".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_decode_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageDecoder
            .decode_path(&dir.path().join("missing.png"))
            .await
            .unwrap_err();
        match err {
            SessionError::Decode(message) => assert!(message.contains("missing.png")),
            other => panic!("Expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_sixteen_bit_images_are_narrowed() {
        let wide = image::ImageBuffer::<image::Rgb<u16>, Vec<u16>>::from_pixel(
            1,
            1,
            image::Rgb([0xFFFF, 0x8080, 0]),
        );
        let pixels = to_pixel_buffer(DynamicImage::ImageRgb16(wide)).unwrap();
        assert_eq!(pixels.format(), PixelFormat::Rgba8);
        assert_eq!(pixels.data(), &[0xFF, 0x80, 0, 0xFF]);
    }
}
