//! PNG encoding for saved images and palette strips.

use posterize::{Palette, PixelBuffer, Rgb};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use crate::error::ExportError;
use crate::models::{ExportConfig, MAX_SWATCH_SIZE};

/// Encode a quantized image.
///
/// Opaque images become indexed PNGs with `palette` as PLTE; images with
/// transparency are written as 8-bit RGBA.
pub fn encode_image(
    pixels: &PixelBuffer,
    palette: &Palette,
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    let (width, height) = (pixels.width(), pixels.height());

    let png_bytes = if pixels.is_opaque() {
        let lookup: HashMap<Rgb, u8> = palette
            .iter()
            .enumerate()
            .map(|(i, color)| (color, i as u8))
            .collect();
        let mut indices = Vec::with_capacity(pixels.pixel_count());
        for i in 0..pixels.pixel_count() {
            let color = pixels.rgb_at(i);
            let idx = lookup.get(&color).ok_or_else(|| {
                ExportError::PngEncode(format!("pixel color {color} is not in the palette"))
            })?;
            indices.push(*idx);
        }
        encode_indexed(width, height, palette, &indices)?
    } else {
        encode_png(
            width,
            height,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            None,
            &pixels.to_rgba8(),
        )?
    };

    Ok(finish(png_bytes, config))
}

/// Encode `palette` as a horizontal strip of square swatches.
pub fn encode_palette(palette: &Palette, config: &ExportConfig) -> Result<Vec<u8>, ExportError> {
    let swatch = config.swatch_size.clamp(1, MAX_SWATCH_SIZE);
    // At most 256 entries of at most MAX_SWATCH_SIZE px
    let width = swatch * palette.len() as u32;
    let height = swatch;

    let row: Vec<u8> = (0..width).map(|x| (x / swatch) as u8).collect();
    let indices = row.repeat(height as usize);

    let png_bytes = encode_indexed(width, height, palette, &indices)?;
    Ok(finish(png_bytes, config))
}

/// Write encoded bytes to `path`.
pub fn write_png(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Wrote PNG");
    Ok(())
}

fn encode_indexed(
    width: u32,
    height: u32,
    palette: &Palette,
    indices: &[u8],
) -> Result<Vec<u8>, ExportError> {
    let (depth, bits) = match palette.len() {
        0..=2 => (png::BitDepth::One, 1),
        3..=4 => (png::BitDepth::Two, 2),
        5..=16 => (png::BitDepth::Four, 4),
        _ => (png::BitDepth::Eight, 8),
    };
    let plte: Vec<u8> = palette.iter().flat_map(|c| c.to_bytes()).collect();
    let packed = if bits == 8 {
        indices.to_vec()
    } else {
        pack_nbits(indices, width, bits)
    };
    encode_png(
        width,
        height,
        png::ColorType::Indexed,
        depth,
        Some(&plte),
        &packed,
    )
}

/// Optionally re-compress with oxipng; keeps the input if that fails.
fn finish(png_bytes: Vec<u8>, config: &ExportConfig) -> Vec<u8> {
    if !config.optimize {
        return png_bytes;
    }
    match oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    ) {
        Ok(optimized) => optimized,
        Err(e) => {
            tracing::warn!(%e, "PNG optimization failed, keeping unoptimized output");
            png_bytes
        }
    }
}

/// Encode packed pixel data as a PNG.
fn encode_png(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    plte: Option<&[u8]>,
    packed: &[u8],
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(packed)
            .map_err(|e| ExportError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Pack palette indices into N-bit PNG row data (1, 2, or 4 bits per pixel).
fn pack_nbits(indices: &[u8], width: u32, bits: u8) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = (width as usize).div_ceil(pixels_per_byte);
    let height = indices.len() / width as usize;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width as usize) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterize::PixelFormat;

    fn no_optimize() -> ExportConfig {
        ExportConfig {
            swatch_size: 4,
            optimize: false,
        }
    }

    fn decode(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(Cursor::new(bytes));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    #[test]
    fn test_pack_nbits_two_bit() {
        // 5 pixels at 2 bits: 4 per byte, second byte padded
        let packed = pack_nbits(&[0, 1, 2, 3, 1], 5, 2);
        assert_eq!(packed, vec![0b00_01_10_11, 0b01_00_00_00]);
    }

    #[test]
    fn test_pack_nbits_one_bit_rows() {
        let packed = pack_nbits(&[1, 0, 1, 0, 1, 1], 3, 1);
        assert_eq!(packed, vec![0b1010_0000, 0b0110_0000]);
    }

    #[test]
    fn test_opaque_image_is_indexed() {
        let palette = Palette::new(&[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]).unwrap();
        let pixels = PixelBuffer::from_colors(
            2,
            2,
            &[
                Rgb::new(255, 0, 0),
                Rgb::new(0, 0, 255),
                Rgb::new(0, 0, 255),
                Rgb::new(255, 0, 0),
            ],
        )
        .unwrap();

        let bytes = encode_image(&pixels, &palette, &no_optimize()).unwrap();
        let (info, _) = decode(&bytes);
        assert_eq!(info.color_type, png::ColorType::Indexed);
        assert_eq!(info.bit_depth, png::BitDepth::One);
        assert_eq!((info.width, info.height), (2, 2));
    }

    #[test]
    fn test_transparent_image_is_rgba() {
        let palette = Palette::new(&[Rgb::new(1, 2, 3)]).unwrap();
        let pixels =
            PixelBuffer::new(1, 1, PixelFormat::Rgba8, vec![1, 2, 3, 128]).unwrap();

        let bytes = encode_image(&pixels, &palette, &no_optimize()).unwrap();
        let (info, data) = decode(&bytes);
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(data, vec![1, 2, 3, 128]);
    }

    #[test]
    fn test_off_palette_pixel_is_rejected() {
        let palette = Palette::new(&[Rgb::gray(0)]).unwrap();
        let pixels = PixelBuffer::from_colors(1, 1, &[Rgb::gray(9)]).unwrap();
        let err = encode_image(&pixels, &palette, &no_optimize()).unwrap_err();
        assert!(matches!(err, ExportError::PngEncode(_)));
    }

    #[test]
    fn test_palette_strip_layout() {
        let palette = Palette::new(&[Rgb::gray(0), Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)]).unwrap();
        let bytes = encode_palette(&palette, &no_optimize()).unwrap();
        let (info, _) = decode(&bytes);
        assert_eq!((info.width, info.height), (12, 4));
        assert_eq!(info.color_type, png::ColorType::Indexed);
        assert_eq!(info.bit_depth, png::BitDepth::Two);
    }

    #[test]
    fn test_oversized_swatch_is_capped() {
        let palette = Palette::new(&[Rgb::gray(0), Rgb::gray(255)]).unwrap();
        let config = ExportConfig {
            swatch_size: u32::MAX,
            optimize: false,
        };
        let bytes = encode_palette(&palette, &config).unwrap();
        let (info, _) = decode(&bytes);
        assert_eq!((info.width, info.height), (2 * MAX_SWATCH_SIZE, MAX_SWATCH_SIZE));
    }

    #[test]
    fn test_optimized_output_still_decodes() {
        let palette = Palette::new(&[Rgb::gray(0), Rgb::gray(255)]).unwrap();
        let config = ExportConfig {
            swatch_size: 8,
            optimize: true,
        };
        let bytes = encode_palette(&palette, &config).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (16, 8));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(15, 7).0, [255, 255, 255, 255]);
    }
}
