//! Domain-critical regression tests for posterize.
//!
//! Each test states the property it protects and what a failure means.

#[cfg(test)]
mod domain_tests {
    use crate::api::{quantize, PosterizeError, Posterizer};
    use crate::buffer::{PixelBuffer, PixelFormat};
    use crate::color::Rgb;
    use pretty_assertions::assert_eq;

    /// A 32x32 photo-like gradient with a few hundred distinct colors.
    fn photo() -> PixelBuffer {
        let mut colors = Vec::with_capacity(32 * 32);
        for y in 0..32u32 {
            for x in 0..32u32 {
                colors.push(Rgb::new(
                    (x * 8) as u8,
                    (y * 8) as u8,
                    ((x + y) * 4) as u8,
                ));
            }
        }
        PixelBuffer::from_colors(32, 32, &colors).unwrap()
    }

    fn four_colors() -> PixelBuffer {
        PixelBuffer::from_colors(
            2,
            2,
            &[
                Rgb::new(255, 0, 0),
                Rgb::new(0, 255, 0),
                Rgb::new(0, 0, 255),
                Rgb::new(255, 255, 255),
            ],
        )
        .unwrap()
    }

    // ========================================================================
    // Output invariants
    // ========================================================================

    /// If this breaks, it means: some output pixel was written with a color
    /// that is not in the reported palette, so a saved palette strip would
    /// not describe the image.
    #[test]
    fn test_every_output_pixel_is_a_palette_entry() {
        let source = photo();
        for count in [2u16, 3, 6, 16, 32] {
            let image = quantize(&source, count, false).unwrap();
            let out = image.to_buffer();
            for i in 0..out.pixel_count() {
                assert!(
                    image.palette().contains(out.rgb_at(i)),
                    "pixel {} of the {}-color result is off-palette",
                    i,
                    count
                );
            }
        }
    }

    /// If this breaks, it means: the palette can grow past the requested
    /// count or past the number of colors the image actually has.
    #[test]
    fn test_palette_size_is_bounded() {
        let source = photo();
        for count in [2u16, 5, 17, 64, 256] {
            let image = quantize(&source, count, false).unwrap();
            assert!(image.palette().len() <= count as usize);
        }

        let tiny = four_colors();
        assert!(quantize(&tiny, 256, false).unwrap().palette().len() <= 4);
    }

    /// If this breaks, it means: two runs over the same input disagree,
    /// most likely from iterating a hash map or an unstable tie-break.
    #[test]
    fn test_quantization_is_deterministic() {
        let source = photo();
        for count in [3u16, 8, 16] {
            let first = quantize(&source, count, false).unwrap();
            let second = quantize(&source, count, false).unwrap();
            assert_eq!(first, second, "{} colors differ between runs", count);
            assert_eq!(first.palette().colors(), second.palette().colors());
        }
    }

    /// If this breaks, it means: palette order no longer follows pixel
    /// population, which changes what saved palette strips look like.
    #[test]
    fn test_palette_is_ordered_by_population() {
        let image = quantize(&photo(), 8, false).unwrap();
        let population = image.population();
        assert!(population.iter().all(|&n| n > 0), "unused palette entry");
        for pair in population.windows(2) {
            assert!(pair[0] >= pair[1], "population not descending: {:?}", population);
        }
    }

    /// If this breaks, it means: the engine wrote into the caller's buffer.
    #[test]
    fn test_source_buffer_is_not_modified() {
        let source = photo();
        let before = source.clone();
        let _ = quantize(&source, 4, true).unwrap();
        assert_eq!(source, before);
    }

    // ========================================================================
    // Small images
    // ========================================================================

    /// If this breaks, it means: an image that already fits the palette is
    /// no longer reproduced exactly.
    #[test]
    fn test_image_within_budget_is_unchanged() {
        let source = four_colors();
        let image = quantize(&source, 4, false).unwrap();
        assert_eq!(image.palette().len(), 4);
        assert_eq!(image.to_buffer(), source);
    }

    /// If this breaks, it means: clearly separated clusters are no longer
    /// each mapped to their own representative.
    #[test]
    fn test_two_clusters_map_to_their_means() {
        let dark = [Rgb::new(0, 0, 0), Rgb::new(10, 10, 10)];
        let light = [Rgb::new(240, 240, 240), Rgb::new(250, 250, 250)];
        let source = PixelBuffer::from_colors(
            4,
            1,
            &[dark[0], light[0], dark[1], light[1]],
        )
        .unwrap();

        let image = quantize(&source, 2, false).unwrap();
        let out = image.to_buffer();
        assert_eq!(out.rgb_at(0), Rgb::gray(5));
        assert_eq!(out.rgb_at(2), Rgb::gray(5));
        assert_eq!(out.rgb_at(1), Rgb::gray(245));
        assert_eq!(out.rgb_at(3), Rgb::gray(245));
    }

    /// If this breaks, it means: a single-color image produces an empty or
    /// padded palette.
    #[test]
    fn test_single_color_image() {
        let source = PixelBuffer::from_colors(3, 3, &[Rgb::new(12, 34, 56); 9]).unwrap();
        let image = quantize(&source, 6, false).unwrap();
        assert_eq!(image.palette().colors(), &[Rgb::new(12, 34, 56)]);
        assert!(image.indices().iter().all(|&i| i == 0));
    }

    // ========================================================================
    // Monochrome
    // ========================================================================

    /// If this breaks, it means: monochrome output contains a tinted entry.
    #[test]
    fn test_monochrome_palette_is_gray() {
        let image = quantize(&photo(), 8, true).unwrap();
        assert!(image.palette().is_grayscale());
        assert!(image.palette().len() <= 8);

        let out = image.to_buffer();
        for i in 0..out.pixel_count() {
            assert!(out.rgb_at(i).is_gray());
        }
    }

    /// If this breaks, it means: monochrome is computed from the source
    /// instead of from the reduced image, so it can show more tones than
    /// the color result.
    #[test]
    fn test_monochrome_never_exceeds_color_result() {
        let source = photo();
        for count in [2u16, 4, 8, 16] {
            let color = quantize(&source, count, false).unwrap();
            let mono = quantize(&source, count, true).unwrap();
            assert!(mono.palette().len() <= color.palette().len());
            assert_eq!(color.to_monochrome(), mono);
        }
    }

    // ========================================================================
    // Rejected inputs
    // ========================================================================

    /// If this breaks, it means: out-of-range counts are silently clamped
    /// by the engine instead of being reported.
    #[test]
    fn test_out_of_range_counts_are_rejected() {
        let source = four_colors();
        assert_eq!(
            Posterizer::new(1).quantize(&source),
            Err(PosterizeError::InvalidParameter { color_count: 1 })
        );
        assert_eq!(
            Posterizer::new(257).monochrome(true).quantize(&source),
            Err(PosterizeError::InvalidParameter { color_count: 257 })
        );
    }

    /// If this breaks, it means: 16-bit buffers reach the 8-bit code path.
    #[test]
    fn test_sixteen_bit_buffers_are_rejected() {
        let source = PixelBuffer::new(2, 1, PixelFormat::Rgba16, vec![0xFF; 16]).unwrap();
        assert_eq!(
            quantize(&source, 4, false),
            Err(PosterizeError::UnsupportedFormat(PixelFormat::Rgba16))
        );
    }
}
