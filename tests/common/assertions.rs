//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use std::path::Path;

use paletti::services::{LedgerStats, Rendered};

/// Assert every acquired buffer was released exactly once
pub fn assert_ledger_balanced(stats: LedgerStats) {
    assert_eq!(
        stats.acquired, stats.released,
        "Buffers leaked: {stats:?}"
    );
}

/// Assert every pixel of `rendered` uses a palette color
pub fn assert_closed_palette(rendered: &Rendered) {
    let palette: Vec<[u8; 3]> = rendered.palette.iter().map(|c| c.to_bytes()).collect();
    for (i, px) in rendered.rgba.chunks_exact(4).enumerate() {
        let rgb = [px[0], px[1], px[2]];
        assert!(
            palette.contains(&rgb),
            "Pixel {i} has color {rgb:?}, not in palette {palette:?}"
        );
    }
}

/// Assert `path` holds a PNG and decode it to RGBA
pub fn assert_png_file(path: &Path) -> image::RgbaImage {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "Expected PNG signature in {}, got {:?}",
        path.display(),
        &bytes[..8.min(bytes.len())]
    );
    image::load_from_memory(&bytes)
        .expect("Failed to decode PNG")
        .to_rgba8()
}
