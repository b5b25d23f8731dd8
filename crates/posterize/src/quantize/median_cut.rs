//! Weighted median cut over an exact histogram.
//!
//! All arithmetic is integer and every choice has an explicit tie-break,
//! so the same histogram always yields the same representatives.

use crate::color::Rgb;

/// A set of histogram entries that will become one palette color.
#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(Rgb, u32)>,
}

impl ColorBox {
    fn new(entries: Vec<(Rgb, u32)>) -> Self {
        Self { entries }
    }

    fn total_weight(&self) -> u64 {
        self.entries.iter().map(|&(_, w)| w as u64).sum()
    }

    /// Widest channel and its extent. Ties prefer red, then green.
    fn widest_axis(&self) -> (usize, u8) {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for (color, _) in &self.entries {
            for axis in 0..3 {
                let v = color.channel(axis);
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
            }
        }

        let mut best = (0, 0u8);
        for axis in 0..3 {
            let range = max[axis].saturating_sub(min[axis]);
            if range > best.1 {
                best = (axis, range);
            }
        }
        best
    }

    /// Larger, more varied boxes split first.
    fn priority(&self) -> u64 {
        self.total_weight() * self.widest_axis().1 as u64
    }

    /// Pixel-weighted mean color, rounded to nearest.
    fn mean(&self) -> Rgb {
        let mut sums = [0u64; 3];
        let mut total = 0u64;
        for &(color, w) in &self.entries {
            let w = w as u64;
            sums[0] += color.r as u64 * w;
            sums[1] += color.g as u64 * w;
            sums[2] += color.b as u64 * w;
            total += w;
        }
        if total == 0 {
            return Rgb::new(0, 0, 0);
        }
        let channel = |sum: u64| ((sum + total / 2) / total).min(255) as u8;
        Rgb::new(channel(sums[0]), channel(sums[1]), channel(sums[2]))
    }

    /// Split at the weighted median of the widest axis.
    ///
    /// Both halves keep at least one entry.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (axis, _) = self.widest_axis();
        self.entries
            .sort_unstable_by_key(|&(color, _)| (color.channel(axis), color));

        let total = self.total_weight();
        let mut accumulated = 0u64;
        let mut split_idx = 1;
        for (i, &(_, w)) in self.entries.iter().enumerate() {
            accumulated += w as u64;
            if accumulated * 2 >= total {
                split_idx = i + 1;
                break;
            }
        }
        split_idx = split_idx.clamp(1, self.entries.len() - 1);

        let right = self.entries.split_off(split_idx);
        (ColorBox::new(self.entries), ColorBox::new(right))
    }
}

/// Reduce `histogram` to at most `max_colors` representative colors.
///
/// When the histogram already has `max_colors` entries or fewer, its colors
/// are returned unchanged. The result may contain the same color twice if
/// two boxes round to the same mean; callers deduplicate.
pub fn median_cut(histogram: &[(Rgb, u32)], max_colors: usize) -> Vec<Rgb> {
    if histogram.is_empty() || max_colors == 0 {
        return Vec::new();
    }
    if histogram.len() <= max_colors {
        return histogram.iter().map(|&(color, _)| color).collect();
    }

    let mut boxes = Vec::with_capacity(max_colors);
    boxes.push(ColorBox::new(histogram.to_vec()));

    while boxes.len() < max_colors {
        // First box with the highest priority wins
        let mut best: Option<(usize, u64)> = None;
        for (i, b) in boxes.iter().enumerate() {
            if b.entries.len() < 2 {
                continue;
            }
            let priority = b.priority();
            if best.map_or(true, |(_, p)| priority > p) {
                best = Some((i, priority));
            }
        }

        let Some((idx, _)) = best else {
            break;
        };

        let to_split = boxes.swap_remove(idx);
        let (left, right) = to_split.split();
        boxes.push(left);
        boxes.push(right);
    }

    boxes.iter().map(ColorBox::mean).collect()
}
