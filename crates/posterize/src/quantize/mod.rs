//! Color reduction building blocks.
//!
//! [`Histogram`] collects the exact colors of an image, [`median_cut`]
//! picks representatives, and [`order_by_population`] fixes the palette
//! order. [`Posterizer`](crate::Posterizer) wires them together.

mod histogram;
mod median_cut;

pub use histogram::Histogram;
pub use median_cut::median_cut;

use crate::color::Rgb;

/// Sort palette positions by descending population, then ascending color.
///
/// Returns the permutation: `order[new_index] = old_index`. Entries with a
/// zero count are dropped.
pub fn order_by_population(colors: &[Rgb], counts: &[u64]) -> Vec<usize> {
    debug_assert_eq!(colors.len(), counts.len());
    let mut order: Vec<usize> = (0..colors.len()).filter(|&i| counts[i] > 0).collect();
    order.sort_unstable_by(|&a, &b| counts[b].cmp(&counts[a]).then(colors[a].cmp(&colors[b])));
    order
}
