// THEORY:
// A `Histogram` counts how many pixels of one channel of one exposure fall into
// each intensity bin. The quantile strategy never looks at the raw counts; it
// needs the cumulative, normalized view, which is a discrete CDF: monotonic,
// starting at or above 0 and ending at exactly 1 for any non-empty image.
// Inverting that CDF at a quantile `u` is then a single upper-bound search.

use crate::core_modules::exposure::ExposureImage;
use crate::core_modules::quantizer::quantizer::{Level, clamp_level};

/// The engine's bin count: one bin per 8-bit level.
pub const LDR_BINS: usize = 256;

/// How image values are mapped onto bins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ValueDomain {
    /// Normalized values in `[0, 1]`.
    #[default]
    Ldr,
    /// An explicit `[min, max]` range; values outside it land in the end bins.
    Range { min: f32, max: f32 },
}

impl ValueDomain {
    fn bin_of(&self, value: f32, bins: usize) -> usize {
        let last = (bins - 1) as f32;
        let t = match *self {
            ValueDomain::Ldr => value,
            ValueDomain::Range { min, max } => {
                let span = max - min;
                if span.abs() < f32::EPSILON { 0.0 } else { (value - min) / span }
            }
        };
        // NaN casts to 0.
        ((t * last).round().max(0.0) as usize).min(bins - 1)
    }
}

/// Per-bin counts for one channel of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u32>,
    total: u64,
}

impl Histogram {
    /// Builds a histogram of `channel` over every pixel of `image`.
    /// A zero bin count is treated as one bin.
    pub fn compute<I>(image: &I, domain: ValueDomain, bins: usize, channel: usize) -> Self
    where
        I: ExposureImage + ?Sized,
    {
        let bins = bins.max(1);
        let mut counts = vec![0u32; bins];
        for y in 0..image.height() {
            for x in 0..image.width() {
                let bin = domain.bin_of(image.value(x, y, channel), bins);
                counts[bin] += 1;
            }
        }
        let total = counts.iter().map(|&c| c as u64).sum();
        Self { counts, total }
    }

    /// Builds a histogram directly from counts.
    pub fn from_counts(counts: Vec<u32>) -> Self {
        let total = counts.iter().map(|&c| c as u64).sum();
        Self { counts, total }
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Running sum of the counts. With `normalize`, divided by the total so the
    /// last entry is exactly 1; an empty histogram stays all zeros.
    pub fn cumulative(&self, normalize: bool) -> Vec<f32> {
        let mut running = 0u64;
        let scale = if normalize && self.total > 0 {
            1.0 / self.total as f64
        } else {
            1.0
        };
        self.counts
            .iter()
            .map(|&c| {
                running += c as u64;
                if normalize && running == self.total && self.total > 0 {
                    1.0
                } else {
                    (running as f64 * scale) as f32
                }
            })
            .collect()
    }

    /// Lowest bin with a non-zero count.
    pub fn min_populated_bin(&self) -> Option<usize> {
        self.counts.iter().position(|&c| c > 0)
    }
}

/// Position of the first entry strictly greater than `target` in a
/// non-decreasing sequence; `cdf.len()` when there is none.
pub fn upper_bound(cdf: &[f32], target: f32) -> usize {
    cdf.partition_point(|&value| value <= target)
}

/// Inverts a cumulative distribution at quantile `u`, clamping the result to a valid level.
pub fn invert_cdf(cdf: &[f32], u: f32) -> Level {
    clamp_level(upper_bound(cdf, u) as isize)
}
