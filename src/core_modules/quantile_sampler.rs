// THEORY:
// The quantile sampler implements the Grossberg and Nayar trick for choosing
// calibration samples without pixel correspondence. Instead of reading the same
// pixel in every exposure, it reads the same *rank*: for a quantile `u`, each
// exposure contributes the intensity below which a fraction `u` of its pixels
// fall. Because the scene is the same and the camera response is monotonic,
// those intensities describe the same scene radiance, even when the exposures
// are slightly misregistered or the pixel is clipped in some of them.
//
// Steps:
// 1.  One 256-bin histogram per (channel, exposure), turned into a normalized
//     cumulative distribution.
// 2.  `n` evenly spaced quantiles `u_i = i / (n - 1)` over `[0, 1]`.
// 3.  For every channel and exposure, the first bin whose cumulative value
//     exceeds `u_i` becomes the sample, clamped to 255 when no bin does.

use crate::core_modules::exposure::{ExposureImage, ExposureStack};
use crate::core_modules::histogram::{Histogram, LDR_BINS, ValueDomain, invert_cdf};
use crate::core_modules::sample_buffer::SampleBuffer;
use tracing::{debug, trace};

/// Cumulative distributions for every (channel, exposure) pair, channel-major.
struct CdfTable {
    exposures: usize,
    cdfs: Vec<Vec<f32>>,
}

impl CdfTable {
    fn build<I: ExposureImage + ?Sized>(stack: &ExposureStack<'_, I>, channels: usize) -> Self {
        let mut cdfs = Vec::with_capacity(channels * stack.len());
        for channel in 0..channels {
            for image in stack.iter() {
                let hist = Histogram::compute(image, ValueDomain::Ldr, LDR_BINS, channel);
                cdfs.push(hist.cumulative(true));
            }
            trace!(channel, "cumulative histograms ready");
        }
        Self {
            exposures: stack.len(),
            cdfs,
        }
    }

    fn get(&self, channel: usize, exposure: usize) -> &[f32] {
        &self.cdfs[channel * self.exposures + exposure]
    }
}

/// The `i`-th of `n` evenly spaced quantiles over `[0, 1]`.
pub fn quantile(i: usize, n: usize) -> f32 {
    let div = n.saturating_sub(1).max(1);
    i as f32 / div as f32
}

/// Fills a fresh buffer of `sample_count` quantile samples per channel.
pub fn sample_quantiles<I>(stack: &ExposureStack<'_, I>, channels: usize, sample_count: usize) -> SampleBuffer
where
    I: ExposureImage + ?Sized,
{
    let exposures = stack.len();
    let table = CdfTable::build(stack, channels);
    debug!(channels, exposures, "computed histograms");

    let mut buffer = SampleBuffer::new(channels, sample_count, exposures);
    for channel in 0..channels {
        for slot in 0..sample_count {
            let u = quantile(slot, sample_count);
            for exposure in 0..exposures {
                let level = invert_cdf(table.get(channel, exposure), u);
                buffer.set(channel, slot, exposure, level);
            }
        }
    }
    buffer
}
