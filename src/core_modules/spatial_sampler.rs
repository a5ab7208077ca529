// THEORY:
// The spatial sampler is the classic way of collecting calibration samples:
// pick pixel locations and read each of them through every exposure. It relies
// on the exposures being registered, and on every exposure sharing the first
// one's resolution (the orchestrator rejects stacks that do not).
//
// The point sampler decides how many locations there really are. Grid patterns
// round the request, and whatever count level 0 reports becomes the sample count
// for the buffer, the outlier pass and every caller downstream.

use crate::core_modules::exposure::{ExposureImage, ExposureStack};
use crate::core_modules::point_sampler::{PointSampler2D, SamplerKind};
use crate::core_modules::quantizer::quantizer::quantize_unit;
use crate::core_modules::sample_buffer::SampleBuffer;
use tracing::debug;

/// The spatial strategy only ever uses the finest level.
const SAMPLER_LEVEL: usize = 0;

/// Fills a fresh buffer by reading sampled coordinates through every exposure.
/// The buffer's `sample_count` is the sampler's adjusted count.
pub fn sample_spatial<I>(
    stack: &ExposureStack<'_, I>,
    channels: usize,
    requested: usize,
    kind: SamplerKind,
    seed: u64,
) -> SampleBuffer
where
    I: ExposureImage + ?Sized,
{
    let domain = stack.first().map_or((0, 0), |img| img.dimensions());
    let sampler = PointSampler2D::new(kind, domain, requested, 1, seed);
    let sample_count = sampler.samples_at_level(SAMPLER_LEVEL);
    if sample_count != requested {
        debug!(requested, actual = sample_count, ?kind, "point sampler adjusted the sample count");
    }

    let mut buffer = SampleBuffer::new(channels, sample_count, stack.len());
    for channel in 0..channels {
        for (slot, &(x, y)) in sampler.points(SAMPLER_LEVEL).iter().enumerate() {
            for (exposure, image) in stack.iter().enumerate() {
                buffer.set(channel, slot, exposure, quantize_unit(image.value(x, y, channel)));
            }
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, RgbImage};

    type GrayF = ImageBuffer<Luma<f32>, Vec<f32>>;

    #[test]
    fn reads_the_same_coordinate_in_every_exposure() {
        // Each exposure encodes the pixel position; the brighter one doubles it.
        let base: GrayF = ImageBuffer::from_fn(8, 8, |x, y| Luma([(y * 8 + x) as f32 / 255.0]));
        let bright: GrayF = ImageBuffer::from_fn(8, 8, |x, y| Luma([2.0 * (y * 8 + x) as f32 / 255.0]));
        let images = vec![base, bright];
        let stack = ExposureStack::from_slice(&images);

        let buffer = sample_spatial(&stack, 1, 16, SamplerKind::MonteCarlo, 3);
        assert_eq!(buffer.sample_count(), 16);
        for slot in 0..16 {
            let tuple = buffer.exposure_tuple(0, slot).expect("slot in range");
            assert_eq!(tuple[1], tuple[0] * 2);
        }
    }

    #[test]
    fn adopts_the_adjusted_count() {
        let images = vec![GrayF::new(10, 10), GrayF::new(10, 10), GrayF::new(10, 10)];
        let stack = ExposureStack::from_slice(&images);
        let buffer = sample_spatial(&stack, 1, 10, SamplerKind::Regular, 0);
        assert_eq!(buffer.sample_count(), 9);
        assert_eq!(buffer.len(), 9 * 3);
    }

    #[test]
    fn quantizes_each_channel() {
        let a = RgbImage::from_pixel(5, 5, Rgb([0u8, 128, 255]));
        let b = RgbImage::from_pixel(5, 5, Rgb([10u8, 20, 30]));
        let images = vec![a, b];
        let stack = ExposureStack::from_slice(&images);
        let buffer = sample_spatial(&stack, 3, 4, SamplerKind::StratifiedMonteCarlo, 1);
        assert_eq!(buffer.sample_count(), 4);
        for slot in 0..4 {
            assert_eq!(buffer.exposure_tuple(0, slot), Some(&[0, 10][..]));
            assert_eq!(buffer.exposure_tuple(1, slot), Some(&[128, 20][..]));
            assert_eq!(buffer.exposure_tuple(2, slot), Some(&[255, 30][..]));
        }
    }

    #[test]
    fn identical_seeds_reproduce_the_buffer() {
        let noise: GrayF = ImageBuffer::from_fn(32, 32, |x, y| Luma([((x * 31 + y * 17) % 256) as f32 / 255.0]));
        let images = vec![noise.clone(), noise];
        let stack = ExposureStack::from_slice(&images);
        let a = sample_spatial(&stack, 1, 25, SamplerKind::StratifiedMonteCarlo, 11);
        let b = sample_spatial(&stack, 1, 25, SamplerKind::StratifiedMonteCarlo, 11);
        assert_eq!(a, b);
    }
}
