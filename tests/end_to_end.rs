//! Integration tests for the sampling engine's public API.

use image::{GrayImage, ImageBuffer, Luma, Rgb, Rgb32FImage};
use stack_sampler::{
    ExposureImage, ExposureStack, INVALID_SAMPLE, SamplerKind, SamplingConfig, SamplingError, StackSampler,
};

type GrayF = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A scene whose radiance ramps across the frame, captured at several gains.
fn bracket(gains: &[f32]) -> Vec<Rgb32FImage> {
    gains
        .iter()
        .map(|&gain| {
            Rgb32FImage::from_fn(40, 30, |x, y| {
                let radiance = (x + 40 * y) as f32 / 1200.0;
                let v = (radiance * gain).min(1.0);
                Rgb([v, v * 0.8, v * 0.6])
            })
        })
        .collect()
}

#[test]
fn three_constant_exposures_two_samples() {
    let images: Vec<GrayF> = [0.0f32, 0.5, 1.0]
        .into_iter()
        .map(|v| GrayF::from_pixel(2, 2, Luma([v])))
        .collect();
    let stack = ExposureStack::from_slice(&images);
    let mut sampler = StackSampler::new();
    sampler.compute(&stack, &SamplingConfig::new(2));

    let samples = sampler.samples().expect("stack is valid");
    assert_eq!(samples.len(), 6);
    // Quantile 0 is the lowest populated level of each exposure.
    assert_eq!(&samples[..3], &[0, 128, 255]);
    // Quantile 1 is never exceeded and clamps to the top level.
    assert_eq!(&samples[3..], &[255, 255, 255]);
}

#[test]
fn quantile_tuples_follow_exposure_order() {
    let images = bracket(&[0.25, 0.5, 1.0]);
    let stack = ExposureStack::from_slice(&images);
    let mut sampler = StackSampler::new();
    sampler.compute(&stack, &SamplingConfig::new(16));

    let buffer = sampler.buffer().expect("stack is valid");
    assert_eq!(buffer.channels(), 3);
    assert_eq!(buffer.exposures(), 3);
    for channel in 0..3 {
        for slot in 0..15 {
            let tuple = buffer.exposure_tuple(channel, slot).expect("slot in range");
            assert!(tuple[0] <= tuple[1] && tuple[1] <= tuple[2], "channel {channel} slot {slot}: {tuple:?}");
        }
    }
}

#[test]
fn spatial_runs_are_reproducible_per_seed() {
    let images = bracket(&[0.5, 1.0, 2.0, 4.0]);
    let stack = ExposureStack::from_slice(&images);
    let config = SamplingConfig::new(30).spatial(SamplerKind::MonteCarlo).with_seed(1234);

    let mut first = StackSampler::new();
    first.compute(&stack, &config);
    let mut second = StackSampler::new();
    second.compute(&stack, &config);
    assert_eq!(first.samples(), second.samples());
    assert_eq!(first.sample_count(), 30);

    // Re-running on the same engine replaces the buffer with an identical one.
    let before = first.samples().map(<[i32]>::to_vec);
    first.compute(&stack, &config);
    assert_eq!(first.samples().map(<[i32]>::to_vec), before);
}

#[test]
fn adjusted_spatial_count_flows_through_outlier_removal() {
    let images = bracket(&[0.5, 8.0]);
    let stack = ExposureStack::from_slice(&images);
    let mut sampler = StackSampler::new();
    sampler.compute(
        &stack,
        &SamplingConfig::new(20)
            .spatial(SamplerKind::Regular)
            .with_outlier_removal(true),
    );

    assert_eq!(sampler.sample_count(), 16);
    let samples = sampler.samples().expect("stack is valid");
    assert_eq!(samples.len(), 16 * 3 * 2);
    assert!(samples.iter().all(|&v| v == INVALID_SAMPLE || (12..=242).contains(&v)));
    // The bright exposure clips most of the frame.
    assert!(samples.iter().any(|&v| v == INVALID_SAMPLE));
}

#[test]
fn degenerate_inputs_leave_the_engine_empty() {
    let one = vec![GrayImage::new(4, 4)];
    let mut sampler = StackSampler::new();
    sampler.compute(&ExposureStack::from_slice(&one), &SamplingConfig::new(10));
    assert_eq!(sampler.sample_count(), 0);
    assert!(sampler.samples().is_none());

    let empty: Vec<GrayImage> = Vec::new();
    assert_eq!(
        sampler.try_compute(&ExposureStack::from_slice(&empty), &SamplingConfig::new(10)),
        Err(SamplingError::InsufficientExposures { found: 0 })
    );

    let two = vec![GrayImage::new(4, 4), GrayImage::new(4, 4)];
    assert_eq!(
        sampler.try_compute(&ExposureStack::from_slice(&two), &SamplingConfig::new(1)),
        Err(SamplingError::InsufficientSamples { requested: 1 })
    );
    assert!(sampler.is_empty());
}

#[test]
fn zero_sized_exposures_are_rejected() {
    let images = vec![GrayImage::new(0, 4), GrayImage::new(0, 4)];
    let mut sampler = StackSampler::new();
    assert_eq!(
        sampler.try_compute(&ExposureStack::from_slice(&images), &SamplingConfig::new(4)),
        Err(SamplingError::EmptyExposure { index: 0 })
    );
}

#[test]
fn heterogeneous_stack_through_trait_objects() {
    let gray8 = GrayImage::from_pixel(3, 3, Luma([200u8]));
    let grayf = GrayF::from_pixel(3, 3, Luma([0.25f32]));
    let stack: ExposureStack<'_, dyn ExposureImage> = ExposureStack::new(vec![&gray8 as &dyn ExposureImage, &grayf]);

    let mut sampler = StackSampler::new();
    sampler.compute(&stack, &SamplingConfig::new(2).spatial(SamplerKind::Regular));
    assert_eq!(sampler.sample_count(), 1);
    assert_eq!(sampler.samples(), Some(&[200, 64][..]));
}

#[test]
fn destroy_releases_the_buffer() {
    let images = bracket(&[1.0, 2.0]);
    let stack = ExposureStack::from_slice(&images);
    let mut sampler = StackSampler::new();
    sampler.compute(&stack, &SamplingConfig::new(5));
    assert_eq!(sampler.sample_count(), 5);

    sampler.destroy();
    assert_eq!(sampler.sample_count(), 0);
    assert_eq!(sampler.channels(), 0);
    assert!(sampler.samples().is_none());
}
