// This file is an example of how to use the `stack_sampler` library.
// It synthesizes a bracketed exposure stack of a gradient scene and prints the
// samples each strategy selects. Set `RUST_LOG=debug` to follow the engine.

use image::{ImageBuffer, Rgb};
use stack_sampler::{ExposureStack, SamplerKind, SamplingConfig, StackSampler};
use tracing::info;
use tracing_subscriber::EnvFilter;

type RgbF = ImageBuffer<Rgb<f32>, Vec<f32>>;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;
const EXPOSURE_STOPS: [f32; 3] = [-2.0, 0.0, 2.0];

/// A horizontal radiance ramp seen through a clipping sensor at `stops` EV.
fn exposure(stops: f32) -> RgbF {
    let gain = 2f32.powf(stops);
    ImageBuffer::from_fn(WIDTH, HEIGHT, |x, y| {
        let radiance = (x as f32 + 0.25 * y as f32) / WIDTH as f32;
        let v = (radiance * gain * 0.5).min(1.0);
        Rgb([v, (v * 0.9).min(1.0), v.powf(1.1)])
    })
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let images: Vec<RgbF> = EXPOSURE_STOPS.iter().map(|&s| exposure(s)).collect();
    let stack = ExposureStack::from_slice(&images);
    let mut sampler = StackSampler::new();

    let configs = [
        ("quantile", SamplingConfig::new(8).with_outlier_removal(true)),
        (
            "spatial",
            SamplingConfig::new(10)
                .spatial(SamplerKind::StratifiedMonteCarlo)
                .with_seed(7)
                .with_outlier_removal(true),
        ),
    ];

    for (name, config) in configs {
        sampler.try_compute(&stack, &config)?;
        let buffer = sampler
            .buffer()
            .ok_or_else(|| anyhow::anyhow!("{name} sampling produced no buffer"))?;
        info!(
            strategy = name,
            samples = buffer.sample_count(),
            valid = buffer.valid_count(),
            total = buffer.len(),
            "stack sampled"
        );
        for slot in 0..buffer.sample_count() {
            if let Some(tuple) = buffer.exposure_tuple(0, slot) {
                println!("{name:>8} red slot {slot:>2}: {tuple:?}");
            }
        }
    }
    Ok(())
}
