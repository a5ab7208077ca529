// THEORY:
// This file is the entry point for the `stack_sampler` library crate. It exports
// `StackSampler` (the engine) together with its configuration and output types as
// the public API consumed by a radiometric-calibration solver.
//
// The building blocks live in `core_modules`: the exposure adapter over the
// `image` crate, histograms, the point sampler, the two sampling strategies and
// the outlier filter. They are public so that solvers and tests can reuse them,
// but a typical caller only needs the re-exports below.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::{SamplingConfig, Strategy};
pub use core_modules::exposure::{ExposureImage, ExposureStack};
pub use core_modules::quantizer::quantizer::INVALID_SAMPLE;
pub use error::{ConfigError, PoolError, SamplingError};
pub use parallel_pipeline::{SampleJob, SampleOutcome, SamplerPool};
pub use pipeline::{SampleBuffer, SamplerKind, StackSampler};
