// THEORY:
// The `pipeline` module is the top-level API of the engine. `StackSampler`
// validates a stack, dispatches to one of the two sampling strategies, runs the
// outlier filter and owns the resulting `SampleBuffer` until the next run.
//
// Key architectural principles:
// 1.  **Empty is an answer**: a degenerate stack (fewer than two exposures,
//     fewer than two samples, mismatched channels) is not a failure of the
//     engine. `compute` resets to the empty state and returns; consumers check
//     `sample_count() > 0`. `try_compute` does the same work and additionally
//     tells the caller why the result is empty.
// 2.  **One owned buffer**: every run starts by releasing the previous buffer
//     and ends with a freshly allocated one. Borrowed views from `samples()`
//     cannot outlive the next `compute` or `destroy`; the borrow checker
//     enforces what a raw pointer API would only document.
// 3.  **The reported count is the used count**: the spatial strategy may
//     adjust the number of samples, and `sample_count()` always reflects the
//     adjusted value.

use crate::config::{SamplingConfig, Strategy};
use crate::core_modules::exposure::{ExposureImage, ExposureStack};
use crate::core_modules::outlier_filter::{OutlierThresholds, remove_outliers};
use crate::core_modules::quantile_sampler::sample_quantiles;
use crate::core_modules::quantizer::quantizer::Level;
use crate::core_modules::spatial_sampler::sample_spatial;
use crate::error::{Result, SamplingError};
use tracing::debug;

// Re-export key data structures for the public API.
pub use crate::core_modules::point_sampler::SamplerKind;
pub use crate::core_modules::sample_buffer::SampleBuffer;

/// Smallest stack and sample count the engine will work with.
const MIN_EXPOSURES: usize = 2;
const MIN_SAMPLES: usize = 2;

/// Selects calibration samples from exposure stacks and owns the result.
#[derive(Debug, Default)]
pub struct StackSampler {
    buffer: Option<SampleBuffer>,
}

impl StackSampler {
    pub fn new() -> Self {
        Self { buffer: None }
    }

    /// Samples `stack` according to `config`, replacing any previous result.
    /// Never fails: inputs that cannot be sampled leave the engine empty.
    pub fn compute<I>(&mut self, stack: &ExposureStack<'_, I>, config: &SamplingConfig)
    where
        I: ExposureImage + ?Sized,
    {
        if let Err(reason) = self.try_compute(stack, config) {
            debug!(%reason, "stack not sampled, engine left empty");
        }
    }

    /// Like `compute`, but reports why the engine was left empty.
    pub fn try_compute<I>(&mut self, stack: &ExposureStack<'_, I>, config: &SamplingConfig) -> Result<()>
    where
        I: ExposureImage + ?Sized,
    {
        self.destroy();
        validate(stack, config)?;

        let channels = stack.channels();
        let mut buffer = match config.strategy {
            Strategy::Quantile => {
                debug!(requested = config.sample_count, channels, exposures = stack.len(), "quantile sampling");
                sample_quantiles(stack, channels, config.sample_count)
            }
            Strategy::Spatial => {
                debug!(
                    requested = config.sample_count,
                    channels,
                    exposures = stack.len(),
                    kind = ?config.sampler_kind,
                    "spatial sampling"
                );
                sample_spatial(stack, channels, config.sample_count, config.sampler_kind, config.seed)
            }
        };

        if config.remove_outliers {
            remove_outliers(&mut buffer, OutlierThresholds::from_fraction(config.outlier_fraction));
        }

        self.buffer = Some(buffer);
        Ok(())
    }

    /// Releases the buffer and returns to the empty state.
    pub fn destroy(&mut self) {
        self.buffer = None;
    }

    /// Moves the buffer out, leaving the engine empty.
    pub fn take_buffer(&mut self) -> Option<SampleBuffer> {
        self.buffer.take()
    }

    /// The packed samples, or `None` when the engine is empty.
    pub fn samples(&self) -> Option<&[Level]> {
        self.buffer.as_ref().map(SampleBuffer::as_slice)
    }

    pub fn buffer(&self) -> Option<&SampleBuffer> {
        self.buffer.as_ref()
    }

    /// Samples per channel actually produced; 0 when empty.
    pub fn sample_count(&self) -> usize {
        self.buffer.as_ref().map_or(0, SampleBuffer::sample_count)
    }

    pub fn channels(&self) -> usize {
        self.buffer.as_ref().map_or(0, SampleBuffer::channels)
    }

    pub fn exposures(&self) -> usize {
        self.buffer.as_ref().map_or(0, SampleBuffer::exposures)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_none()
    }
}

fn validate<I>(stack: &ExposureStack<'_, I>, config: &SamplingConfig) -> Result<()>
where
    I: ExposureImage + ?Sized,
{
    if stack.len() < MIN_EXPOSURES {
        return Err(SamplingError::InsufficientExposures { found: stack.len() });
    }
    if config.sample_count < MIN_SAMPLES {
        return Err(SamplingError::InsufficientSamples {
            requested: config.sample_count,
        });
    }
    config.validate()?;

    if let Some((index, found)) = stack.channel_mismatch() {
        return Err(SamplingError::ChannelMismatch {
            index,
            expected: stack.channels(),
            found,
        });
    }
    if let Some(index) = stack.iter().position(|img| img.width() == 0 || img.height() == 0) {
        return Err(SamplingError::EmptyExposure { index });
    }
    if config.strategy == Strategy::Spatial {
        if let Some((index, found)) = stack.resolution_mismatch() {
            let expected = stack.first().map_or((0, 0), |img| img.dimensions());
            return Err(SamplingError::ResolutionMismatch { index, expected, found });
        }
    }
    Ok(())
}
