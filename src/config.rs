// THEORY:
// `SamplingConfig` is the single knob-box of the engine. Channel and exposure
// counts are never configured; they are read off the stack on every run.
// Everything else a caller can tune lives here so that the same config can be
// handed to one engine or cloned into every worker of a `SamplerPool`.

use crate::core_modules::point_sampler::SamplerKind;
use crate::error::ConfigError;

/// Default number of samples requested per channel.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;
/// Fraction of the 8-bit range treated as clipped at each end.
pub const DEFAULT_OUTLIER_FRACTION: f32 = 0.05;

/// Which sub-sampling strategy the engine dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Histogram-quantile inversion (Grossberg and Nayar). Needs no pixel correspondence.
    #[default]
    Quantile,
    /// Reads the same pixel coordinates across every exposure.
    Spatial,
}

/// Configuration for a `StackSampler` run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplingConfig {
    /// Requested samples per channel. The spatial strategy may adjust it.
    pub sample_count: usize,
    /// Replace samples near black or white with the `-1` sentinel.
    pub remove_outliers: bool,
    pub strategy: Strategy,
    /// Point pattern used by the spatial strategy.
    pub sampler_kind: SamplerKind,
    /// Seed for the point sampler, so spatial runs are reproducible.
    pub seed: u64,
    /// Low clipping fraction; the high threshold is `1.0 - outlier_fraction`.
    pub outlier_fraction: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            remove_outliers: false,
            strategy: Strategy::Quantile,
            sampler_kind: SamplerKind::default(),
            seed: 0,
            outlier_fraction: DEFAULT_OUTLIER_FRACTION,
        }
    }
}

impl SamplingConfig {
    pub fn new(sample_count: usize) -> Self {
        Self {
            sample_count,
            ..Self::default()
        }
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_outlier_removal(mut self, remove_outliers: bool) -> Self {
        self.remove_outliers = remove_outliers;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Selects the spatial strategy with the given point pattern.
    pub fn spatial(mut self, kind: SamplerKind) -> Self {
        self.strategy = Strategy::Spatial;
        self.sampler_kind = kind;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_outlier_fraction(mut self, fraction: f32) -> Self {
        self.outlier_fraction = fraction;
        self
    }

    /// Checks the values that cannot be absorbed by the empty-result policy.
    /// Sample counts below 2 are not an error here; the engine treats them as
    /// insufficient data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = self.outlier_fraction;
        if !(0.0..0.5).contains(&f) {
            return Err(ConfigError::OutlierFraction(f));
        }
        Ok(())
    }
}
