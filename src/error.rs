// THEORY:
// Errors in this crate are explanations, not failures. The engine's public
// `compute` entry point never propagates any of them: a degenerate stack simply
// leaves the engine empty. `try_compute` exists for callers that want to know
// *why* the engine ended up empty, and the pool needs its own small error type
// for the plumbing between tasks.

use thiserror::Error;

/// Reasons a stack could not be sampled. The engine is always left empty when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("exposure stack needs at least 2 images, found {found}")]
    InsufficientExposures { found: usize },

    #[error("at least 2 samples must be requested, got {requested}")]
    InsufficientSamples { requested: usize },

    #[error("exposure {index} has {found} channels, expected {expected}")]
    ChannelMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("exposure {index} is {found:?}, expected {expected:?} for spatial sampling")]
    ResolutionMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("exposure {index} has an empty image plane")]
    EmptyExposure { index: usize },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("outlier fraction must lie in [0, 0.5), got {0}")]
    OutlierFraction(f32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The job queue is closed, either after `shutdown` or because every worker exited.
    #[error("sampler pool is no longer accepting jobs")]
    WorkerUnavailable,
    /// The worker dropped the reply channel before answering.
    #[error("sampler worker dropped job {job_id} before replying")]
    ResultDropped { job_id: u64 },
}

pub type Result<T, E = SamplingError> = std::result::Result<T, E>;
