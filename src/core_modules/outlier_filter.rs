// THEORY:
// Samples close to black or white are most likely clipped by the sensor and
// carry no information about the response curve. The filter replaces them with
// the invalid sentinel so the solver can skip them while the buffer keeps its
// shape. Every entry is judged on its own; there is no coupling between the
// exposures of a tuple.

use crate::core_modules::quantizer::quantizer::{INVALID_SAMPLE, Level, threshold_level};
use crate::core_modules::sample_buffer::SampleBuffer;
use tracing::debug;

/// Integer rejection bounds on the 8-bit scale. Values strictly outside
/// `[min, max]` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlierThresholds {
    pub min: Level,
    pub max: Level,
}

impl OutlierThresholds {
    /// Bounds for a clipping fraction `f`: `floor(f * 255)` and `floor((1 - f) * 255)`.
    pub fn from_fraction(fraction: f32) -> Self {
        Self {
            min: threshold_level(fraction),
            max: threshold_level(1.0 - fraction),
        }
    }

    pub fn rejects(&self, value: Level) -> bool {
        value < self.min || value > self.max
    }
}

/// Marks every out-of-bounds entry of `buffer` invalid. Returns how many were rejected.
pub fn remove_outliers(buffer: &mut SampleBuffer, thresholds: OutlierThresholds) -> usize {
    let mut rejected = 0;
    for value in buffer.as_mut_slice() {
        if thresholds.rejects(*value) {
            *value = INVALID_SAMPLE;
            rejected += 1;
        }
    }
    debug!(rejected, total = buffer.len(), min = thresholds.min, max = thresholds.max, "outliers removed");
    rejected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(values: &[Level]) -> SampleBuffer {
        let mut buffer = SampleBuffer::new(1, values.len(), 1);
        for (slot, &v) in values.iter().enumerate() {
            buffer.set(0, slot, 0, v);
        }
        buffer
    }

    #[test]
    fn default_fraction_gives_12_and_242() {
        let t = OutlierThresholds::from_fraction(0.05);
        assert_eq!(t, OutlierThresholds { min: 12, max: 242 });
    }

    #[test]
    fn rejects_only_values_outside_the_bounds() {
        let values: Vec<Level> = (0..=255).collect();
        let mut buffer = buffer_with(&values);
        let rejected = remove_outliers(&mut buffer, OutlierThresholds::from_fraction(0.05));

        assert_eq!(rejected, 12 + 13);
        for (v, &out) in values.iter().zip(buffer.as_slice()) {
            if (12..=242).contains(v) {
                assert_eq!(out, *v);
            } else {
                assert_eq!(out, INVALID_SAMPLE, "value {v}");
            }
        }
    }

    #[test]
    fn zero_fraction_keeps_everything() {
        let mut buffer = buffer_with(&[0, 128, 255]);
        assert_eq!(remove_outliers(&mut buffer, OutlierThresholds::from_fraction(0.0)), 0);
        assert_eq!(buffer.as_slice(), &[0, 128, 255]);
    }

    #[test]
    fn already_invalid_entries_stay_invalid() {
        let mut buffer = buffer_with(&[INVALID_SAMPLE, 100]);
        remove_outliers(&mut buffer, OutlierThresholds::from_fraction(0.05));
        assert_eq!(buffer.as_slice(), &[INVALID_SAMPLE, 100]);
    }
}
