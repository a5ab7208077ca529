// THEORY:
// The `SampleBuffer` is the one piece of data the engine hands to the outside
// world. It is a single contiguous `Vec<i32>` rather than nested containers so
// that the calibration solver can treat its layout as a stable contract:
//
//     index = channel * (sample_count * exposures) + slot * exposures + exposure
//
// A run of `exposures` consecutive entries is therefore one sample tuple: the
// same sample slot seen through every exposure of the stack. Entries are levels
// in `[0, 255]` or `INVALID_SAMPLE` (-1) once the outlier filter has run.

use crate::core_modules::quantizer::quantizer::{INVALID_SAMPLE, Level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    data: Vec<Level>,
    channels: usize,
    sample_count: usize,
    exposures: usize,
}

impl SampleBuffer {
    /// Allocates a zeroed buffer for the given shape.
    pub fn new(channels: usize, sample_count: usize, exposures: usize) -> Self {
        Self {
            data: vec![0; channels * sample_count * exposures],
            channels,
            sample_count,
            exposures,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn exposures(&self) -> usize {
        self.exposures
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat position of `(channel, slot, exposure)`.
    #[inline]
    pub fn index(&self, channel: usize, slot: usize, exposure: usize) -> usize {
        debug_assert!(channel < self.channels && slot < self.sample_count && exposure < self.exposures);
        channel * (self.sample_count * self.exposures) + slot * self.exposures + exposure
    }

    pub fn get(&self, channel: usize, slot: usize, exposure: usize) -> Option<Level> {
        if channel >= self.channels || slot >= self.sample_count || exposure >= self.exposures {
            return None;
        }
        Some(self.data[self.index(channel, slot, exposure)])
    }

    pub fn set(&mut self, channel: usize, slot: usize, exposure: usize, value: Level) {
        let idx = self.index(channel, slot, exposure);
        self.data[idx] = value;
    }

    /// The values of one sample slot across every exposure, in stack order.
    pub fn exposure_tuple(&self, channel: usize, slot: usize) -> Option<&[Level]> {
        if channel >= self.channels || slot >= self.sample_count {
            return None;
        }
        let start = self.index(channel, slot, 0);
        Some(&self.data[start..start + self.exposures])
    }

    /// Number of entries not marked invalid.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != INVALID_SAMPLE).count()
    }

    pub fn as_slice(&self) -> &[Level] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Level] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<Level> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_the_product_of_the_shape() {
        let buffer = SampleBuffer::new(3, 5, 4);
        assert_eq!(buffer.len(), 60);
        assert_eq!(buffer.valid_count(), 60);
    }

    #[test]
    fn index_follows_channel_slot_exposure_order() {
        let mut buffer = SampleBuffer::new(2, 3, 4);
        assert_eq!(buffer.index(0, 0, 0), 0);
        assert_eq!(buffer.index(0, 0, 3), 3);
        assert_eq!(buffer.index(0, 1, 0), 4);
        assert_eq!(buffer.index(1, 0, 0), 12);
        assert_eq!(buffer.index(1, 2, 3), 23);

        buffer.set(1, 2, 1, 77);
        assert_eq!(buffer.as_slice()[21], 77);
        assert_eq!(buffer.get(1, 2, 1), Some(77));
        assert_eq!(buffer.get(2, 0, 0), None);
    }

    #[test]
    fn exposure_tuple_is_contiguous() {
        let mut buffer = SampleBuffer::new(1, 2, 3);
        for (e, v) in [10, 20, 30].into_iter().enumerate() {
            buffer.set(0, 1, e, v);
        }
        assert_eq!(buffer.exposure_tuple(0, 1), Some(&[10, 20, 30][..]));
        assert_eq!(buffer.exposure_tuple(0, 2), None);
    }
}
