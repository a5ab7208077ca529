// THEORY:
// The quantizer is the smallest unit of the engine. Both strategies end in the
// same place: an integer on the 8-bit scale that the calibration solver can use
// as an index into its response curve. The quantile strategy arrives there from
// a histogram bin index, the spatial strategy from a normalized float read out
// of an image. The outlier filter, finally, needs its thresholds expressed on
// the same integer scale.
//
// Everything here is a pure function with no knowledge of stacks or buffers.

pub mod quantizer {
    pub type Level = i32;
    pub type Intensity = f32;

    /// Largest representable level on the 8-bit scale.
    pub const MAX_LEVEL: Level = 255;
    /// Marks a sample rejected by the outlier filter.
    pub const INVALID_SAMPLE: Level = -1;

    /// Clamps any integer (e.g. a search position) into `[0, 255]`.
    pub fn clamp_level(value: isize) -> Level {
        value.clamp(0, MAX_LEVEL as isize) as Level
    }

    /// Scales a normalized intensity by 255, rounds half away from zero and clamps.
    /// NaN maps to 0.
    pub fn quantize_unit(value: Intensity) -> Level {
        let scaled = (value * MAX_LEVEL as Intensity).round();
        // `as` saturates, so infinities land on the bounds before clamping.
        (scaled as Level).clamp(0, MAX_LEVEL)
    }

    /// Integer threshold for a fraction of the 8-bit range, truncated toward zero.
    pub fn threshold_level(fraction: Intensity) -> Level {
        (fraction * MAX_LEVEL as Intensity) as Level
    }
}
