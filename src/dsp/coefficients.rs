//! # Block-Rate Coefficients
//!
//! Turns the user-facing controls (milliseconds, percentages, Hz) into the
//! numbers the per-sample loop multiplies by. This runs once at the top of
//! every block, never per sample, and the result is a complete snapshot:
//! the loop never sees half of an old set and half of a new one.
//!
//! Consecutive snapshots are not interpolated. A parameter move is heard
//! as a step at the block boundary.

use super::filter::{BiquadCoefficients, FilterDesign, FilterKind};
use crate::controls::{ChannelControls, HIGH_CUT_Q, LOW_CUT_Q};

/// Convert a delay time to whole samples, always rounding up.
///
/// ```text
/// samples = ceil(delay_ms * sample_rate / 1000)
/// ```
///
/// The product is formed in `f64`, where `ms * rate` is exact for every
/// realistic input, so only the final division rounds. That keeps whole
/// results whole (1000 ms at 44.1 kHz is 44100, not 44101).
pub fn delay_samples(delay_ms: f32, sample_rate: f32) -> usize {
    let samples = (f64::from(delay_ms) * f64::from(sample_rate) / 1000.0).ceil();
    // `as` saturates: negative → 0, NaN → 0.
    samples as usize
}

/// Map the feedback percentage onto a linear gain.
///
/// Every 5 % below 100 costs 1 dB:
///
/// ```text
/// scaled = (100 - percent) / 5
/// gain   = 10^(-scaled / 20)
/// ```
///
/// | percent | attenuation | gain   |
/// |---------|-------------|--------|
/// | 100     | 0 dB        | 1.0    |
/// | 76      | -4.8 dB     | ≈0.575 |
/// | 50      | -10 dB      | ≈0.316 |
/// | 1       | -19.8 dB    | ≈0.102 |
/// | 0       | (special)   | 0.0    |
///
/// At 0 % the formula would still give -20 dB (0.1). The knob's bottom
/// position is meant to mean "no feedback at all", so zero is an explicit
/// override rather than the curve's value.
pub fn feedback_gain(percent: f32) -> f32 {
    if percent == 0.0 {
        return 0.0;
    }

    let scaled = (100.0 - percent) / 5.0;
    10.0_f32.powf(-scaled / 20.0)
}

/// Linear dry/wet crossfade. Returns `(wet, dry)` with `wet + dry == 1`.
pub fn wet_dry_gains(dry_wet_percent: f32) -> (f32, f32) {
    let wet = dry_wet_percent / 100.0;
    (wet, 1.0 - wet)
}

/// Everything one channel's per-sample loop needs for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCoefficients {
    /// Read/write separation, already clamped to the delay line capacity.
    pub delay_samples: usize,
    pub feedback_gain: f32,
    pub wet_gain: f32,
    pub dry_gain: f32,
    pub low_cut: BiquadCoefficients,
    pub high_cut: BiquadCoefficients,
}

impl Default for ChannelCoefficients {
    /// Silence in the loop, dry signal through.
    fn default() -> Self {
        Self {
            delay_samples: 0,
            feedback_gain: 0.0,
            wet_gain: 0.0,
            dry_gain: 1.0,
            low_cut: BiquadCoefficients::IDENTITY,
            high_cut: BiquadCoefficients::IDENTITY,
        }
    }
}

impl ChannelCoefficients {
    /// Compute a fresh snapshot from one channel's controls.
    ///
    /// `capacity` is the delay line's maximum delay in samples; longer
    /// requests are clamped to it.
    pub fn compute<D: FilterDesign + ?Sized>(
        controls: &ChannelControls,
        sample_rate: f32,
        capacity: usize,
        design: &D,
    ) -> Self {
        let (wet_gain, dry_gain) = wet_dry_gains(controls.dry_wet_percent);

        Self {
            delay_samples: delay_samples(controls.delay_ms, sample_rate).min(capacity),
            feedback_gain: feedback_gain(controls.feedback_percent),
            wet_gain,
            dry_gain,
            low_cut: design.design(FilterKind::LowCut, controls.low_cut_hz, LOW_CUT_Q, sample_rate),
            high_cut: design.design(
                FilterKind::HighCut,
                controls.high_cut_hz,
                HIGH_CUT_Q,
                sample_rate,
            ),
        }
    }
}

/// Coefficients for both channels, taken together at the top of a block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoefficientSnapshot {
    pub left: ChannelCoefficients,
    pub right: ChannelCoefficients,
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::filter::Cookbook;

    #[test]
    fn test_feedback_gain_endpoints_are_exact() {
        assert_eq!(feedback_gain(0.0), 0.0);
        assert_eq!(feedback_gain(100.0), 1.0);
    }

    /// The 0 % override sits below the curve's own value at 0 %.
    #[test]
    fn test_feedback_gain_zero_is_an_override() {
        let curve_at_zero = 10.0_f32.powf(-20.0 / 20.0);
        assert!((curve_at_zero - 0.1).abs() < 1e-6);
        assert!(feedback_gain(0.0) < curve_at_zero);
        assert!(feedback_gain(0.5) > 0.1);
    }

    #[test]
    fn test_feedback_gain_db_scale() {
        // 50 % → 10 dB down.
        let g = feedback_gain(50.0);
        assert!((g - 0.316_227_77).abs() < 1e-5, "got {g}");
        // 95 % → 1 dB down.
        let g = feedback_gain(95.0);
        assert!((g - 0.891_250_9).abs() < 1e-5, "got {g}");
        // 76 % → 4.8 dB down.
        let g = feedback_gain(76.0);
        assert!((g - 0.575_439_9).abs() < 1e-5, "got {g}");
    }

    #[test]
    fn test_feedback_gain_is_monotonic() {
        let mut previous = feedback_gain(0.0);
        for tenth in 1..=1000 {
            let percent = tenth as f32 / 10.0;
            let g = feedback_gain(percent);
            assert!(
                g >= previous,
                "gain fell from {previous} to {g} at {percent}%"
            );
            assert!((0.0..=1.0).contains(&g));
            previous = g;
        }
    }

    #[test]
    fn test_delay_samples_rounds_up() {
        // 10.01 ms at 1 kHz is 10.01 samples → 11.
        assert_eq!(delay_samples(10.01, 1000.0), 11);
        // Whole results stay whole.
        assert_eq!(delay_samples(1000.0, 44100.0), 44100);
        assert_eq!(delay_samples(500.0, 48000.0), 24000);
        assert_eq!(delay_samples(150.0, 44100.0), 6615);
        // 50 ms at 44.1 kHz = 2205 exactly; a hair more rounds up.
        assert_eq!(delay_samples(50.0, 44100.0), 2205);
        assert_eq!(delay_samples(50.01, 44100.0), 2206);
    }

    #[test]
    fn test_delay_samples_is_monotonic() {
        for sample_rate in [22050.0, 44100.0, 48000.0, 96000.0] {
            let mut previous = 0;
            for ms in 50..=2000 {
                let n = delay_samples(ms as f32, sample_rate);
                assert!(n >= previous, "{ms} ms at {sample_rate} Hz went backwards");
                assert!(n as f64 >= ms as f64 * sample_rate as f64 / 1000.0);
                previous = n;
            }
        }
    }

    #[test]
    fn test_wet_plus_dry_is_one() {
        for step in 0..=200 {
            let percent = step as f32 / 2.0;
            let (wet, dry) = wet_dry_gains(percent);
            assert_eq!(wet + dry, 1.0, "wet {wet} + dry {dry} at {percent}%");
        }
        assert_eq!(wet_dry_gains(0.0), (0.0, 1.0));
        assert_eq!(wet_dry_gains(100.0), (1.0, 0.0));
    }

    #[test]
    fn test_compute_clamps_delay_to_capacity() {
        let controls = ChannelControls {
            delay_ms: 2000.0,
            ..ChannelControls::default()
        };
        let c = ChannelCoefficients::compute(&controls, 48000.0, 1000, &Cookbook);
        assert_eq!(c.delay_samples, 1000);
    }

    #[test]
    fn test_compute_uses_each_cutoff_for_its_own_filter() {
        let controls = ChannelControls {
            low_cut_hz: 123.0,
            high_cut_hz: 4567.0,
            ..ChannelControls::default()
        };
        let c = ChannelCoefficients::compute(&controls, 48000.0, 100_000, &Cookbook);

        assert_eq!(c.low_cut, Cookbook.design(FilterKind::LowCut, 123.0, LOW_CUT_Q, 48000.0));
        assert_eq!(
            c.high_cut,
            Cookbook.design(FilterKind::HighCut, 4567.0, HIGH_CUT_Q, 48000.0)
        );
        assert_eq!(c.delay_samples, 7200);
        assert!((c.feedback_gain - feedback_gain(50.0)).abs() < 1e-9);
        assert_eq!(c.wet_gain + c.dry_gain, 1.0);
    }
}
