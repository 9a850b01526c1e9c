//! # Stereo Feedback Delay Engine
//!
//! Host-independent signal path. The plugin shell owns one of these, but
//! nothing here knows about nih-plug buffers or parameters: it takes two
//! mutable sample slices and a [`StereoControls`] snapshot.
//!
//! ## Per-Sample Algorithm (each channel, independently)
//!
//! ```text
//! 1. fb  = delay.peek()
//! 2. fb *= feedback_gain
//! 3. fb  = low_cut.tick(fb)
//! 4. fb  = high_cut.tick(fb)
//! 5. delay.push(input + fb)
//! 6. out = dry_gain * input + feedback_gain * wet_gain * delay.peek()
//! ```
//!
//! The line stores the raw input plus the filtered, attenuated feedback.
//! The output tap peeks the line again *after* the push and applies the
//! feedback gain a second time on top of the wet gain. So the first echo
//! already comes out at `feedback_gain * wet_gain`, and with 0 % feedback
//! the wet side of the output is silent.

use super::coefficients::{ChannelCoefficients, CoefficientSnapshot};
use super::delay_line::{DelayLine, DelayLineError};
use super::filter::{Biquad, Cookbook, FilterDesign};
use crate::controls::{Channel, ChannelControls, StereoControls};
use thiserror::Error;

/// Configuration-time failures. Block processing itself cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineError {
    #[error("sample rate must be a positive, finite number of Hz (got {0})")]
    InvalidSampleRate(f32),
    #[error("maximum delay must be a non-negative, finite number of milliseconds (got {0})")]
    InvalidMaxDelay(f32),
    #[error(transparent)]
    DelayLine(#[from] DelayLineError),
}

/// The state of one channel: its delay line and its two loop filters.
struct ChannelState {
    delay_line: DelayLine,
    low_cut: Biquad,
    high_cut: Biquad,
}

impl ChannelState {
    fn new(capacity: usize) -> Self {
        Self {
            delay_line: DelayLine::new(capacity),
            low_cut: Biquad::new(),
            high_cut: Biquad::new(),
        }
    }

    /// Load a block's coefficients. Filter history is kept.
    fn apply(&mut self, coefficients: &ChannelCoefficients) -> Result<(), DelayLineError> {
        self.delay_line.set_delay(coefficients.delay_samples)?;
        self.low_cut.set_coefficients(coefficients.low_cut);
        self.high_cut.set_coefficients(coefficients.high_cut);
        Ok(())
    }

    fn process(&mut self, samples: &mut [f32], coefficients: &ChannelCoefficients) {
        let ChannelCoefficients {
            feedback_gain,
            wet_gain,
            dry_gain,
            ..
        } = *coefficients;
        let output_tap_gain = feedback_gain * wet_gain;

        for sample in samples.iter_mut() {
            let input = *sample;

            let mut feedback = self.delay_line.peek();
            feedback *= feedback_gain;
            feedback = self.low_cut.tick(feedback);
            feedback = self.high_cut.tick(feedback);
            self.delay_line.push(input + feedback);

            *sample = dry_gain * input + output_tap_gain * self.delay_line.peek();
        }
    }

    fn reset(&mut self) {
        self.delay_line.clear();
        self.low_cut.reset();
        self.high_cut.reset();
    }
}

/// Two independent feedback delays, one per channel.
///
/// `D` derives the loop filters' coefficients; the default is the RBJ
/// [`Cookbook`].
pub struct DelayEngine<D = Cookbook> {
    design: D,
    sample_rate: f32,
    left: ChannelState,
    right: ChannelState,
    /// What the most recent block ran with.
    snapshot: CoefficientSnapshot,
}

impl DelayEngine<Cookbook> {
    /// An uninitialized engine using the cookbook filter designs.
    pub fn new() -> Self {
        Self::with_design(Cookbook)
    }
}

impl Default for DelayEngine<Cookbook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: FilterDesign> DelayEngine<D> {
    /// An engine with zero-capacity delay lines. Call
    /// [`initialize()`](Self::initialize) before processing audio.
    pub fn with_design(design: D) -> Self {
        Self {
            design,
            sample_rate: 0.0,
            left: ChannelState::new(0),
            right: ChannelState::new(0),
            snapshot: CoefficientSnapshot::default(),
        }
    }

    /// Allocate both delay lines for up to `max_delay_ms` at `sample_rate`.
    ///
    /// This is the only place the engine allocates. Any previous audio and
    /// filter history is discarded.
    pub fn initialize(&mut self, sample_rate: f32, max_delay_ms: f32) -> Result<(), EngineError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        if !max_delay_ms.is_finite() || max_delay_ms < 0.0 {
            return Err(EngineError::InvalidMaxDelay(max_delay_ms));
        }

        let capacity = super::coefficients::delay_samples(max_delay_ms, sample_rate);
        self.sample_rate = sample_rate;
        self.left = ChannelState::new(capacity);
        self.right = ChannelState::new(capacity);
        self.snapshot = CoefficientSnapshot::default();
        Ok(())
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Maximum delay per channel, in samples.
    pub fn capacity(&self) -> usize {
        self.left.delay_line.capacity()
    }

    /// Coefficients used by the most recent [`process_block()`](Self::process_block).
    pub fn snapshot(&self) -> &CoefficientSnapshot {
        &self.snapshot
    }

    /// Compute a snapshot for `controls` without touching any state.
    pub fn coefficients(&self, controls: &StereoControls) -> CoefficientSnapshot {
        CoefficientSnapshot {
            left: self.channel_coefficients(&controls.left),
            right: self.channel_coefficients(&controls.right),
        }
    }

    fn channel_coefficients(&self, controls: &ChannelControls) -> ChannelCoefficients {
        ChannelCoefficients::compute(controls, self.sample_rate, self.capacity(), &self.design)
    }

    /// Run one block in place.
    ///
    /// Coefficients are computed once from `controls`, then every sample
    /// of both slices is processed with that same set. Both slices should
    /// be the same length.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], controls: &StereoControls) {
        nih_plug::nih_debug_assert_eq!(left.len(), right.len());

        let snapshot = self.coefficients(controls);

        // `compute()` clamps to capacity, so neither of these can fail.
        if let Err(err) = self
            .left
            .apply(&snapshot.left)
            .and_then(|()| self.right.apply(&snapshot.right))
        {
            nih_plug::nih_debug_assert_failure!("{}", err);
        }

        self.left.process(left, &snapshot.left);
        self.right.process(right, &snapshot.right);
        self.snapshot = snapshot;
    }

    /// Set one channel's delay directly. The next block replaces it with the
    /// delay derived from its controls.
    ///
    /// Fails if `samples` exceeds the capacity allocated in `initialize()`.
    pub fn set_delay_samples(&mut self, channel: Channel, samples: usize) -> Result<(), EngineError> {
        let state = match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        };
        state.delay_line.set_delay(samples)?;
        Ok(())
    }

    /// Silence the delay lines and filter histories.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
