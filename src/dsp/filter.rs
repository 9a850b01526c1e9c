//! # Biquad Filter
//!
//! A two-pole/two-zero IIR section. The delay uses two per channel inside
//! the feedback loop: a high-pass as the **low cut** and a low-pass as the
//! **high cut**. Each trip around the loop passes through both again, so
//! the repeats get thinner and darker as they decay.
//!
//! ## The Filter Equation
//!
//! ```text
//! y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]
//! ```
//!
//! evaluated in Transposed Direct Form II, which folds all four history
//! terms into two state registers (`z1`, `z2`):
//!
//! ```text
//! y  = b0·x + z1
//! z1 = b1·x - a1·y + z2
//! z2 = b2·x - a2·y
//! ```
//!
//! ## Coefficient Updates
//!
//! Coefficients are recomputed once per audio block. Replacing them leaves
//! `z1`/`z2` alone: the filter keeps ringing with its existing history and
//! simply continues under the new response.

use std::f64::consts::PI;

/// The five normalized coefficients of a biquad (`a0` already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which response a filter slot in the feedback loop needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Removes content below the cutoff (a high-pass).
    LowCut,
    /// Removes content above the cutoff (a low-pass).
    HighCut,
}

/// Maps a cutoff, a Q and a sample rate to biquad coefficients.
///
/// The engine calls this once per block per filter and treats it as a pure
/// function. Any `Fn(FilterKind, f32, f32, f32) -> BiquadCoefficients`
/// closure works too, which is handy for pinning the response in tests.
pub trait FilterDesign {
    fn design(
        &self,
        kind: FilterKind,
        cutoff_hz: f32,
        q: f32,
        sample_rate: f32,
    ) -> BiquadCoefficients;
}

impl<F> FilterDesign for F
where
    F: Fn(FilterKind, f32, f32, f32) -> BiquadCoefficients,
{
    fn design(
        &self,
        kind: FilterKind,
        cutoff_hz: f32,
        q: f32,
        sample_rate: f32,
    ) -> BiquadCoefficients {
        self(kind, cutoff_hz, q, sample_rate)
    }
}

/// Second-order high-pass / low-pass from the RBJ Audio EQ Cookbook.
///
/// Math runs in `f64`; only the final normalized coefficients are narrowed
/// to `f32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cookbook;

impl FilterDesign for Cookbook {
    fn design(
        &self,
        kind: FilterKind,
        cutoff_hz: f32,
        q: f32,
        sample_rate: f32,
    ) -> BiquadCoefficients {
        let sample_rate = f64::from(sample_rate);
        // Stay clear of Nyquist, where sin(ω) collapses and the section
        // degenerates.
        let cutoff = f64::from(cutoff_hz).clamp(1.0, sample_rate * 0.49);

        let omega = 2.0 * PI * cutoff / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * f64::from(q));

        let (b0, b1, b2) = match kind {
            FilterKind::LowCut => {
                let b = (1.0 + cos_omega) / 2.0;
                (b, -(1.0 + cos_omega), b)
            }
            FilterKind::HighCut => {
                let b = (1.0 - cos_omega) / 2.0;
                (b, 1.0 - cos_omega, b)
            }
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        BiquadCoefficients {
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
        }
    }
}

/// A biquad section with persistent state.
pub struct Biquad {
    coefficients: BiquadCoefficients,
    z1: f32,
    z2: f32,
}

impl Biquad {
    /// Create a filter initialized to passthrough with silent history.
    pub fn new() -> Self {
        Self {
            coefficients: BiquadCoefficients::IDENTITY,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Replace the coefficients. History is left untouched.
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coefficients
    }

    /// Run one sample through the filter.
    #[inline]
    pub fn tick(&mut self, input: f32) -> f32 {
        let BiquadCoefficients { b0, b1, b2, a1, a2 } = self.coefficients;

        let output = b0 * input + self.z1;
        self.z1 = b1 * input - a1 * output + self.z2;
        self.z2 = b2 * input - a2 * output;
        output
    }

    /// Zero the history registers.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
