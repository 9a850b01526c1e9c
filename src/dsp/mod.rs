//! # DSP (Digital Signal Processing)
//!
//! - **`delay_line`**: whole-sample ring buffer with peek/push access.
//! - **`filter`**: biquad sections for the low cut and high cut in the
//!   feedback loop, plus the coefficient design they're fed from.
//! - **`coefficients`**: once-per-block translation of controls (ms, %, Hz)
//!   into samples, linear gains and filter coefficients.
//! - **`engine`**: the per-sample feedback loop for both channels.

pub mod coefficients;
pub mod delay_line;
pub mod engine;
pub mod filter;
