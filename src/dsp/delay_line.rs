//! # Delay Line (Ring Buffer)
//!
//! A fixed-capacity circular buffer that reproduces its input a whole
//! number of samples later. The feedback loop uses it in a strict
//! peek → push → peek rhythm, so the interface is split the same way:
//!
//! - [`peek()`](DelayLine::peek) looks at the delayed sample without
//!   touching any state. Calling it twice in a row returns the same value.
//! - [`push()`](DelayLine::push) stores a new sample and moves the write
//!   head forward by one.
//!
//! ## Index Math
//!
//! The buffer holds `capacity + 1` slots so that a delay equal to the full
//! capacity still has a distinct read slot. With `d` samples of delay, the
//! read head sits `d` slots behind the write head:
//!
//! ```text
//! read_index = (write_pos + buffer_len - d) % buffer_len
//! ```
//!
//! Before a push, that slot holds the sample pushed exactly `d` pushes ago.
//! After a push, the write head has moved on, so the same formula yields
//! the sample pushed `d - 1` pushes before the one just written. The
//! engine relies on both readings.
//!
//! Delays are whole samples. The delay time is rounded up to an integer
//! once per block and never changes mid-block, so there is nothing to
//! interpolate between.

use thiserror::Error;

/// Raised when a delay is requested that the pre-allocated buffer cannot
/// hold. This is a configuration error: the audio path clamps before it
/// ever asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested delay of {requested} samples exceeds the delay line capacity of {capacity}")]
pub struct DelayLineError {
    pub requested: usize,
    pub capacity: usize,
}

/// A ring buffer that functions as an audio delay line.
///
/// The buffer is allocated once, in [`new()`](Self::new), and never
/// resized. Changing the delay only moves the read head.
pub struct DelayLine {
    /// `capacity + 1` samples, all starting at silence.
    buffer: Vec<f32>,

    /// Where the next pushed sample will be stored.
    write_pos: usize,

    /// Current read/write separation in samples. Always `<= capacity`.
    delay: usize,
}

impl DelayLine {
    /// Create a delay line able to hold up to `capacity` samples of delay.
    ///
    /// The initial delay is zero; call [`set_delay()`](Self::set_delay)
    /// before processing.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity + 1],
            write_pos: 0,
            delay: 0,
        }
    }

    /// The largest delay, in samples, this line accepts.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    /// The current delay in samples.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Set the read/write separation. Takes effect on the next peek/push.
    ///
    /// Asking for more than [`capacity()`](Self::capacity) leaves the delay
    /// unchanged and returns an error.
    pub fn set_delay(&mut self, samples: usize) -> Result<(), DelayLineError> {
        let capacity = self.capacity();
        if samples > capacity {
            return Err(DelayLineError {
                requested: samples,
                capacity,
            });
        }

        self.delay = samples;
        Ok(())
    }

    /// Return the sample sitting under the read head. Does not mutate.
    #[inline]
    pub fn peek(&self) -> f32 {
        let len = self.buffer.len();
        self.buffer[(self.write_pos + len - self.delay) % len]
    }

    /// Store `sample` at the write head and advance it by one, wrapping at
    /// the end of the buffer.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Clear the entire buffer to silence and reset the write position.
    /// The configured delay is kept.
    ///
    /// Called from the plugin's `reset()` so stale echoes from the last
    /// playback don't bleed into the next one.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Before each push, peek sees the sample pushed exactly `delay` pushes ago.
    #[test]
    fn test_peek_before_push_is_delay_samples_back() {
        let mut dl = DelayLine::new(16);
        dl.set_delay(3).unwrap();

        let mut seen = Vec::new();
        for i in 1..=8 {
            seen.push(dl.peek());
            dl.push(i as f32);
        }

        // The first three peeks read untouched (silent) slots, then the
        // sequence reappears three samples late.
        assert_eq!(seen, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    /// After a push, the same read head is one sample "closer" to the write.
    #[test]
    fn test_peek_after_push_trails_by_one_less() {
        let mut dl = DelayLine::new(16);
        dl.set_delay(3).unwrap();

        let mut seen = Vec::new();
        for i in 1..=6 {
            dl.push(i as f32);
            seen.push(dl.peek());
        }

        assert_eq!(seen, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    /// Repeated peeks without an intervening push must not move anything.
    #[test]
    fn test_peek_is_idempotent() {
        let mut dl = DelayLine::new(8);
        dl.set_delay(2).unwrap();
        dl.push(0.25);
        dl.push(0.5);

        let first = dl.peek();
        for _ in 0..10 {
            assert_eq!(dl.peek(), first);
        }
        assert!((first - 0.25).abs() < 1e-6, "Expected 0.25, got {first}");
    }

    /// Verify the buffer wraps correctly past its boundaries.
    #[test]
    fn test_wrapping() {
        // Capacity 4 → five slots. Push enough to wrap twice.
        let mut dl = DelayLine::new(4);
        dl.set_delay(4).unwrap();

        let mut seen = Vec::new();
        for i in 0..12 {
            seen.push(dl.peek());
            dl.push(i as f32);
        }

        assert_eq!(&seen[4..], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    /// A delay equal to the capacity is legal; one more is not.
    #[test]
    fn test_set_delay_bounds() {
        let mut dl = DelayLine::new(10);

        assert!(dl.set_delay(10).is_ok());
        assert_eq!(dl.delay(), 10);

        let err = dl.set_delay(11).unwrap_err();
        assert_eq!(
            err,
            DelayLineError {
                requested: 11,
                capacity: 10
            }
        );
        // The rejected request leaves the previous delay in place.
        assert_eq!(dl.delay(), 10);
    }

    /// A new delay applies on the very next peek.
    #[test]
    fn test_set_delay_takes_effect_immediately() {
        let mut dl = DelayLine::new(10);
        for i in 1..=5 {
            dl.push(i as f32);
        }

        dl.set_delay(1).unwrap();
        assert!((dl.peek() - 5.0).abs() < 1e-6);
        dl.set_delay(4).unwrap();
        assert!((dl.peek() - 2.0).abs() < 1e-6);
    }

    /// Verify that clearing resets everything to silence.
    #[test]
    fn test_clear() {
        let mut dl = DelayLine::new(10);
        dl.set_delay(1).unwrap();

        dl.push(0.5);
        dl.clear();

        let result = dl.peek();
        assert!(
            result.abs() < 1e-6,
            "Expected 0.0 after clear, got {result}"
        );
        assert_eq!(dl.delay(), 1, "clear() must keep the configured delay");
    }
}
