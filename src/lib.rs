//! # Loveless Stereo Delay — An AU/VST3/CLAP Dual Feedback Delay
//!
//! Two independent feedback delays, one per channel, each with its own
//! time, feedback, dry/wet balance and a low cut + high cut inside the
//! feedback loop. Built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//!
//! ## Signal Flow (per channel)
//!
//! ```text
//! Input ──┬────────────────────────────────────────────── × dry ──────┐
//!         │                                                           │
//!         └──►(+)──► [Delay Line] ──┬──► × feedback ──► [Low Cut] ─┐  │
//!              ▲                    │                              │  │
//!              │                    │       ┌─── [High Cut] ◄──────┘  │
//!              └────────────────────│───────┘                         │
//!                                   │                                 │
//!                                   └──► × feedback × wet ──────────►(+)──► Output
//! ```
//!
//! The engine itself lives in [`dsp::engine`] and doesn't depend on any
//! host plumbing. This file is only the nih-plug shell around it.

pub mod controls;
pub mod dsp;
pub mod params;
pub mod state;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::coefficients::ChannelCoefficients;
use dsp::engine::DelayEngine;
use nih_plug::prelude::*;
use params::PluginParams;

/// The longest delay any channel can be set to. The delay lines are sized
/// for this at initialization so nothing is allocated while processing.
pub const MAX_DELAY_MS: f32 = controls::DELAY_MS_MAX;

/// The main plugin struct.
///
/// Parameters are shared with the host through an `Arc` and may be read or
/// written from any thread. The engine is owned by the audio thread and
/// only touched from `initialize()`, `reset()` and `process()`.
struct LovelessStereoDelay {
    params: Arc<PluginParams>,
    engine: DelayEngine,
}

impl Default for LovelessStereoDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            // Zero-capacity until initialize() tells us the sample rate.
            engine: DelayEngine::new(),
        }
    }
}

impl Plugin for LovelessStereoDelay {
    const NAME: &'static str = "Loveless Stereo Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo only: the two channels are the whole point.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are sampled once per block, so splitting blocks at
    // automation points would only add work.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate the delay lines for [`MAX_DELAY_MS`] at the host's rate.
    ///
    /// Returning `false` tells the host this configuration can't be used.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        match self
            .engine
            .initialize(buffer_config.sample_rate, MAX_DELAY_MS)
        {
            Ok(()) => {
                nih_log!(
                    "initialized at {} Hz, {} samples of delay per channel",
                    buffer_config.sample_rate,
                    self.engine.capacity()
                );
                true
            }
            Err(err) => {
                nih_log!("refusing configuration: {err}");
                false
            }
        }
    }

    /// Called when playback stops or the plugin is bypassed. Clears the
    /// delay lines and filter histories so old echoes don't come back.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One read of every control for the whole block.
        let controls = self.params.controls();

        let [left, right] = buffer.as_slice() else {
            nih_debug_assert_failure!("expected a stereo buffer");
            return ProcessStatus::Normal;
        };
        self.engine.process_block(left, right, &controls);

        let snapshot = self.engine.snapshot();
        match (tail_samples(&snapshot.left), tail_samples(&snapshot.right)) {
            (Some(left), Some(right)) => ProcessStatus::Tail(left.max(right)),
            _ => ProcessStatus::KeepAlive,
        }
    }
}

/// How long one channel rings after its input goes silent, in samples.
///
/// The loop multiplies each repeat by `feedback_gain` (the filters only
/// take away), so after `n` repeats the level is `feedback_gain^n`. The
/// tail ends once that reaches -60 dB:
///
/// ```text
/// n = log10(0.001) / log10(feedback_gain) = -3 / log10(feedback_gain)
/// ```
///
/// Returns `None` at unity feedback, which never decays.
fn tail_samples(coefficients: &ChannelCoefficients) -> Option<u32> {
    let delay = coefficients.delay_samples as f32;
    let feedback = coefficients.feedback_gain;

    if feedback >= 1.0 {
        None
    } else if feedback > 0.001 {
        let repeats = -3.0 / feedback.log10();
        Some((repeats.ceil() * delay) as u32)
    } else {
        // A single pass through the line.
        Some(delay as u32)
    }
}

impl ClapPlugin for LovelessStereoDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-stereo-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Dual feedback delay with low and high cut in the feedback loop");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for LovelessStereoDelay {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssStDelay_v01";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay, Vst3SubCategory::Stereo];
}

nih_export_clap!(LovelessStereoDelay);
nih_export_vst3!(LovelessStereoDelay);

// AUv2 entry point for Logic Pro, generated from the CLAP export.
clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;
    use dsp::coefficients::feedback_gain;

    fn channel(delay_samples: usize, feedback_percent: f32) -> ChannelCoefficients {
        ChannelCoefficients {
            delay_samples,
            feedback_gain: feedback_gain(feedback_percent),
            ..ChannelCoefficients::default()
        }
    }

    #[test]
    fn test_tail_without_feedback_is_one_delay() {
        assert_eq!(tail_samples(&channel(4410, 0.0)), Some(4410));
    }

    #[test]
    fn test_tail_at_unity_feedback_never_ends() {
        assert_eq!(tail_samples(&channel(4410, 100.0)), None);
    }

    #[test]
    fn test_tail_grows_with_feedback() {
        // 50 % is -10 dB per repeat: about six repeats to reach -60 dB.
        let tail = tail_samples(&channel(1000, 50.0)).unwrap();
        assert!((6000..=7000).contains(&tail), "got {tail}");

        let short = tail_samples(&channel(1000, 40.0)).unwrap();
        let long = tail_samples(&channel(1000, 90.0)).unwrap();
        assert!(long > short, "{long} should exceed {short}");
    }
}
