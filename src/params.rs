//! # Plugin Parameters
//!
//! Ten knobs (five per channel) and the Match L/R switch.
//!
//! - The **string IDs** (`#[id = "..."]`) are what hosts store in sessions
//!   and presets. They follow the names earlier versions of this delay
//!   shipped with, so never change them. Note the cutoff IDs are named
//!   after the filter *type*: the low cut is a high-pass
//!   (`...HighPassCutFc`) and the high cut is a low-pass (`...LowPassCutFc`).
//! - There is **no smoothing**. The engine reads every value once at the
//!   top of a block and holds it for the whole block, so a knob move lands
//!   as a single step on the next block boundary.
//!
//! ## Skew
//!
//! nih-plug's `FloatRange::Skewed` maps the normalized knob position `x`
//! to `min + (max - min) * x^(1 / factor)`. A factor below 1 gives the low
//! end of the range more knob travel: `0.5` for delay time, `0.25` for the
//! cutoffs, since pitch perception is roughly logarithmic.

use nih_plug::prelude::*;

use crate::controls::{
    format_cutoff, ChannelControls, StereoControls, CUTOFF_HZ_MAX, CUTOFF_HZ_MIN,
    DELAY_MS_DEFAULT, DELAY_MS_MAX, DELAY_MS_MIN, DRY_WET_DEFAULT, FEEDBACK_DEFAULT,
    HIGH_CUT_DEFAULT_HZ, LOW_CUT_DEFAULT_HZ, PERCENT_MAX, PERCENT_MIN,
};

/// All user-facing parameters.
#[derive(Params)]
pub struct PluginParams {
    #[id = "leftDelayMs"]
    pub left_delay_ms: FloatParam,
    #[id = "rightDelayMs"]
    pub right_delay_ms: FloatParam,

    /// Percent, mapped onto a dB scale: every 5 % below 100 is 1 dB less
    /// feedback, and 0 % switches the feedback off entirely.
    #[id = "leftFeedback"]
    pub left_feedback: FloatParam,
    #[id = "rightFeedback"]
    pub right_feedback: FloatParam,

    #[id = "leftDryWet"]
    pub left_dry_wet: FloatParam,
    #[id = "rightDryWet"]
    pub right_dry_wet: FloatParam,

    #[id = "leftHighPassCutFc"]
    pub left_low_cut: FloatParam,
    #[id = "rightHighPassCutFc"]
    pub right_low_cut: FloatParam,
    #[id = "leftLowPassCutFc"]
    pub left_high_cut: FloatParam,
    #[id = "rightLowPassCutFc"]
    pub right_high_cut: FloatParam,

    /// Control-surface convenience only: the editor mirrors edits between
    /// channels while it's on. Audio processing ignores it.
    #[id = "matchLR"]
    pub match_lr: BoolParam,
}

fn delay_param(name: &str) -> FloatParam {
    FloatParam::new(
        name,
        DELAY_MS_DEFAULT,
        FloatRange::Skewed {
            min: DELAY_MS_MIN,
            max: DELAY_MS_MAX,
            factor: FloatRange::skew_factor(-1.0),
        },
    )
    .with_unit(" ms")
    .with_step_size(1.0)
}

fn percent_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(
        name,
        default,
        FloatRange::Linear {
            min: PERCENT_MIN,
            max: PERCENT_MAX,
        },
    )
    .with_unit(" %")
    .with_step_size(1.0)
}

fn cutoff_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(
        name,
        default,
        FloatRange::Skewed {
            min: CUTOFF_HZ_MIN,
            max: CUTOFF_HZ_MAX,
            factor: FloatRange::skew_factor(-2.0),
        },
    )
    .with_step_size(0.1)
    // The unit is part of the formatted string ("200 Hz", "5.00 kHz").
    .with_value_to_string(std::sync::Arc::new(format_cutoff))
    .with_string_to_value(formatters::s2v_f32_hz_then_khz())
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            left_delay_ms: delay_param("Left Delay (ms)"),
            right_delay_ms: delay_param("Right Delay (ms)"),

            left_feedback: percent_param("Left Feedback", FEEDBACK_DEFAULT),
            right_feedback: percent_param("Right Feedback", FEEDBACK_DEFAULT),

            left_dry_wet: percent_param("Left Dry/Wet", DRY_WET_DEFAULT),
            right_dry_wet: percent_param("Right Dry/Wet", DRY_WET_DEFAULT),

            left_low_cut: cutoff_param("Left Low Cut Fc", LOW_CUT_DEFAULT_HZ),
            right_low_cut: cutoff_param("Right Low Cut Fc", LOW_CUT_DEFAULT_HZ),
            left_high_cut: cutoff_param("Left High Cut Fc", HIGH_CUT_DEFAULT_HZ),
            right_high_cut: cutoff_param("Right High Cut Fc", HIGH_CUT_DEFAULT_HZ),

            match_lr: BoolParam::new("Match L/R", false),
        }
    }
}

impl PluginParams {
    /// Copy the current (unsmoothed) values into a plain snapshot.
    ///
    /// Each read is a relaxed atomic load, so this never blocks. A knob
    /// moved while the copy is taken may land in this block or the next.
    pub fn controls(&self) -> StereoControls {
        StereoControls {
            left: ChannelControls {
                delay_ms: self.left_delay_ms.value(),
                feedback_percent: self.left_feedback.value(),
                dry_wet_percent: self.left_dry_wet.value(),
                low_cut_hz: self.left_low_cut.value(),
                high_cut_hz: self.left_high_cut.value(),
            },
            right: ChannelControls {
                delay_ms: self.right_delay_ms.value(),
                feedback_percent: self.right_feedback.value(),
                dry_wet_percent: self.right_dry_wet.value(),
                low_cut_hz: self.right_low_cut.value(),
                high_cut_hz: self.right_high_cut.value(),
            },
            match_lr: self.match_lr.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_default_controls() {
        let controls = PluginParams::default().controls();
        assert_eq!(controls, StereoControls::default());
    }

    #[test]
    fn test_param_ids_are_stable() {
        let ids: Vec<String> = PluginParams::default()
            .param_map()
            .into_iter()
            .map(|(id, _, _)| id)
            .collect();

        for expected in [
            "leftDelayMs",
            "rightDelayMs",
            "leftFeedback",
            "rightFeedback",
            "leftDryWet",
            "rightDryWet",
            "leftHighPassCutFc",
            "rightHighPassCutFc",
            "leftLowPassCutFc",
            "rightLowPassCutFc",
            "matchLR",
        ] {
            assert!(ids.iter().any(|id| id == expected), "missing param id {expected}");
        }
    }
}
