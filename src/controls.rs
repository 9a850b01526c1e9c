//! # Control Values
//!
//! Plain-data view of the user's settings, decoupled from nih-plug so the
//! DSP engine and the saved-state code can be exercised without a host.
//!
//! [`PluginParams`](crate::params::PluginParams) owns the live, atomic
//! values. Once per block the plugin copies them into a [`StereoControls`]
//! and hands that snapshot to the engine.

use serde::{Deserialize, Serialize};

pub const DELAY_MS_MIN: f32 = 50.0;
pub const DELAY_MS_MAX: f32 = 2000.0;
pub const DELAY_MS_DEFAULT: f32 = 150.0;

pub const PERCENT_MIN: f32 = 0.0;
pub const PERCENT_MAX: f32 = 100.0;
pub const FEEDBACK_DEFAULT: f32 = 50.0;
pub const DRY_WET_DEFAULT: f32 = 50.0;

pub const CUTOFF_HZ_MIN: f32 = 20.0;
pub const CUTOFF_HZ_MAX: f32 = 20000.0;
pub const LOW_CUT_DEFAULT_HZ: f32 = 200.0;
pub const HIGH_CUT_DEFAULT_HZ: f32 = 5000.0;

/// Q of the low cut (high-pass) in the feedback loop. Fixed, not exposed.
pub const LOW_CUT_Q: f32 = 0.5;
/// Q of the high cut (low-pass) in the feedback loop. Fixed, not exposed.
pub const HIGH_CUT_Q: f32 = 0.5;

/// Left or right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub fn other(self) -> Self {
        match self {
            Channel::Left => Channel::Right,
            Channel::Right => Channel::Left,
        }
    }
}

/// The five settings that shape one channel's echo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelControls {
    /// Echo spacing in milliseconds, `[50, 2000]`.
    pub delay_ms: f32,
    /// Feedback amount in percent, `[0, 100]`. Mapped onto a dB scale.
    pub feedback_percent: f32,
    /// Wet share of the output in percent, `[0, 100]`.
    pub dry_wet_percent: f32,
    /// Cutoff of the high-pass in the feedback loop, `[20, 20000]` Hz.
    pub low_cut_hz: f32,
    /// Cutoff of the low-pass in the feedback loop, `[20, 20000]` Hz.
    pub high_cut_hz: f32,
}

impl Default for ChannelControls {
    fn default() -> Self {
        Self {
            delay_ms: DELAY_MS_DEFAULT,
            feedback_percent: FEEDBACK_DEFAULT,
            dry_wet_percent: DRY_WET_DEFAULT,
            low_cut_hz: LOW_CUT_DEFAULT_HZ,
            high_cut_hz: HIGH_CUT_DEFAULT_HZ,
        }
    }
}

impl ChannelControls {
    /// Pull every field back into its declared range. NaN falls back to
    /// the default for that field.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f32, min: f32, max: f32, fallback: f32| {
            if value.is_nan() {
                fallback
            } else {
                value.clamp(min, max)
            }
        };

        Self {
            delay_ms: clamp(self.delay_ms, DELAY_MS_MIN, DELAY_MS_MAX, defaults.delay_ms),
            feedback_percent: clamp(
                self.feedback_percent,
                PERCENT_MIN,
                PERCENT_MAX,
                defaults.feedback_percent,
            ),
            dry_wet_percent: clamp(
                self.dry_wet_percent,
                PERCENT_MIN,
                PERCENT_MAX,
                defaults.dry_wet_percent,
            ),
            low_cut_hz: clamp(self.low_cut_hz, CUTOFF_HZ_MIN, CUTOFF_HZ_MAX, defaults.low_cut_hz),
            high_cut_hz: clamp(
                self.high_cut_hz,
                CUTOFF_HZ_MIN,
                CUTOFF_HZ_MAX,
                defaults.high_cut_hz,
            ),
        }
    }
}

/// Both channels plus the Match L/R switch.
///
/// `match_lr` only changes how edits are applied here, in the control
/// layer. The engine never looks at it: left and right are always
/// processed from their own values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StereoControls {
    pub left: ChannelControls,
    pub right: ChannelControls,
    pub match_lr: bool,
}

impl StereoControls {
    pub fn channel(&self, channel: Channel) -> &ChannelControls {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelControls {
        match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }

    /// Apply an edit to one channel. With Match L/R on, the edited field is
    /// copied to the other channel as well.
    pub fn edit(&mut self, channel: Channel, edit: impl Fn(&mut ChannelControls)) {
        edit(self.channel_mut(channel));
        if self.match_lr {
            edit(self.channel_mut(channel.other()));
        }
    }

    /// Flip Match L/R. Turning it on copies the left channel onto the right.
    pub fn set_match_lr(&mut self, enabled: bool) {
        self.match_lr = enabled;
        if enabled {
            self.right = self.left;
        }
    }
}

/// Render a cutoff for display: whole Hz below 1 kHz, otherwise kHz with
/// two decimals below 10 kHz and one decimal above.
pub fn format_cutoff(hz: f32) -> String {
    if hz >= 9999.5 {
        let tenths = (hz / 100.0).round() as u32;
        format!("{}.{} kHz", tenths / 10, tenths % 10)
    } else if hz >= 999.5 {
        let hundredths = (hz / 10.0).round() as u32;
        format!("{}.{:02} kHz", hundredths / 100, hundredths % 100)
    } else {
        format!("{} Hz", hz.round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_factory_preset() {
        let c = ChannelControls::default();
        assert_eq!(c.delay_ms, 150.0);
        assert_eq!(c.feedback_percent, 50.0);
        assert_eq!(c.dry_wet_percent, 50.0);
        assert_eq!(c.low_cut_hz, 200.0);
        assert_eq!(c.high_cut_hz, 5000.0);
        assert!(!StereoControls::default().match_lr);
    }

    #[test]
    fn test_clamped() {
        let wild = ChannelControls {
            delay_ms: 5000.0,
            feedback_percent: -3.0,
            dry_wet_percent: f32::NAN,
            low_cut_hz: 1.0,
            high_cut_hz: 1e6,
        }
        .clamped();

        assert_eq!(wild.delay_ms, DELAY_MS_MAX);
        assert_eq!(wild.feedback_percent, PERCENT_MIN);
        assert_eq!(wild.dry_wet_percent, DRY_WET_DEFAULT);
        assert_eq!(wild.low_cut_hz, CUTOFF_HZ_MIN);
        assert_eq!(wild.high_cut_hz, CUTOFF_HZ_MAX);
    }

    /// Without Match L/R, an edit stays on its own side.
    #[test]
    fn test_edit_unmatched() {
        let mut controls = StereoControls::default();
        controls.edit(Channel::Right, |c| c.delay_ms = 800.0);

        assert_eq!(controls.right.delay_ms, 800.0);
        assert_eq!(controls.left.delay_ms, DELAY_MS_DEFAULT);
    }

    /// With Match L/R on, an edit on either side lands on both.
    #[test]
    fn test_edit_matched_mirrors() {
        let mut controls = StereoControls::default();
        controls.set_match_lr(true);

        controls.edit(Channel::Right, |c| c.feedback_percent = 90.0);
        assert_eq!(controls.left.feedback_percent, 90.0);

        controls.edit(Channel::Left, |c| {
            c.low_cut_hz = 80.0;
            c.high_cut_hz = 9000.0;
        });
        assert_eq!(controls.right.low_cut_hz, 80.0);
        assert_eq!(controls.right.high_cut_hz, 9000.0);
    }

    /// Enabling Match L/R copies left onto right; disabling leaves both be.
    #[test]
    fn test_set_match_lr_copies_left() {
        let mut controls = StereoControls::default();
        controls.left.delay_ms = 333.0;
        controls.right.delay_ms = 999.0;

        controls.set_match_lr(true);
        assert_eq!(controls.right, controls.left);

        controls.set_match_lr(false);
        controls.edit(Channel::Left, |c| c.delay_ms = 100.0);
        assert_eq!(controls.right.delay_ms, 333.0);
    }

    #[test]
    fn test_format_cutoff() {
        assert_eq!(format_cutoff(20.0), "20 Hz");
        assert_eq!(format_cutoff(200.0), "200 Hz");
        assert_eq!(format_cutoff(999.4), "999 Hz");
        assert_eq!(format_cutoff(1000.0), "1.00 kHz");
        assert_eq!(format_cutoff(5000.0), "5.00 kHz");
        assert_eq!(format_cutoff(1234.0), "1.23 kHz");
        assert_eq!(format_cutoff(12000.0), "12.0 kHz");
        assert_eq!(format_cutoff(20000.0), "20.0 kHz");
    }
}
