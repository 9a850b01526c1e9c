//! # Saved Control State
//!
//! Two encodings of the ten numeric controls (Match L/R is not saved):
//!
//! - **Named** (what [`save()`] writes): a versioned JSON object with one
//!   sub-object per channel, keyed by field name.
//!
//!   ```text
//!   {"version":2,"left":{"delay_ms":150.0,...},"right":{...}}
//!   ```
//!
//! - **Positional** (legacy, read and written for older sessions): a JSON
//!   array of the ten values in a fixed order, see [`POSITIONAL_LAYOUT`].
//!
//! [`restore()`] accepts either. Loading is forgiving: a missing entry
//! keeps whatever value the control already had, and an entry that isn't
//! a number is skipped and reported instead of failing the whole load.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::controls::{Channel, ChannelControls, StereoControls};

/// Version tag written into the named form.
pub const STATE_VERSION: u32 = 2;

/// Slot order of the positional form: each control, left then right.
pub const POSITIONAL_LAYOUT: [(Channel, &str); 10] = [
    (Channel::Left, "delay_ms"),
    (Channel::Right, "delay_ms"),
    (Channel::Left, "feedback_percent"),
    (Channel::Right, "feedback_percent"),
    (Channel::Left, "dry_wet_percent"),
    (Channel::Right, "dry_wet_percent"),
    (Channel::Left, "low_cut_hz"),
    (Channel::Right, "low_cut_hz"),
    (Channel::Left, "high_cut_hz"),
    (Channel::Right, "high_cut_hz"),
];

const CHANNEL_FIELDS: [&str; 5] = [
    "delay_ms",
    "feedback_percent",
    "dry_wet_percent",
    "low_cut_hz",
    "high_cut_hz",
];

#[derive(Debug, Error)]
pub enum StateError {
    #[error("saved state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("saved state must be a JSON object or array, found {0}")]
    UnexpectedShape(&'static str),
}

/// The named form, as written by [`save()`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub version: u32,
    pub left: ChannelControls,
    pub right: ChannelControls,
}

impl From<&StereoControls> for SavedState {
    fn from(controls: &StereoControls) -> Self {
        Self {
            version: STATE_VERSION,
            left: controls.left,
            right: controls.right,
        }
    }
}

/// What a [`restore()`] actually did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Number of values taken from the document.
    pub restored: usize,
    /// Entries that were present but unusable, by field or slot.
    pub skipped: Vec<String>,
}

fn field_mut<'a>(controls: &'a mut ChannelControls, name: &str) -> Option<&'a mut f32> {
    match name {
        "delay_ms" => Some(&mut controls.delay_ms),
        "feedback_percent" => Some(&mut controls.feedback_percent),
        "dry_wet_percent" => Some(&mut controls.dry_wet_percent),
        "low_cut_hz" => Some(&mut controls.low_cut_hz),
        "high_cut_hz" => Some(&mut controls.high_cut_hz),
        _ => None,
    }
}

fn field(controls: &ChannelControls, name: &str) -> f32 {
    match name {
        "delay_ms" => controls.delay_ms,
        "feedback_percent" => controls.feedback_percent,
        "dry_wet_percent" => controls.dry_wet_percent,
        "low_cut_hz" => controls.low_cut_hz,
        "high_cut_hz" => controls.high_cut_hz,
        _ => unreachable!("unknown control field {name}"),
    }
}

fn channel_key(channel: Channel) -> &'static str {
    match channel {
        Channel::Left => "left",
        Channel::Right => "right",
    }
}

/// Serialize the controls in the named form.
pub fn save(controls: &StereoControls) -> Result<String, StateError> {
    Ok(serde_json::to_string(&SavedState::from(controls))?)
}

/// The ten values in [`POSITIONAL_LAYOUT`] order.
pub fn to_positional(controls: &StereoControls) -> [f32; 10] {
    POSITIONAL_LAYOUT.map(|(channel, name)| field(controls.channel(channel), name))
}

/// Serialize the controls in the legacy positional form.
pub fn save_positional(controls: &StereoControls) -> Result<String, StateError> {
    Ok(serde_json::to_string(&to_positional(controls))?)
}

/// Load either encoding into `controls`, in place.
///
/// Values that load are clamped into their declared ranges. Only a
/// document that isn't JSON, or is JSON of the wrong overall shape, is an
/// error; in that case `controls` is left untouched.
pub fn restore(controls: &mut StereoControls, text: &str) -> Result<RestoreReport, StateError> {
    let document: Value = serde_json::from_str(text)?;

    let report = match document {
        Value::Object(map) => {
            let mut report = RestoreReport::default();
            for channel in [Channel::Left, Channel::Right] {
                let key = channel_key(channel);
                match map.get(key) {
                    Some(Value::Object(fields)) => {
                        restore_channel(controls.channel_mut(channel), key, fields, &mut report)
                    }
                    Some(_) => report.skipped.push(key.to_owned()),
                    None => {}
                }
            }
            report
        }
        Value::Array(values) => restore_positional(controls, &values),
        Value::Null => return Err(StateError::UnexpectedShape("null")),
        Value::Bool(_) => return Err(StateError::UnexpectedShape("a boolean")),
        Value::Number(_) => return Err(StateError::UnexpectedShape("a number")),
        Value::String(_) => return Err(StateError::UnexpectedShape("a string")),
    };

    controls.left = controls.left.clamped();
    controls.right = controls.right.clamped();
    Ok(report)
}

fn restore_channel(
    controls: &mut ChannelControls,
    channel_key: &str,
    fields: &serde_json::Map<String, Value>,
    report: &mut RestoreReport,
) {
    for name in CHANNEL_FIELDS {
        let Some(value) = fields.get(name) else {
            continue;
        };
        match (value.as_f64(), field_mut(controls, name)) {
            (Some(number), Some(slot)) => {
                *slot = number as f32;
                report.restored += 1;
            }
            _ => report.skipped.push(format!("{channel_key}.{name}")),
        }
    }
}

fn restore_positional(controls: &mut StereoControls, values: &[Value]) -> RestoreReport {
    let mut report = RestoreReport::default();

    // Shorter lists leave the tail alone; extra entries are ignored.
    for (index, (value, (channel, name))) in values.iter().zip(POSITIONAL_LAYOUT).enumerate() {
        match (value.as_f64(), field_mut(controls.channel_mut(channel), name)) {
            (Some(number), Some(slot)) => {
                *slot = number as f32;
                report.restored += 1;
            }
            _ => report.skipped.push(format!("[{index}]")),
        }
    }

    report
}
