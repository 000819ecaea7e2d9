//! Pitch, rate and volume sliders

use crate::speech::{ValueRange, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE};
use crate::{Result, SpeakpadError};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Slider step shared by all three parameters
pub const STEP: f32 = 0.1;

/// Which playback parameter a slider edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Pitch,
    Rate,
    Volume,
}

impl ParamKind {
    pub const ALL: [ParamKind; 3] = [ParamKind::Pitch, ParamKind::Rate, ParamKind::Volume];

    pub fn range(self) -> ValueRange {
        match self {
            ParamKind::Pitch => PITCH_RANGE,
            ParamKind::Rate => RATE_RANGE,
            ParamKind::Volume => VOLUME_RANGE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamKind::Pitch => "Pitch",
            ParamKind::Rate => "Rate",
            ParamKind::Volume => "Volume",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ParamKind {
    type Err = SpeakpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pitch" => Ok(ParamKind::Pitch),
            "rate" => Ok(ParamKind::Rate),
            "volume" => Ok(ParamKind::Volume),
            other => Err(SpeakpadError::InvalidCommand(format!(
                "unknown parameter '{}'",
                other
            ))),
        }
    }
}

/// Clamp to the range and snap to the step grid
fn snap(kind: ParamKind, value: f32) -> f32 {
    let range = kind.range();
    let steps = ((range.clamp(value) - range.min) / STEP).round();
    let snapped = range.min + steps * STEP;
    // Strip float noise so 1.7 stays 1.7
    range.clamp((snapped * 10.0).round() / 10.0)
}

/// Pitch/rate/volume as edited by the sliders
///
/// Values only take effect on the next playback start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParameters {
    pitch: f32,
    rate: f32,
    volume: f32,
}

impl Default for PlaybackParameters {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

impl PlaybackParameters {
    pub fn get(&self, kind: ParamKind) -> f32 {
        match kind {
            ParamKind::Pitch => self.pitch,
            ParamKind::Rate => self.rate,
            ParamKind::Volume => self.volume,
        }
    }

    /// Set a value, returning what was stored after clamping and snapping
    pub fn set(&mut self, kind: ParamKind, value: f32) -> f32 {
        let value = if value.is_finite() {
            snap(kind, value)
        } else {
            kind.range().normal
        };
        match kind {
            ParamKind::Pitch => self.pitch = value,
            ParamKind::Rate => self.rate = value,
            ParamKind::Volume => self.volume = value,
        }
        debug!("{} set to {:.1}", kind, value);
        value
    }

    /// Move a slider by whole steps
    pub fn nudge(&mut self, kind: ParamKind, steps: i32) -> f32 {
        let target = self.get(kind) + steps as f32 * STEP;
        self.set(kind, target)
    }

    /// Value as displayed next to the slider, one decimal place
    pub fn display(&self, kind: ParamKind) -> String {
        format!("{:.1}", self.get(kind))
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_neutral() {
        let params = PlaybackParameters::default();
        for kind in ParamKind::ALL {
            assert_eq!(params.get(kind), 1.0);
            assert_eq!(params.display(kind), "1.0");
        }
    }

    #[test]
    fn test_set_snaps_to_step() {
        let mut params = PlaybackParameters::default();
        assert_eq!(params.set(ParamKind::Pitch, 1.7), 1.7);
        assert_eq!(params.set(ParamKind::Pitch, 1.74), 1.7);
        assert_eq!(params.set(ParamKind::Rate, 0.66), 0.7);
        assert_eq!(params.display(ParamKind::Rate), "0.7");
    }

    #[test]
    fn test_set_clamps() {
        let mut params = PlaybackParameters::default();
        assert_eq!(params.set(ParamKind::Pitch, 5.0), 2.0);
        assert_eq!(params.set(ParamKind::Rate, 0.1), 0.5);
        assert_eq!(params.set(ParamKind::Volume, -3.0), 0.0);
        assert_eq!(params.set(ParamKind::Volume, 1.2), 1.0);
    }

    #[test]
    fn test_non_finite_resets() {
        let mut params = PlaybackParameters::default();
        params.set(ParamKind::Rate, 1.5);
        assert_eq!(params.set(ParamKind::Rate, f32::NAN), 1.0);
    }

    #[test]
    fn test_nudge() {
        let mut params = PlaybackParameters::default();
        assert_eq!(params.nudge(ParamKind::Volume, -1), 0.9);
        assert_eq!(params.nudge(ParamKind::Volume, 5), 1.0);
        assert_eq!(params.nudge(ParamKind::Pitch, 3), 1.3);
        assert_eq!(params.nudge(ParamKind::Pitch, -20), 0.5);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Pitch".parse::<ParamKind>().unwrap(), ParamKind::Pitch);
        assert!("speed".parse::<ParamKind>().is_err());
    }
}
