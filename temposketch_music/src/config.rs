// Generation parameters.
//
// Every knob the pipeline reads lives in `SketchConfig`, loadable from JSON
// with any subset of fields (missing fields take their defaults). The CLI
// layers flag overrides on top of a loaded or default config, then calls
// `validate()` before composing.
//
// Ranges mirror the drawing surface's controls: 1-8 bars, 2-16 steps per
// bar, 60-160 BPM. The generator itself is total over any positive bar and
// step count; the limits exist so MIDI export and playback stay sensible.
// Base octave stops at 7: the highest scale note is at most
// `12 * (octave + 1) + 22`, which is 118 at octave 7 but 130 at octave 8.
//
// **Determinism.** Two configs that compare equal, applied to the same
// stroke, always compose the same piece.

use crate::error::{Result, SketchError};
use crate::mode::{Mode, tonic_semitone};
use crate::scale::DEFAULT_BASE_OCTAVE;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

pub const TEMPO_RANGE: RangeInclusive<u32> = 60..=160;
pub const BARS_RANGE: RangeInclusive<usize> = 1..=8;
pub const STEPS_PER_BAR_RANGE: RangeInclusive<usize> = 2..=16;
pub const BASE_OCTAVE_RANGE: RangeInclusive<i32> = 0..=7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Beats per minute, quarter note = one beat.
    pub tempo_bpm: u32,
    /// Tonic spelling, e.g. "C", "F#", "Bb".
    pub key: String,
    pub mode: Mode,
    pub bars: usize,
    pub steps_per_bar: usize,
    /// Octave of scale degree 0 (4 puts C at MIDI 60).
    pub base_octave: i32,
    /// Swap Ionian and Aeolian before building the scale.
    pub reharm: bool,
    /// Jitter lead timing and velocity during playback.
    pub humanize: bool,
    /// Delay off-beat lead notes during playback.
    pub swing: bool,
    pub seed: u32,
    /// Drawing surface size in pixels.
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for SketchConfig {
    fn default() -> Self {
        SketchConfig {
            tempo_bpm: 120,
            key: "C".to_string(),
            mode: Mode::Ionian,
            bars: 4,
            steps_per_bar: 8,
            base_octave: DEFAULT_BASE_OCTAVE,
            reharm: false,
            humanize: false,
            swing: false,
            seed: 42,
            canvas_width: 720.0,
            canvas_height: 280.0,
        }
    }
}

impl SketchConfig {
    /// Parse a config from JSON. Does not validate.
    pub fn from_json(json: &str) -> Result<SketchConfig> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file. Does not validate.
    pub fn load(path: &Path) -> Result<SketchConfig> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn total_steps(&self) -> usize {
        self.bars * self.steps_per_bar
    }

    /// The mode the scale is actually built in, after reharmonization.
    pub fn effective_mode(&self) -> Mode {
        if self.reharm {
            self.mode.reharmonized()
        } else {
            self.mode
        }
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        check_range("tempo_bpm", self.tempo_bpm, &TEMPO_RANGE)?;
        check_range("bars", self.bars, &BARS_RANGE)?;
        check_range("steps_per_bar", self.steps_per_bar, &STEPS_PER_BAR_RANGE)?;
        check_range("base_octave", self.base_octave, &BASE_OCTAVE_RANGE)?;
        tonic_semitone(&self.key)?;
        for (field, value) in [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SketchError::InvalidConfig {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

fn check_range<T>(field: &'static str, value: T, range: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SketchError::InvalidConfig {
            field,
            reason: format!("{value} is outside {}..={}", range.start(), range.end()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SketchConfig::default();
        config.validate().unwrap();
        assert_eq!(config.total_steps(), 32);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SketchConfig::from_json(r#"{"key": "Eb", "mode": "Dorian", "bars": 2}"#).unwrap();
        assert_eq!(config.key, "Eb");
        assert_eq!(config.mode, Mode::Dorian);
        assert_eq!(config.bars, 2);
        assert_eq!(config.steps_per_bar, 8);
        assert_eq!(config.tempo_bpm, 120);
        config.validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SketchConfig {
            seed: 7,
            swing: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SketchConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SketchConfig::from_json(r#"{"mode": "Phrygian"}"#),
            Err(SketchError::Json(_))
        ));
    }

    #[test]
    fn test_out_of_range_fields() {
        let cases: [(&str, SketchConfig); 7] = [
            (
                "bars",
                SketchConfig {
                    bars: 0,
                    ..Default::default()
                },
            ),
            (
                "bars",
                SketchConfig {
                    bars: 9,
                    ..Default::default()
                },
            ),
            (
                "steps_per_bar",
                SketchConfig {
                    steps_per_bar: 1,
                    ..Default::default()
                },
            ),
            (
                "tempo_bpm",
                SketchConfig {
                    tempo_bpm: 200,
                    ..Default::default()
                },
            ),
            (
                "base_octave",
                SketchConfig {
                    base_octave: -1,
                    ..Default::default()
                },
            ),
            (
                "base_octave",
                SketchConfig {
                    base_octave: 8,
                    ..Default::default()
                },
            ),
            (
                "canvas_height",
                SketchConfig {
                    canvas_height: 0.0,
                    ..Default::default()
                },
            ),
        ];
        for (want, config) in cases {
            match config.validate() {
                Err(SketchError::InvalidConfig { field, .. }) => assert_eq!(field, want),
                other => panic!("expected InvalidConfig for {want}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_octave_eight_rejected_for_every_key() {
        // Octave 8 overflows MIDI for A, A#/Bb and B, so it is out for all keys.
        for key in ["C", "A", "Bb", "B"] {
            let config = SketchConfig {
                key: key.to_string(),
                base_octave: 8,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(SketchError::InvalidConfig {
                    field: "base_octave",
                    ..
                })
            ));
        }
        let top = SketchConfig {
            key: "B".to_string(),
            base_octave: 7,
            mode: Mode::Lydian,
            ..Default::default()
        };
        top.validate().unwrap();
    }

    #[test]
    fn test_invalid_key() {
        let config = SketchConfig {
            key: "H".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SketchError::InvalidTonic(_))));
    }

    #[test]
    fn test_effective_mode() {
        let mut config = SketchConfig::default();
        assert_eq!(config.effective_mode(), Mode::Ionian);
        config.reharm = true;
        assert_eq!(config.effective_mode(), Mode::Aeolian);
        config.mode = Mode::Lydian;
        assert_eq!(config.effective_mode(), Mode::Lydian);
    }
}
