// Diatonic mode support and tonic spelling.
//
// TempoSketch offers four of the seven diatonic modes. Each mode is a fixed
// 7-entry semitone pattern from the tonic; the degree and triad math in
// scale.rs assumes exactly seven degrees, so the set is a closed enum rather
// than a lookup table keyed by name.
//
// This module provides:
// - Mode definitions with their interval patterns
// - Name parsing (case-insensitive, with "major"/"minor" aliases)
// - The reharmonization flip (Ionian <-> Aeolian)
// - Tonic spelling to pitch class, including enharmonic aliases
//
// Used by scale.rs to build scales and by config.rs / main.rs for parsing.

use crate::error::{Result, SketchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The supported diatonic modes, each defined by its interval pattern from the tonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// C Ionian: C D E F G A B  (the major scale)
    Ionian,
    /// A Aeolian: A B C D E F G  (natural minor)
    Aeolian,
    /// D Dorian: D E F G A B C  (natural minor with raised 6th)
    Dorian,
    /// F Lydian: F G A B C D E  (major with raised 4th)
    Lydian,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Ionian, Mode::Aeolian, Mode::Dorian, Mode::Lydian];

    /// Semitone intervals from the tonic to each scale degree.
    /// Returns 7 intervals representing degrees 0-6, strictly ascending.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Ionian => [0, 2, 4, 5, 7, 9, 11],
            Mode::Aeolian => [0, 2, 3, 5, 7, 8, 10],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "Ionian",
            Mode::Aeolian => "Aeolian",
            Mode::Dorian => "Dorian",
            Mode::Lydian => "Lydian",
        }
    }

    /// The mode used when reharmonization is on: major and natural minor swap,
    /// Dorian and Lydian have no counterpart here and stay as they are.
    pub fn reharmonized(self) -> Mode {
        match self {
            Mode::Ionian => Mode::Aeolian,
            Mode::Aeolian => Mode::Ionian,
            other => other,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Mode> {
        match s.to_ascii_lowercase().as_str() {
            "ionian" | "major" => Ok(Mode::Ionian),
            "aeolian" | "minor" => Ok(Mode::Aeolian),
            "dorian" => Ok(Mode::Dorian),
            "lydian" => Ok(Mode::Lydian),
            _ => Err(SketchError::UnknownMode(s.to_string())),
        }
    }
}

/// Recognized tonic spellings and their pitch class (0 = C).
const TONIC_SPELLINGS: [(&str, u8); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// Pitch class of a tonic name. Spellings are case-sensitive ("Bb", not "BB").
pub fn tonic_semitone(name: &str) -> Result<u8> {
    TONIC_SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == name)
        .map(|&(_, pc)| pc)
        .ok_or_else(|| SketchError::InvalidTonic(name.to_string()))
}

/// The twelve keys offered to users, one spelling per pitch class.
pub const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_ascend_within_octave() {
        for mode in Mode::ALL {
            let iv = mode.intervals();
            assert_eq!(iv[0], 0);
            assert!(iv.windows(2).all(|w| w[0] < w[1]), "{mode}");
            assert!(iv[6] < 12);
        }
    }

    #[test]
    fn test_enharmonic_aliases() {
        assert_eq!(tonic_semitone("C#").unwrap(), 1);
        assert_eq!(tonic_semitone("Db").unwrap(), 1);
        assert_eq!(tonic_semitone("A#").unwrap(), tonic_semitone("Bb").unwrap());
        assert_eq!(tonic_semitone("B").unwrap(), 11);
    }

    #[test]
    fn test_invalid_tonic() {
        for bad in ["H", "", "c", "Cb", "E#"] {
            assert!(
                matches!(tonic_semitone(bad), Err(SketchError::InvalidTonic(ref n)) if n == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_key_names_cover_all_pitch_classes() {
        let pcs: Vec<u8> = KEY_NAMES.iter().map(|k| tonic_semitone(k).unwrap()).collect();
        assert_eq!(pcs, (0..12).collect::<Vec<u8>>());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Ionian".parse::<Mode>().unwrap(), Mode::Ionian);
        assert_eq!("minor".parse::<Mode>().unwrap(), Mode::Aeolian);
        assert_eq!("LYDIAN".parse::<Mode>().unwrap(), Mode::Lydian);
        assert!("phrygian".parse::<Mode>().is_err());
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_reharmonized() {
        assert_eq!(Mode::Ionian.reharmonized(), Mode::Aeolian);
        assert_eq!(Mode::Aeolian.reharmonized(), Mode::Ionian);
        assert_eq!(Mode::Dorian.reharmonized(), Mode::Dorian);
        assert_eq!(Mode::Lydian.reharmonized(), Mode::Lydian);
    }
}
