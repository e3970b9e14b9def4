// Seven-note diatonic scales anchored at a base octave.
//
// A `Scale` is built once per (tonic, mode, octave) and never mutated. Degree
// lookups wrap modulo 7 so callers can stack thirds (degree + 2, degree + 4)
// without range checks; the wrapped degree stays in the base octave, which
// means triads on upper degrees are not pitch-ascending (vi in C major is
// A4 C4 E4). That folding keeps every chord tone within one octave of the
// melody's register.
//
// MIDI numbers use the octave -1 = MIDI 0 convention (C4 = 60).

use crate::error::Result;
use crate::mode::{Mode, tonic_semitone};
use serde::{Deserialize, Serialize};

/// Octave used by the generator unless configured otherwise (C4 = 60).
pub const DEFAULT_BASE_OCTAVE: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    /// Tonic as spelled by the caller (e.g. "Eb").
    pub tonic: String,
    pub mode: Mode,
    /// MIDI numbers for degrees 0-6, strictly ascending within one octave.
    pub notes: [i32; 7],
}

impl Scale {
    /// Build the scale for `tonic` in `mode` with degree 0 in `base_octave`.
    ///
    /// Fails with `InvalidTonic` if the tonic spelling is not recognized.
    pub fn build(tonic: &str, mode: Mode, base_octave: i32) -> Result<Scale> {
        let tonic_pc = tonic_semitone(tonic)?;
        let base_midi = 12 * (base_octave + 1) + tonic_pc as i32;
        let notes = mode.intervals().map(|iv| base_midi + iv as i32);
        Ok(Scale {
            tonic: tonic.to_string(),
            mode,
            notes,
        })
    }

    /// MIDI number of `degree` in the base octave. Degrees wrap modulo 7,
    /// negative degrees included (-1 is the leading tone, degree 6).
    pub fn degree_to_midi(&self, degree: i32) -> i32 {
        self.degree_to_midi_in_octave(degree, 0)
    }

    /// MIDI number of `degree` shifted by `octave_offset` octaves.
    pub fn degree_to_midi_in_octave(&self, degree: i32, octave_offset: i32) -> i32 {
        let normalized = degree.rem_euclid(7) as usize;
        self.notes[normalized] + 12 * octave_offset
    }

    /// Root, third and fifth stacked diatonically on `degree`, each wrapped
    /// independently into the base octave.
    pub fn triad_for_degree(&self, degree: i32) -> [i32; 3] {
        [
            self.degree_to_midi(degree),
            self.degree_to_midi(degree + 2),
            self.degree_to_midi(degree + 4),
        ]
    }
}
