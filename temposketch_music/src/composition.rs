// Chord and melody generation from normalized curve samples.
//
// Input is one sample per step, 0.0 = bottom of the canvas and 1.0 = top
// (see curve.rs). Both generators map samples to scale degrees through the
// same fixed reference height, so a given drawing produces the same degrees
// no matter how large the canvas it was drawn on.
//
// - `choose_chords`: one diatonic triad per bar, rooted on the bar's median
//   degree (sorted index `len / 2`, so the later central degree on even bars).
// - `melody_from_samples`: a single left-to-right walk that snaps to the
//   nearest chord tone 80% of the time, otherwise plays the raw scale degree
//   as a passing tone, and merges runs of near-equal degrees into notes of up
//   to four steps.
//
// The melody draws exactly two values per note from one `SketchRng` (snap
// decision, then velocity), so identical inputs and seed give identical notes.

use crate::curve::y_to_degree_index;
use crate::scale::Scale;
use serde::{Deserialize, Serialize};
use temposketch_prng::SketchRng;

/// Canvas height the degree mapping is evaluated against. Only the ratio
/// sample/height matters, so this is fixed rather than taken from the canvas.
pub const REFERENCE_HEIGHT: f64 = 280.0;

/// Probability that a melody step snaps to the nearest chord tone.
pub const CHORD_TONE_PROBABILITY: f64 = 0.8;

/// Longest note the melody groups steps into.
pub const MAX_NOTE_STEPS: usize = 4;

/// Velocity range for melody notes: `[VELOCITY_MIN, VELOCITY_MIN + VELOCITY_SPAN)`.
pub const VELOCITY_MIN: f64 = 0.6;
pub const VELOCITY_SPAN: f64 = 0.3;

/// A triad held for one bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    /// Root, third, fifth as MIDI numbers (not necessarily ascending).
    pub notes: [i32; 3],
    pub start_step: usize,
    /// Always equal to the steps-per-bar it was generated with.
    pub duration: usize,
}

/// A single melody note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub midi: i32,
    pub start_step: usize,
    /// Length in steps, 1..=MAX_NOTE_STEPS.
    pub duration: usize,
    /// 0.6 <= velocity < 0.9.
    pub velocity: f64,
}

/// Scale degree (0-6) of a normalized sample.
pub fn sample_degree(sample01: f64) -> usize {
    y_to_degree_index((1.0 - sample01) * REFERENCE_HEIGHT, REFERENCE_HEIGHT)
}

/// Choose one triad per bar from the median scale degree of the bar's samples.
///
/// Bar `b` covers samples `[b * steps_per_bar, (b + 1) * steps_per_bar)`. A bar
/// with no samples (input shorter than `bars * steps_per_bar`) uses the
/// mid-height degree, matching the quantizer's empty-stroke fallback.
pub fn choose_chords(
    samples01: &[f64],
    bars: usize,
    steps_per_bar: usize,
    scale: &Scale,
) -> Vec<Chord> {
    (0..bars)
        .map(|bar| {
            let start_step = bar * steps_per_bar;
            let end_step = (start_step + steps_per_bar).min(samples01.len());
            let bar_samples = samples01.get(start_step..end_step).unwrap_or(&[]);

            let degree = median_degree(bar_samples).unwrap_or_else(|| {
                tracing::warn!(bar, "no samples for bar, using mid-height degree");
                sample_degree(0.5)
            });

            Chord {
                notes: scale.triad_for_degree(degree as i32),
                start_step,
                duration: steps_per_bar,
            }
        })
        .collect()
}

/// Generate the melody over every sample, one note per run of similar degrees.
///
/// Notes are contiguous: each starts where the previous one ended and the
/// durations sum to `samples01.len()`. Notes never cross a bar line.
///
/// Panics if `steps_per_bar` is zero.
pub fn melody_from_samples(
    samples01: &[f64],
    chords: &[Chord],
    steps_per_bar: usize,
    scale: &Scale,
    seed: u32,
) -> Vec<Note> {
    assert!(
        steps_per_bar > 0,
        "melody_from_samples: steps_per_bar must be positive"
    );
    let mut rng = SketchRng::new(seed);
    let mut melody = Vec::new();

    let mut i = 0;
    while i < samples01.len() {
        let target_degree = sample_degree(samples01[i]);
        let target_midi = scale.degree_to_midi(target_degree as i32);
        let bar = i / steps_per_bar;

        // Always draw, even without a chord, so the stream stays aligned.
        let snap = rng.random_bool(CHORD_TONE_PROBABILITY);
        let midi = match chords.get(bar) {
            Some(chord) if snap => nearest_chord_tone(chord, target_midi),
            _ => target_midi,
        };

        let duration = run_length(samples01, i, target_degree, steps_per_bar);
        let velocity = VELOCITY_MIN + rng.next_f64() * VELOCITY_SPAN;

        melody.push(Note {
            midi,
            start_step: i,
            duration,
            velocity,
        });
        i += duration;
    }

    tracing::debug!(
        steps = samples01.len(),
        notes = melody.len(),
        seed,
        "generated melody"
    );
    melody
}

/// Degree at sorted index `len / 2`. For even lengths that is the second of the
/// two central degrees in ascending order. `None` for an empty bar.
fn median_degree(bar_samples: &[f64]) -> Option<usize> {
    let mut degrees: Vec<usize> = bar_samples.iter().map(|&s| sample_degree(s)).collect();
    degrees.sort_unstable();
    degrees.get(degrees.len() / 2).copied()
}

/// Chord tone closest to `target_midi`; ties go to the earlier chord tone.
fn nearest_chord_tone(chord: &Chord, target_midi: i32) -> i32 {
    chord
        .notes
        .iter()
        .copied()
        .min_by_key(|&n| (n - target_midi).abs())
        .unwrap_or(target_midi)
}

/// How many steps the note starting at `start` lasts.
///
/// Extends while the next step is in the same bar and its degree equals the
/// target, or differs by one while the note is still a single step (so a
/// one-degree wobble is absorbed at most once). Capped at `MAX_NOTE_STEPS`.
fn run_length(
    samples01: &[f64],
    start: usize,
    target_degree: usize,
    steps_per_bar: usize,
) -> usize {
    let bar = start / steps_per_bar;
    let mut duration = 1;
    while duration < MAX_NOTE_STEPS
        && start + duration < samples01.len()
        && (start + duration) / steps_per_bar == bar
    {
        let next_degree = sample_degree(samples01[start + duration]);
        match next_degree.abs_diff(target_degree) {
            0 => duration += 1,
            1 if duration < 2 => duration += 1,
            _ => break,
        }
    }
    duration
}
