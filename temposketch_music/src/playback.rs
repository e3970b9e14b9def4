// Wall-clock scheduling for an audio engine.
//
// The generator speaks in steps; a synth speaks in seconds. This module turns
// a `Composition` into two lists of timed events (chord layer and lead
// layer) that a playback engine can hand straight to its voices. It does not
// produce sound.
//
// Timing assumes 4/4 with a quarter-note beat: one bar is four beats, split
// evenly into `steps_per_bar` steps.
//
// Swing delays lead notes that start on an odd step within the bar by 15% of
// a step. Humanize draws from its own `SketchRng` seeded at `seed + 1000`, so
// turning it on never changes which notes the melody generator picked.

use crate::composition::{Chord, Note};
use crate::pipeline::Composition;
use crate::util::clamp;
use serde::{Deserialize, Serialize};
use temposketch_prng::SketchRng;

/// Velocity every chord tone is played at.
pub const CHORD_VELOCITY: f64 = 0.5;

/// Fraction of a step that swung notes are pushed late.
pub const SWING_AMOUNT: f64 = 0.15;

/// Peak-to-peak timing jitter in seconds when humanizing (+/- 20 ms).
pub const HUMANIZE_TIME_SPREAD: f64 = 0.04;

/// Peak-to-peak velocity jitter when humanizing.
pub const HUMANIZE_VELOCITY_SPREAD: f64 = 0.1;

/// Offset between the melody seed and the humanizer's seed.
pub const HUMANIZE_SEED_OFFSET: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    pub tempo_bpm: u32,
    pub steps_per_bar: usize,
    pub bars: usize,
    pub humanize: bool,
    pub swing: bool,
    pub seed: u32,
}

impl PlaybackOptions {
    /// Options matching a composition, with humanize and swing off.
    pub fn for_composition(piece: &Composition, seed: u32) -> Self {
        PlaybackOptions {
            tempo_bpm: piece.tempo_bpm,
            steps_per_bar: piece.steps_per_bar,
            bars: piece.bars,
            humanize: false,
            swing: false,
            seed,
        }
    }
}

/// One sounding event. Chord events share a start time per chord tone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNote {
    pub midi: i32,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub velocity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSchedule {
    pub step_seconds: f64,
    pub chord_events: Vec<ScheduledNote>,
    pub lead_events: Vec<ScheduledNote>,
    /// When the transport should stop.
    pub total_seconds: f64,
}

/// Length of one step in seconds: `(60 / tempo / steps_per_bar) * 4`.
pub fn step_seconds(tempo_bpm: u32, steps_per_bar: usize) -> f64 {
    (60.0 / tempo_bpm as f64 / steps_per_bar as f64) * 4.0
}

/// Lay out chords and melody on the clock.
///
/// Panics if `steps_per_bar` or `tempo_bpm` is zero.
pub fn schedule_playback(
    melody: &[Note],
    chords: &[Chord],
    options: &PlaybackOptions,
) -> PlaybackSchedule {
    assert!(
        options.steps_per_bar > 0 && options.tempo_bpm > 0,
        "schedule_playback: steps_per_bar and tempo_bpm must be positive"
    );
    let step = step_seconds(options.tempo_bpm, options.steps_per_bar);

    let chord_events = chords
        .iter()
        .flat_map(|chord| {
            chord.notes.iter().map(move |&midi| ScheduledNote {
                midi,
                start_seconds: chord.start_step as f64 * step,
                duration_seconds: chord.duration as f64 * step,
                velocity: CHORD_VELOCITY,
            })
        })
        .collect();

    let mut humanizer = options
        .humanize
        .then(|| SketchRng::new(options.seed.wrapping_add(HUMANIZE_SEED_OFFSET)));

    let lead_events = melody
        .iter()
        .map(|note| {
            let mut start_seconds = note.start_step as f64 * step;
            let mut velocity = note.velocity;

            if options.swing && (note.start_step % options.steps_per_bar) % 2 == 1 {
                start_seconds += step * SWING_AMOUNT;
            }
            if let Some(rng) = humanizer.as_mut() {
                start_seconds += rng.range_f64(-0.5, 0.5) * HUMANIZE_TIME_SPREAD;
                velocity = clamp(
                    velocity + rng.range_f64(-0.5, 0.5) * HUMANIZE_VELOCITY_SPREAD,
                    0.4,
                    1.0,
                );
            }

            ScheduledNote {
                midi: note.midi,
                start_seconds: start_seconds.max(0.0),
                duration_seconds: note.duration as f64 * step,
                velocity,
            }
        })
        .collect();

    PlaybackSchedule {
        step_seconds: step,
        chord_events,
        lead_events,
        total_seconds: (options.bars * options.steps_per_bar) as f64 * step,
    }
}
