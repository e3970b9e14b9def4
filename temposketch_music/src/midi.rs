// MIDI output from compositions.
//
// Converts a Composition into a Standard MIDI File (SMF) for use in a DAW.
// Two tracks, one per layer:
// - "Chords" (channel 0): tempo + 4/4 time signature, then every chord tone
//   held for its bar at a fixed velocity
// - "Lead" (channel 1): the melody with per-note velocities
//
// Steps map to ticks as `round(step * TICKS_PER_BAR / steps_per_bar)`, taken
// from the absolute step each time, so step sizes that do not divide the bar
// evenly (e.g. 7 steps per bar) never accumulate drift.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1 (multi-track).

use crate::error::{Result, SketchError};
use crate::pipeline::Composition;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Ticks per 4/4 bar.
const TICKS_PER_BAR: u64 = TICKS_PER_QUARTER as u64 * 4;

/// Velocity chord tones are written with (0.0-1.0 scale).
const CHORD_VELOCITY: f64 = 0.7;

const CHORD_CHANNEL: u8 = 0;
const LEAD_CHANNEL: u8 = 1;

/// Convert a Composition to MIDI and write to a file.
pub fn write_midi(piece: &Composition, path: &Path) -> Result<()> {
    let buf = to_midi_bytes(piece)?;
    std::fs::write(path, &buf)?;
    tracing::info!(path = %path.display(), bytes = buf.len(), "wrote MIDI");
    Ok(())
}

/// Encode a Composition as SMF bytes.
pub fn to_midi_bytes(piece: &Composition) -> Result<Vec<u8>> {
    let smf = composition_to_smf(piece)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// A note to be written: absolute tick span plus key and velocity.
struct TimedNote {
    start: u32,
    end: u32,
    key: u7,
    vel: u7,
}

/// Convert a Composition to an in-memory SMF.
fn composition_to_smf(piece: &Composition) -> Result<Smf<'static>> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    let spb = piece.steps_per_bar;

    let mut chord_notes = Vec::new();
    for chord in &piece.chords {
        for &midi in &chord.notes {
            chord_notes.push(TimedNote {
                start: step_to_tick(chord.start_step, spb),
                end: step_to_tick(chord.start_step + chord.duration, spb),
                key: midi_key(midi)?,
                vel: velocity_to_u7(CHORD_VELOCITY),
            });
        }
    }

    let lead_notes = piece
        .melody
        .iter()
        .map(|note| {
            Ok(TimedNote {
                start: step_to_tick(note.start_step, spb),
                end: step_to_tick(note.start_step + note.duration, spb),
                key: midi_key(note.midi)?,
                vel: velocity_to_u7(note.velocity),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let tempo_microseconds = 60_000_000 / piece.tempo_bpm.max(1);
    let chord_header = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        },
        TrackEvent {
            delta: u28::new(0),
            // 4/4, 24 MIDI clocks per click, 8 32nds per quarter.
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        },
    ];

    smf.tracks
        .push(build_track(b"Chords", chord_header, CHORD_CHANNEL, chord_notes));
    smf.tracks
        .push(build_track(b"Lead", Vec::new(), LEAD_CHANNEL, lead_notes));
    Ok(smf)
}

/// Assemble one track: name, any header meta events, program 0 (piano), then
/// the notes as delta-timed on/off pairs.
fn build_track(
    name: &'static [u8],
    header: Vec<TrackEvent<'static>>,
    channel: u8,
    notes: Vec<TimedNote>,
) -> Track<'static> {
    let channel = u4::new(channel);
    let mut track: Track<'static> = vec![TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name)),
    }];
    track.extend(header);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange { program: u7::new(0) },
        },
    });

    // (tick, is_on, message). Offs sort before ons at the same tick so a
    // repeated pitch is released before it is struck again.
    let mut events: Vec<(u32, bool, MidiMessage)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        events.push((note.start, true, MidiMessage::NoteOn { key: note.key, vel: note.vel }));
        events.push((note.end, false, MidiMessage::NoteOff { key: note.key, vel: u7::new(0) }));
    }
    events.sort_by_key(|&(tick, is_on, _)| (tick, is_on));

    let mut last_tick = 0;
    for (tick, _, message) in events {
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// Absolute tick of a step, rounded to the nearest tick.
fn step_to_tick(step: usize, steps_per_bar: usize) -> u32 {
    let spb = steps_per_bar.max(1) as u64;
    ((step as u64 * TICKS_PER_BAR + spb / 2) / spb) as u32
}

fn midi_key(midi: i32) -> Result<u7> {
    u8::try_from(midi)
        .ok()
        .filter(|&key| key <= 127)
        .map(u7::new)
        .ok_or(SketchError::MidiRange(midi))
}

/// Map a 0.0-1.0 velocity to 1..=127 (0 would read as a note-off).
fn velocity_to_u7(velocity: f64) -> u7 {
    let scaled = (velocity * 127.0).round().clamp(1.0, 127.0);
    u7::new(scaled as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Chord, Note};
    use crate::mode::Mode;
    use crate::scale::Scale;

    fn piece(steps_per_bar: usize, melody: Vec<Note>) -> Composition {
        Composition {
            scale: Scale::build("C", Mode::Ionian, 4).unwrap(),
            chords: vec![Chord {
                notes: [60, 64, 67],
                start_step: 0,
                duration: steps_per_bar,
            }],
            melody,
            total_steps: steps_per_bar,
            bars: 1,
            steps_per_bar,
            tempo_bpm: 120,
        }
    }

    fn note(midi: i32, start_step: usize, duration: usize) -> Note {
        Note {
            midi,
            start_step,
            duration,
            velocity: 0.8,
        }
    }

    #[test]
    fn test_two_tracks() {
        let smf = composition_to_smf(&piece(4, vec![note(72, 0, 4)])).unwrap();
        assert_eq!(smf.tracks.len(), 2);
        assert!(matches!(smf.header.format, Format::Parallel));
        // Chords: name, tempo, time sig, program, 3 on + 3 off, end.
        assert_eq!(smf.tracks[0].len(), 11);
        // Lead: name, program, on, off, end.
        assert_eq!(smf.tracks[1].len(), 5);
    }

    #[test]
    fn test_step_to_tick() {
        assert_eq!(step_to_tick(0, 8), 0);
        assert_eq!(step_to_tick(8, 8), 1920);
        assert_eq!(step_to_tick(3, 8), 720);
        // 7 steps per bar: rounded per step, exact at the bar line.
        assert_eq!(step_to_tick(1, 7), 274);
        assert_eq!(step_to_tick(7, 7), 1920);
        assert_eq!(step_to_tick(14, 7), 3840);
    }

    #[test]
    fn test_repeated_pitch_releases_before_restrike() {
        let smf = composition_to_smf(&piece(4, vec![note(72, 0, 2), note(72, 2, 2)])).unwrap();
        let kinds: Vec<&TrackEventKind> = smf.tracks[1].iter().map(|e| &e.kind).collect();
        // name, program, on@0, off@960, on@960, off@1920, end
        assert!(matches!(
            kinds[3],
            TrackEventKind::Midi { message: MidiMessage::NoteOff { .. }, .. }
        ));
        assert!(matches!(
            kinds[4],
            TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. }
        ));
        assert_eq!(smf.tracks[1][3].delta.as_int(), 960);
        assert_eq!(smf.tracks[1][4].delta.as_int(), 0);
    }

    #[test]
    fn test_out_of_range_note_rejected() {
        let err = composition_to_smf(&piece(4, vec![note(128, 0, 4)])).unwrap_err();
        assert!(matches!(err, SketchError::MidiRange(128)));
        let err = composition_to_smf(&piece(4, vec![note(-1, 0, 4)])).unwrap_err();
        assert!(matches!(err, SketchError::MidiRange(-1)));
    }

    #[test]
    fn test_velocity_mapping() {
        assert_eq!(velocity_to_u7(0.7).as_int(), 89);
        assert_eq!(velocity_to_u7(1.0).as_int(), 127);
        assert_eq!(velocity_to_u7(0.0).as_int(), 1);
    }

    #[test]
    fn test_bytes_parse_back() {
        let bytes = to_midi_bytes(&piece(8, vec![note(72, 0, 4), note(74, 4, 4)])).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 2);
    }
}
