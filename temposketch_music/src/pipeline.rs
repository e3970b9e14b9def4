// End-to-end composition: stroke + config -> scale, chords, melody.
//
// Stages, in order:
// 1. validate the config
// 2. quantize the stroke to one pixel height per step (curve.rs)
// 3. normalize heights to 0 = bottom, 1 = top
// 4. build the scale in the effective mode (reharm applied)
// 5. choose one chord per bar, then walk the melody (composition.rs)
//
// A `Composition` is recomputed from scratch for every parameter change and
// never mutated afterwards. Playback scheduling and MIDI export consume it
// read-only.

use crate::composition::{Chord, Note, choose_chords, melody_from_samples};
use crate::config::SketchConfig;
use crate::curve::{Point, normalize_samples, quantize_polyline};
use crate::error::Result;
use crate::scale::Scale;
use serde::{Deserialize, Serialize};

/// Everything the playback and export collaborators need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub scale: Scale,
    pub chords: Vec<Chord>,
    pub melody: Vec<Note>,
    pub total_steps: usize,
    pub bars: usize,
    pub steps_per_bar: usize,
    pub tempo_bpm: u32,
}

/// Run the whole generator over a drawn stroke.
pub fn compose(points: &[Point], config: &SketchConfig) -> Result<Composition> {
    config.validate()?;
    let total_steps = config.total_steps();

    if points.is_empty() {
        tracing::warn!("empty stroke, composing a flat line at mid-height");
    }
    let heights = quantize_polyline(points, total_steps, config.canvas_width, config.canvas_height);
    let samples01 = normalize_samples(&heights, config.canvas_height);

    let mode = config.effective_mode();
    let scale = Scale::build(&config.key, mode, config.base_octave)?;
    tracing::debug!(key = %config.key, %mode, notes = ?scale.notes, "built scale");

    let chords = choose_chords(&samples01, config.bars, config.steps_per_bar, &scale);
    let melody = melody_from_samples(
        &samples01,
        &chords,
        config.steps_per_bar,
        &scale,
        config.seed,
    );
    tracing::debug!(
        points = points.len(),
        total_steps,
        chords = chords.len(),
        notes = melody.len(),
        "composed"
    );

    Ok(Composition {
        scale,
        chords,
        melody,
        total_steps,
        bars: config.bars,
        steps_per_bar: config.steps_per_bar,
        tempo_bpm: config.tempo_bpm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::DemoCurve;
    use crate::error::SketchError;
    use crate::mode::Mode;

    #[test]
    fn test_invariants_hold_for_demo_curves() {
        let config = SketchConfig::default();
        for curve in DemoCurve::ALL {
            let points = curve.points(config.canvas_width, config.canvas_height);
            let piece = compose(&points, &config).unwrap();
            assert_eq!(piece.total_steps, 32);
            assert_eq!(piece.chords.len(), 4);
            for (bar, chord) in piece.chords.iter().enumerate() {
                assert_eq!(chord.start_step, bar * 8);
                assert_eq!(chord.duration, 8);
            }
            let total: usize = piece.melody.iter().map(|n| n.duration).sum();
            assert_eq!(total, 32, "{curve:?}");
        }
    }

    #[test]
    fn test_empty_stroke_is_flat_mid_height() {
        let config = SketchConfig {
            bars: 1,
            ..Default::default()
        };
        let piece = compose(&[], &config).unwrap();
        // Mid-height is degree 3 (F in C major).
        assert_eq!(piece.chords[0].notes, [65, 69, 60]);
        assert_eq!(piece.melody.len(), 2);
    }

    #[test]
    fn test_top_of_canvas_is_high() {
        let config = SketchConfig {
            bars: 1,
            ..Default::default()
        };
        let top = compose(&[Point::new(0.0, 0.0), Point::new(720.0, 0.0)], &config).unwrap();
        let bottom = compose(&[Point::new(0.0, 280.0), Point::new(720.0, 280.0)], &config).unwrap();
        assert_eq!(top.chords[0].notes[0], 71);
        assert_eq!(bottom.chords[0].notes[0], 60);
    }

    #[test]
    fn test_reharm_flips_mode() {
        let config = SketchConfig {
            reharm: true,
            ..Default::default()
        };
        let piece = compose(&DemoCurve::Wave.points(720.0, 280.0), &config).unwrap();
        assert_eq!(piece.scale.mode, Mode::Aeolian);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SketchConfig {
            key: "H".to_string(),
            ..Default::default()
        };
        assert!(matches!(compose(&[], &config), Err(SketchError::InvalidTonic(_))));

        let config = SketchConfig {
            steps_per_bar: 0,
            ..Default::default()
        };
        assert!(matches!(compose(&[], &config), Err(SketchError::InvalidConfig { .. })));
    }

    #[test]
    fn test_deterministic() {
        let config = SketchConfig::default();
        let points = DemoCurve::Arc.points(720.0, 280.0);
        assert_eq!(compose(&points, &config).unwrap(), compose(&points, &config).unwrap());
    }
}
