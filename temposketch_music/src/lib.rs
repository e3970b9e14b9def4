// TempoSketch Music Generator
//
// Turns a hand-drawn stroke into a chord progression and a melody. The stroke
// is resampled onto a step grid, heights become scale degrees, each bar gets
// a triad from its median degree, and a seeded walk over the steps picks
// chord tones or passing tones and groups repeated pitches into longer notes.
//
// Architecture:
// - util.rs: clamp / lerp helpers
// - curve.rs: Stroke points, polyline quantization, height -> degree buckets,
//   demo strokes
// - mode.rs: The four supported diatonic modes, tonic spellings, reharm flip
// - scale.rs: Seven-note scales, degree -> MIDI, diatonic triads
// - composition.rs: Per-bar chord choice and seeded melody generation
// - config.rs: JSON-loadable generation parameters with range validation
// - pipeline.rs: Stroke + config -> Composition, the single entry point
// - playback.rs: Step timing -> seconds, swing and humanize, for audio engines
// - midi.rs: Two-track Standard MIDI File export
// - error.rs: `SketchError` and the crate `Result` alias
//
// The generator is deterministic given a seed, supporting reproducible output.
// All randomness comes from `temposketch_prng::SketchRng`.

pub mod composition;
pub mod config;
pub mod curve;
pub mod error;
pub mod midi;
pub mod mode;
pub mod pipeline;
pub mod playback;
pub mod scale;
pub mod util;

pub use composition::{Chord, Note};
pub use config::SketchConfig;
pub use curve::Point;
pub use error::{Result, SketchError};
pub use mode::Mode;
pub use pipeline::{Composition, compose};
pub use scale::Scale;
