// Error type for the TempoSketch pipeline.
//
// The generative core is total except for tonic validation; everything else
// here comes from the edges (config files, stroke files, MIDI export).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("Invalid tonic: {0}")]
    InvalidTonic(String),
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
    #[error("Invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("MIDI note {0} is outside 0..=127")]
    MidiRange(i32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SketchError>;
