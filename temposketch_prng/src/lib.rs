// Deterministic, portable pseudo-random number generator.
//
// Implements Mulberry32 (Tommy Ettinger's 32-bit mix-and-shift generator).
// The whole state is a single `u32`, which makes the generator trivially
// serializable and lets the stream be expressed as a pure function of the
// prior state (`next_float`). The output matches the widely used JavaScript
// `mulberry32` bit for bit, so a seed typed into the browser build and a seed
// passed to the CLI produce the same melody.
//
// This crate is the only source of randomness in TempoSketch. The melody
// generator and the playback humanizer each construct their own `SketchRng`
// from an explicit seed; nothing reads global entropy.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state, regardless of platform, compiler version,
// or optimization level. All mixing is wrapping 32-bit integer arithmetic; the
// only float operation is the final division by 2^32, which is exact.

use serde::{Deserialize, Serialize};

/// Increment added to the state on every step (the Weyl sequence constant).
const WEYL_INCREMENT: u32 = 0x6d2b_79f5;

/// 2^32 as an f64, the divisor that maps a `u32` into [0, 1).
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Advance a Mulberry32 state by one step.
///
/// Pure form of the generator: returns the uniform value in [0, 1) together
/// with the successor state. `SketchRng` is a thin handle over this.
pub fn next_float(state: u32) -> (f64, u32) {
    let (bits, next) = next_bits(state);
    (bits as f64 / TWO_POW_32, next)
}

fn next_bits(state: u32) -> (u32, u32) {
    let s = state.wrapping_add(WEYL_INCREMENT);
    let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
    t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
    (t ^ (t >> 14), s)
}

/// Mulberry32 generator handle.
///
/// Owns one 32-bit state value. Cloning forks the stream: both copies continue
/// with identical output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchRng {
    state: u32,
}

impl SketchRng {
    /// Create a generator seeded from a `u32`. Equal seeds give equal streams.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// The current internal state. Passing it to `SketchRng::new` resumes the
    /// stream exactly where this handle is.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Generate the next raw `u32`.
    pub fn next_u32(&mut self) -> u32 {
        let (bits, next) = next_bits(self.state);
        self.state = next;
        bits
    }

    /// Generate a uniform `f64` in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        let (value, next) = next_float(self.state);
        self.state = next;
        value
    }

    /// Generate a uniform random value in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        assert!(low < high, "range_f64: low must be less than high");
        low + self.next_f64() * (high - low)
    }

    /// Return `true` with probability `p`, `false` otherwise.
    ///
    /// Consumes exactly one value from the stream regardless of `p`.
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
