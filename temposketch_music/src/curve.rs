// Curve quantization: from a hand-drawn stroke to one height per step.
//
// The drawing surface hands over raw pointer samples in pixel space (y grows
// downward, points arrive in drawing order and may double back). This module
// resamples them onto an evenly spaced grid of `total_steps` x positions
// across the canvas and maps heights to one of seven scale-degree buckets.
//
// Conventions:
// - Pixel heights (`quantize_polyline` output) follow canvas coordinates:
//   0 = top edge, `height` = bottom edge.
// - Normalized samples (`normalize_samples` output, consumed by
//   composition.rs) are flipped: 0.0 = bottom, 1.0 = top.
//
// Degenerate strokes are not errors: an empty stroke is a flat line at
// mid-height and a single point is a flat line at that point's height.

use crate::error::Result;
use crate::util::{clamp, lerp};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of scale-degree buckets a height is quantized into.
pub const DEGREE_BUCKETS: usize = 7;

/// A raw stroke sample in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Resample a polyline to `total_steps` heights at evenly spaced x positions.
///
/// Step `i` samples at `x = i / (total_steps - 1) * width`, so the first step
/// sits on the left edge and the last on the right edge. Points are sorted by
/// x first (stable, so among equal x the earlier-drawn point brackets first).
/// Targets left of the first point or right of the last point take that
/// endpoint's height rather than extrapolating.
pub fn quantize_polyline(
    points: &[Point],
    total_steps: usize,
    width: f64,
    height: f64,
) -> Vec<f64> {
    match points {
        [] => return vec![height / 2.0; total_steps],
        [only] => return vec![only.y; total_steps],
        _ => {}
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    (0..total_steps)
        .map(|i| {
            let target_x = if total_steps > 1 {
                i as f64 / (total_steps - 1) as f64 * width
            } else {
                0.0
            };
            sample_at(&sorted, target_x)
        })
        .collect()
}

/// Height of a sorted polyline at `target_x`. Requires at least two points.
fn sample_at(sorted: &[Point], target_x: f64) -> f64 {
    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    if target_x <= first.x {
        return first.y;
    }
    if target_x >= last.x {
        return last.y;
    }

    let Some(pair) = sorted
        .windows(2)
        .find(|w| w[0].x <= target_x && target_x <= w[1].x)
    else {
        return last.y;
    };
    let (left, right) = (pair[0], pair[1]);
    if left.x == right.x {
        return left.y;
    }
    let t = (target_x - left.x) / (right.x - left.x);
    lerp(left.y, right.y, t)
}

/// Map a pixel height to a scale-degree index in `0..=6`.
///
/// Top of the canvas (y = 0) is degree 6, the bottom (y = height) degree 0.
/// Each bucket covers 1/7 of the height; values off the canvas clamp.
pub fn y_to_degree_index(y: f64, height: f64) -> usize {
    let normalized = 1.0 - y / height;
    let degree = (normalized * DEGREE_BUCKETS as f64).floor();
    clamp(degree, 0.0, (DEGREE_BUCKETS - 1) as f64) as usize
}

/// Convert pixel heights into normalized samples (0.0 = bottom, 1.0 = top).
///
/// Heights off the canvas clamp to the edges, which never changes the degree
/// bucket they land in.
pub fn normalize_samples(heights_px: &[f64], height: f64) -> Vec<f64> {
    heights_px
        .iter()
        .map(|&y| clamp(1.0 - y / height, 0.0, 1.0))
        .collect()
}

/// Parse a stroke from a JSON array of `{"x": .., "y": ..}` objects.
pub fn points_from_json(json: &str) -> Result<Vec<Point>> {
    Ok(serde_json::from_str(json)?)
}

/// Load a stroke from a JSON file (see `points_from_json`).
pub fn load_points(path: &Path) -> Result<Vec<Point>> {
    let contents = std::fs::read_to_string(path)?;
    points_from_json(&contents)
}

/// Built-in strokes for trying the generator without drawing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoCurve {
    /// An inverted parabola: starts and ends low on the page, peaks mid-way
    /// (in pixel terms, y is largest in the middle).
    Arc,
    /// Two full sine periods around mid-height.
    Wave,
    /// Square steps alternating between 30% and 70% of the height.
    Zigzag,
    /// A flat line at mid-height.
    Flat,
}

impl DemoCurve {
    pub const ALL: [DemoCurve; 4] = [
        DemoCurve::Arc,
        DemoCurve::Wave,
        DemoCurve::Zigzag,
        DemoCurve::Flat,
    ];

    /// Number of segments each demo stroke is drawn with (101 points).
    const SEGMENTS: usize = 100;

    pub fn name(self) -> &'static str {
        match self {
            DemoCurve::Arc => "arc",
            DemoCurve::Wave => "wave",
            DemoCurve::Zigzag => "zigzag",
            DemoCurve::Flat => "flat",
        }
    }

    pub fn from_name(name: &str) -> Option<DemoCurve> {
        DemoCurve::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Fraction of the canvas height, measured from the top edge, at `t`.
    fn fraction_at(self, t: f64) -> f64 {
        match self {
            DemoCurve::Arc => 0.15 + 0.7 * (1.0 - (2.0 * t - 1.0).powi(2)),
            DemoCurve::Wave => 0.5 + 0.35 * (2.0 * std::f64::consts::PI * (t * 2.0)).sin(),
            DemoCurve::Zigzag => {
                if t < 0.25 || (0.5..0.75).contains(&t) {
                    0.3
                } else {
                    0.7
                }
            }
            DemoCurve::Flat => 0.5,
        }
    }

    /// Render the stroke as canvas-space points spanning the full width.
    pub fn points(self, width: f64, height: f64) -> Vec<Point> {
        (0..=Self::SEGMENTS)
            .map(|i| {
                let t = i as f64 / Self::SEGMENTS as f64;
                Point::new(t * width, self.fraction_at(t) * height)
            })
            .collect()
    }
}
