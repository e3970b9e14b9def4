// TempoSketch — CLI entry point.
//
// Composes chords and a melody from a stroke and writes them to MIDI.
// The pipeline: load stroke → quantize → chords → melody → MIDI output.
//
// Usage:
//   cargo run -p temposketch_music -- [output.mid] [--points FILE | --demo NAME]
//     [--config FILE] [--key KEY] [--mode MODE] [--bars N] [--steps N]
//     [--tempo BPM] [--seed N] [--octave N] [--reharm] [--swing] [--humanize]
//     [--json FILE]
//
// Strokes: a JSON array of {"x": .., "y": .."} canvas points, or one of the
// demo curves (arc, wave, zigzag, flat). Default: the arc demo.
// Modes: ionian, aeolian, dorian, lydian (or major, minor)
// Logging: RUST_LOG=temposketch_music=debug for per-stage detail.

use std::path::Path;

use temposketch_music::config::SketchConfig;
use temposketch_music::curve::{DemoCurve, Point, load_points};
use temposketch_music::midi::write_midi;
use temposketch_music::mode::Mode;
use temposketch_music::pipeline::{Composition, compose};
use temposketch_music::playback::{PlaybackOptions, PlaybackSchedule, schedule_playback};
use temposketch_music::{Result, SketchError};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("temposketch.mid");

    let mut config = match flag_value(args, "--config")? {
        Some(path) => SketchConfig::load(Path::new(path))?,
        None => SketchConfig::default(),
    };
    apply_overrides(&mut config, args)?;

    let (points, source) = load_stroke(args, &config)?;

    println!("=== TempoSketch ===");
    println!("Output: {}", output_path);
    println!("Stroke: {} ({} points)", source, points.len());
    println!("Key: {} {}", config.key, config.effective_mode());
    println!(
        "Form: {} bars x {} steps = {} steps",
        config.bars,
        config.steps_per_bar,
        config.total_steps()
    );
    println!("Tempo: {} BPM", config.tempo_bpm);
    println!("Seed: {}", config.seed);
    println!();

    let piece = compose(&points, &config)?;
    print_summary(&piece);

    let options = PlaybackOptions {
        humanize: config.humanize,
        swing: config.swing,
        ..PlaybackOptions::for_composition(&piece, config.seed)
    };
    let schedule = schedule_playback(&piece.melody, &piece.chords, &options);

    write_midi(&piece, Path::new(output_path))?;
    println!(
        "Wrote {} ({:.1}s at {} BPM)",
        output_path, schedule.total_seconds, piece.tempo_bpm
    );

    if let Some(json_path) = flag_value(args, "--json")? {
        write_json(&piece, &schedule, Path::new(json_path))?;
        println!("Wrote {}", json_path);
    }
    Ok(())
}

/// Layer command-line flags over the loaded config.
fn apply_overrides(config: &mut SketchConfig, args: &[String]) -> Result<()> {
    if let Some(key) = flag_value(args, "--key")? {
        config.key = key.to_string();
    }
    if let Some(mode) = flag_value(args, "--mode")? {
        config.mode = mode.parse::<Mode>()?;
    }
    if let Some(bars) = parse_flag(args, "--bars")? {
        config.bars = bars;
    }
    if let Some(steps) = parse_flag(args, "--steps")? {
        config.steps_per_bar = steps;
    }
    if let Some(tempo) = parse_flag(args, "--tempo")? {
        config.tempo_bpm = tempo;
    }
    if let Some(seed) = parse_flag(args, "--seed")? {
        config.seed = seed;
    }
    if let Some(octave) = parse_flag(args, "--octave")? {
        config.base_octave = octave;
    }
    config.reharm |= has_flag(args, "--reharm");
    config.swing |= has_flag(args, "--swing");
    config.humanize |= has_flag(args, "--humanize");
    Ok(())
}

/// The stroke to compose from, plus a label for the summary.
fn load_stroke(args: &[String], config: &SketchConfig) -> Result<(Vec<Point>, String)> {
    if let Some(path) = flag_value(args, "--points")? {
        return Ok((load_points(Path::new(path))?, path.to_string()));
    }
    let name = flag_value(args, "--demo")?.unwrap_or("arc");
    let curve = DemoCurve::from_name(name).ok_or_else(|| SketchError::InvalidConfig {
        field: "demo",
        reason: format!("unknown demo curve '{name}' (arc, wave, zigzag, flat)"),
    })?;
    let points = curve.points(config.canvas_width, config.canvas_height);
    Ok((points, format!("demo {}", curve.name())))
}

fn print_summary(piece: &Composition) {
    println!("Scale: {:?}", piece.scale.notes);
    for (bar, chord) in piece.chords.iter().enumerate() {
        let notes: Vec<String> = piece
            .melody
            .iter()
            .filter(|n| n.start_step / piece.steps_per_bar == bar)
            .map(|n| format!("{}x{}", n.midi, n.duration))
            .collect();
        println!("  Bar {}: chord {:?} | {}", bar + 1, chord.notes, notes.join(" "));
    }
    println!("  {} melody notes over {} steps", piece.melody.len(), piece.total_steps);
}

fn write_json(piece: &Composition, schedule: &PlaybackSchedule, path: &Path) -> Result<()> {
    let doc = serde_json::json!({
        "composition": piece,
        "playback": schedule,
    });
    std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Value following `flag`. A flag given with no value (end of args, or
/// another `--flag` next) is an error rather than silently ignored.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    match args.get(i + 1) {
        Some(value) if !value.starts_with("--") => Ok(Some(value.as_str())),
        _ => Err(SketchError::InvalidConfig {
            field: flag_field(flag),
            reason: format!("{flag} needs a value"),
        }),
    }
}

/// Parse a flag's value. Unlike a missing flag, a malformed value is an error.
fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    match flag_value(args, flag)? {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| SketchError::InvalidConfig {
            field: flag_field(flag),
            reason: format!("cannot parse '{raw}'"),
        }),
    }
}

/// Config field (or input) a flag sets, for error messages.
fn flag_field(flag: &str) -> &'static str {
    match flag {
        "--bars" => "bars",
        "--steps" => "steps_per_bar",
        "--tempo" => "tempo_bpm",
        "--seed" => "seed",
        "--octave" => "base_octave",
        "--key" => "key",
        "--mode" => "mode",
        "--config" => "config",
        "--points" => "points",
        "--demo" => "demo",
        "--json" => "json",
        _ => "flag",
    }
}
