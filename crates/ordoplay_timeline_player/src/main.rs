// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Timeline Player - headless scene playback
//!
//! Loads a scene file, plays its timeline at a fixed tick and prints the
//! state of every entity at the requested sample times and at the end.
//!
//! ```text
//! ordoplay_timeline scene.ron --sample 1 --sample 2.5 --duration 5 --json
//! ```

use clap::Parser;
use ordoplay_timeline::{
    EndBehavior, EngineMode, EntitySnapshot, PlaybackDriver, Scene, TimelineEngine,
    TimelineSettings, SETTINGS_FILE_NAME,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play an OrdoPlay timeline scene headlessly", long_about = None)]
struct Cli {
    /// Scene file (RON)
    scene: PathBuf,

    /// Settings file (RON). Defaults to `timeline.ron` next to the scene.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Seconds to play. Defaults to the end of the last command.
    #[arg(short, long)]
    duration: Option<f32>,

    /// Report entity state at this time (repeatable)
    #[arg(long = "sample", value_name = "SECONDS")]
    samples: Vec<f32>,

    /// Loop at the end of the timeline instead of the configured behavior
    #[arg(long = "loop")]
    looping: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

/// Entity state at one point of playback
#[derive(Debug, Serialize)]
struct Report {
    /// Wall time since playback started
    elapsed: f64,
    /// Timeline time
    time: f32,
    entities: Vec<EntitySnapshot>,
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("ordoplay_timeline=info".parse().unwrap())
        .add_directive("ordoplay_timeline_player=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Playback failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ordoplay_timeline::Result<()> {
    let mut scene = Scene::load(&cli.scene)?;
    tracing::info!(
        "Loaded scene '{}' with {} entities from {}",
        scene.name,
        scene.len(),
        cli.scene.display()
    );

    if let Err(e) = scene.validate() {
        tracing::warn!("{e}");
    }

    let mut settings = load_settings(cli)?;
    if cli.looping {
        settings.end_behavior = EndBehavior::Loop;
    }

    let duration = f64::from(
        cli.duration
            .filter(|d| d.is_finite())
            .unwrap_or_else(|| scene.content_duration())
            .max(0.0),
    );
    let tick = f64::from(settings.tick_seconds());

    let mut samples: Vec<f64> = cli
        .samples
        .iter()
        .copied()
        .filter(|t| t.is_finite())
        .map(f64::from)
        .collect();
    samples.sort_by(f64::total_cmp);

    let mut engine = TimelineEngine::new();
    engine.initialize_all(&scene);
    engine.set_mode(EngineMode::Playing);

    let mut driver = PlaybackDriver::new(settings);
    let reports = play(&mut driver, &mut engine, &mut scene, duration, tick, samples);
    print_reports(&reports, cli.json)
}

/// Play `scene` for `duration` wall seconds in steps of at most `tick`,
/// recording a report at each sample time. Returns the sample reports
/// followed by one for the point where playback stopped.
fn play(
    driver: &mut PlaybackDriver,
    engine: &mut TimelineEngine,
    scene: &mut Scene,
    duration: f64,
    tick: f64,
    samples: Vec<f64>,
) -> Vec<Report> {
    let mut seen = message_counts(scene);
    driver.seek(0.0, engine, scene);
    log_new_messages(scene, &mut seen, driver.time());
    driver.play();

    let mut reports = Vec::new();
    let mut pending = samples.into_iter().peekable();
    let mut elapsed = 0.0_f64;

    loop {
        while let Some(sample) = pending.next_if(|&t| t <= elapsed) {
            tracing::debug!(sample, time = driver.time(), "Sampling scene");
            reports.push(report(elapsed, driver, scene));
        }

        if !driver.is_playing() {
            break;
        }
        let Some(step) = next_step(elapsed, duration, tick, pending.peek().copied()) else {
            break;
        };

        // Only the step is narrowed; the running total stays in f64
        driver.update(step as f32, engine, scene);
        elapsed += step;
        log_new_messages(scene, &mut seen, driver.time());
    }

    for sample in pending {
        tracing::warn!("Sample at {sample}s is past the end of playback");
    }

    tracing::info!(
        elapsed,
        time = driver.time(),
        state = ?driver.state(),
        "Playback finished"
    );
    reports.push(report(elapsed, driver, scene));
    reports
}

/// Length of the next playback step, or `None` once `duration` is reached
/// or the step no longer moves `elapsed` forward.
fn next_step(elapsed: f64, duration: f64, tick: f64, next_sample: Option<f64>) -> Option<f64> {
    if elapsed >= duration {
        return None;
    }

    let mut step = tick.min(duration - elapsed);
    if let Some(next) = next_sample {
        if next > elapsed {
            step = step.min(next - elapsed);
        }
    }

    if elapsed + step > elapsed {
        Some(step)
    } else {
        tracing::warn!(elapsed, step, "Playback clock stopped advancing");
        None
    }
}

fn load_settings(cli: &Cli) -> ordoplay_timeline::Result<TimelineSettings> {
    if let Some(path) = &cli.settings {
        return TimelineSettings::load(path);
    }

    let sibling = cli
        .scene
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(SETTINGS_FILE_NAME);
    if sibling.is_file() {
        tracing::info!("Using settings from {}", sibling.display());
        TimelineSettings::load(&sibling)
    } else {
        Ok(TimelineSettings::default())
    }
}

fn report(elapsed: f64, driver: &PlaybackDriver, scene: &Scene) -> Report {
    Report {
        elapsed,
        time: driver.time(),
        entities: scene.snapshot(),
    }
}

fn message_counts(scene: &Scene) -> Vec<usize> {
    scene.entities().map(|e| e.messages.len()).collect()
}

fn log_new_messages(scene: &Scene, seen: &mut [usize], time: f32) {
    for (entity, count) in scene.entities().zip(seen.iter_mut()) {
        for message in &entity.messages[*count..] {
            tracing::info!(entity = %entity.name, time, "Message: {message}");
        }
        *count = entity.messages.len();
    }
}

fn print_reports(reports: &[Report], json: bool) -> ordoplay_timeline::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!("t = {:.3}s (elapsed {:.3}s)", report.time, report.elapsed);
        for entity in &report.entities {
            let [x, y, z] = entity.position;
            let [rx, ry, rz] = entity.rotation;
            print!(
                "  {}: position ({x:.3}, {y:.3}, {z:.3}) rotation ({rx:.1}, {ry:.1}, {rz:.1})",
                entity.name
            );
            if let Some([r, g, b, a]) = entity.color {
                print!(" color ({r:.2}, {g:.2}, {b:.2}, {a:.2})");
            }
            if !entity.messages.is_empty() {
                print!(" messages {:?}", entity.messages);
            }
            println!();
        }
    }
    Ok(())
}
