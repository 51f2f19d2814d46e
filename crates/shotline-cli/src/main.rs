//! Shotline CLI
//!
//! Headless driver for the timeline engine. Loads segments, a persisted
//! timeline and settings from disk, replays recorded host events and prints
//! the resulting timeline as JSON on stdout. Logs go to stderr.

mod script;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use shotline_core::core::settings::{SettingsManager, TimelineSettings};
use shotline_core::core::timeline::{validate_timeline, Segment, Timeline};
use shotline_core::TimelineEditor;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "shotline")]
#[command(about = "Shotline timeline engine - replay and inspect editor sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding timeline-settings.json
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the initial timeline seeded from segments
    Seed {
        /// JSON array of segments
        #[arg(short, long)]
        segments: PathBuf,
    },

    /// Replay a JSON-lines event script and print the final timeline
    Replay {
        /// JSON array of segments
        #[arg(short, long)]
        segments: PathBuf,

        /// Persisted timeline to restore
        #[arg(short, long)]
        timeline: Option<PathBuf>,

        /// JSON-lines script of host events
        #[arg(long)]
        script: Option<PathBuf>,

        /// Timeline key (defaults to "default")
        #[arg(long)]
        key: Option<String>,

        /// Print every change notification as a JSON line
        #[arg(long)]
        emit_changes: bool,

        /// Only run animation frames when the script asks for them
        #[arg(long)]
        manual_frames: bool,
    },

    /// Validate a timeline file; exits non-zero on violations
    Check {
        /// Timeline file to validate
        #[arg(short, long)]
        timeline: PathBuf,

        /// Also check clips against these segments
        #[arg(short, long)]
        segments: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Seed { segments } => {
            seed_command(cli.settings.as_deref(), &segments).map(|()| ExitCode::SUCCESS)
        }
        Commands::Replay {
            segments,
            timeline,
            script,
            key,
            emit_changes,
            manual_frames,
        } => replay_command(ReplayArgs {
            settings: cli.settings.as_deref(),
            segments: &segments,
            timeline: timeline.as_deref(),
            script: script.as_deref(),
            key: key.as_deref(),
            emit_changes,
            auto_frames: !manual_frames,
        })
        .map(|()| ExitCode::SUCCESS),
        Commands::Check { timeline, segments } => {
            check_command(cli.settings.as_deref(), &timeline, segments.as_deref()).map(|valid| {
                if valid {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            })
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Helpers
// =============================================================================

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {} in {}", what, path.display()))
}

fn load_settings(dir: Option<&Path>) -> TimelineSettings {
    match dir {
        Some(dir) => SettingsManager::new(dir).load(),
        None => TimelineSettings::default(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

fn seed_command(settings: Option<&Path>, segments: &Path) -> Result<()> {
    let segments: Vec<Segment> = read_json(segments, "segments")?;
    let mut editor = TimelineEditor::new(load_settings(settings));
    editor.load(None, segments, None);
    print_json(editor.timeline())
}

struct ReplayArgs<'a> {
    settings: Option<&'a Path>,
    segments: &'a Path,
    timeline: Option<&'a Path>,
    script: Option<&'a Path>,
    key: Option<&'a str>,
    emit_changes: bool,
    auto_frames: bool,
}

fn replay_command(args: ReplayArgs<'_>) -> Result<()> {
    let segments: Vec<Segment> = read_json(args.segments, "segments")?;
    let persisted: Option<Timeline> = args
        .timeline
        .map(|path| read_json(path, "timeline"))
        .transpose()?;
    let events = match args.script {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read script from {}", path.display()))?;
            script::parse_script(&content)?
        }
        None => Vec::new(),
    };

    let mut editor = TimelineEditor::new(load_settings(args.settings));
    if args.emit_changes {
        editor.subscribe(|change| match serde_json::to_string(change) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize change: {}", e),
        });
    }

    let (outcome, _) = editor.load(args.key, segments, persisted);
    if let Some(outcome) = outcome {
        info!("Timeline loaded: {:?}", outcome);
    }

    script::replay(&mut editor, events, args.auto_frames);
    print_json(editor.timeline())
}

/// Returns false when the timeline breaks any invariant
fn check_command(settings: Option<&Path>, timeline: &Path, segments: Option<&Path>) -> Result<bool> {
    let settings = load_settings(settings);
    let timeline: Timeline = read_json(timeline, "timeline")?;
    let segments: Option<Vec<Segment>> = segments.map(|path| read_json(path, "segments")).transpose()?;

    let violations = validate_timeline(&timeline, segments.as_deref(), settings.min_clip_seconds);
    if violations.is_empty() {
        info!(
            "Timeline is valid: {} video clips, {} audio clips",
            timeline.video_clips.len(),
            timeline.audio_clips.len()
        );
        return Ok(true);
    }

    for violation in &violations {
        println!("{}", violation);
    }
    warn!("{} violation(s) found", violations.len());
    Ok(false)
}
