//! subloop - main entry point
//!
//! Loads the recording and its subtitle file, prepares the segment sequence,
//! starts the audio stream, and runs the cooperative control loop: poll a
//! key, run the engine's idle check, redraw. Load failures abort here with
//! context before any session state exists; everything after that is
//! recovered per command.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subloop::audio::{self, AudioOutput, FrameSource};
use subloop::config::PlayerConfig;
use subloop::playback::{LaneMixer, PlaybackEngine};
use subloop::ui::{self, Screen, SessionView, UserCommand};
use subloop::{clipboard, export, segment, subtitle};

/// Command-line arguments for subloop
#[derive(Parser, Debug)]
#[command(name = "subloop")]
#[command(about = "Subtitle-segment loop player with crossfade restarts")]
#[command(version)]
struct Args {
    /// Audio recording to review
    audio: PathBuf,

    /// Subtitle file (.srt) aligned to the recording
    subtitle: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long, env = "SUBLOOP_CONFIG")]
    config: Option<PathBuf>,

    /// Audio output device name (default: system default)
    #[arg(short, long, env = "SUBLOOP_DEVICE")]
    device: Option<String>,

    /// Directory for exported segment files
    #[arg(short, long, default_value = ".", env = "SUBLOOP_OUT_DIR")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; default to warnings so they do not fight the
    // raw-mode screen unless the user opts in via RUST_LOG.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    info!("Loading {}", args.audio.display());
    let cues = subtitle::load_srt(&args.subtitle).context("Failed to load subtitle file")?;

    let decoded = audio::decode_file(&args.audio).context("Failed to decode audio file")?;
    let recording = audio::to_target_rate(decoded).context("Failed to resample audio")?;

    let segments = Arc::new(
        segment::prepare_segments(&recording, &cues, &config)
            .context("Failed to prepare segments")?,
    );
    drop(recording); // segments own their slices; the full buffer can go

    let mixer: Arc<Mutex<LaneMixer>> = Arc::new(Mutex::new(LaneMixer::new()));
    let mut output = AudioOutput::new(args.device.clone()).context("Failed to open audio device")?;
    let source: Arc<Mutex<dyn FrameSource>> = mixer.clone();
    output.start(source).context("Failed to start audio stream")?;

    let mut engine = PlaybackEngine::new(Arc::clone(&segments), Arc::clone(&mixer), &config);

    let screen = Screen::new().context("Failed to initialize terminal")?;
    let result = run_session(&mut engine, &args, &config, screen).await;

    output.stop().ok();
    result
}

/// The cooperative control loop: one tick polls input, handles at most one
/// command, runs the engine's idle check, and redraws.
async fn run_session(
    engine: &mut PlaybackEngine,
    args: &Args,
    config: &PlayerConfig,
    mut screen: Screen,
) -> Result<()> {
    let mut subtitle_visible = true;
    let mut tick = tokio::time::interval(Duration::from_millis(config.tick_ms));

    // Initial play: first restart lands on lane 0
    engine.replay();

    loop {
        tick.tick().await;

        if let Some(command) = ui::poll_command(Duration::ZERO)? {
            match command {
                UserCommand::Quit => break,
                UserCommand::TogglePause => engine.toggle_pause(),
                UserCommand::Replay => engine.replay(),
                UserCommand::Advance => engine.advance(),
                UserCommand::Retreat => engine.retreat(),
                UserCommand::ToggleLoop => engine.toggle_loop(),
                UserCommand::ToggleSubtitle => subtitle_visible = !subtitle_visible,
                UserCommand::CopyText => copy_current_text(engine),
                UserCommand::Export => export_current_segment(engine, args, config),
            }
        }

        engine.tick();

        let view = SessionView {
            ordinal: engine.current_index() + 1,
            segment_count: engine.segment_count(),
            state: engine.state(),
            loop_enabled: engine.loop_enabled(),
            subtitle_visible,
            text: engine
                .current_segment()
                .map(|s| s.text.clone())
                .unwrap_or_default(),
            notice: engine.notice().map(str::to_string),
        };
        screen.draw(&view)?;
    }

    Ok(())
}

/// Copy the current subtitle text; failure becomes a notice, never an exit.
fn copy_current_text(engine: &mut PlaybackEngine) {
    let Some(text) = engine.current_segment().map(|s| s.text.clone()) else {
        return;
    };
    match clipboard::copy_text(&text) {
        Ok(()) => engine.set_notice("Copied Text!"),
        Err(e) => {
            warn!("Copy failed: {}", e);
            engine.set_notice("Copy failed");
        }
    }
}

/// Export the current segment; failure becomes a notice, never an exit.
fn export_current_segment(engine: &mut PlaybackEngine, args: &Args, config: &PlayerConfig) {
    let Some(segment) = engine.current_segment().cloned() else {
        return;
    };
    match export::export_segment(&segment, &args.audio, &args.out_dir, config) {
        Ok(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            engine.set_notice(format!("Saved: {}", name));
        }
        Err(e) => {
            warn!("Export failed: {}", e);
            engine.set_notice("Export failed");
        }
    }
}
