//! Sayback Daemon - speech practice behind a Unix socket
//!
//! Keeps the sentence catalog, recognizer, and synthesizer configured
//! and ready, and drives one practice attempt at a time:
//! prompt playback, capture, recognition, scoring, feedback events.
//! Socket commands: sentence <id> | next | say [voice] | start | stop |
//! status | stats | history | quit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use sayback_daemon::config::SaybackConfig;
use sayback_daemon::ipc::IpcServer;
use sayback_daemon::pipeline::{Daemon, PracticePipeline};
use sayback_session::{MemoryHistory, SentenceLibrary};
use sayback_stt::{CommandRecognizer, SttEngine};
use sayback_tts::Synthesizer;

#[derive(Parser, Debug)]
#[command(name = "sayback-daemon", about = "Sayback speech-practice daemon")]
struct Args {
    /// Config file path (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    info!("Starting Sayback daemon v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // Load configuration
    let config = match args.config {
        Some(path) => SaybackConfig::load_from(path),
        None => SaybackConfig::load(),
    }
    .context("Failed to load configuration")?;

    info!("Configuration loaded from {}", config.config_path.display());

    // Sentence catalog (builtin fallback when the file is missing)
    let library = SentenceLibrary::load_or_builtin(&config.library_path);
    info!("Sentence library ready ({} sentences)", library.len());

    // Recognizer behind the configured external command
    let recognizer = CommandRecognizer::new(
        &config.stt_program,
        Some(PathBuf::from(config.stt_model_path())),
    );
    let engine = SttEngine::for_tier(config.stt_model, recognizer);
    info!("Recognizer: {} via {}", engine.model_name(), config.stt_program);

    // Prompt synthesis with on-disk cache
    let synthesizer = Synthesizer::new(
        &config.tts_program,
        config.tts_voices.clone(),
        config.tts_default_voice.clone(),
        config.tts_cache_dir(),
    );

    let history = Arc::new(MemoryHistory::new());

    let (pipeline, mut events) = PracticePipeline::new(
        config.clone(),
        engine,
        synthesizer,
        library,
        history,
    );
    let daemon = Arc::new(Daemon::new(pipeline));

    // Forward session events as JSON lines into the log; a UI client
    // would subscribe here instead
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.to_json_line() {
                Ok(line) => info!("session event: {}", line.trim_end()),
                Err(e) => warn!("unserializable session event: {}", e),
            }
        }
    });

    // Watchdog enforcing the max-duration timeout on recordings
    let daemon_for_watchdog = daemon.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(500)).await;
            if let Some(result) = daemon_for_watchdog.enforce_timeout().await {
                match result {
                    Ok(msg) => info!("timeout stop: {}", msg),
                    Err(e) => warn!("timeout stop failed: {}", e),
                }
            }
        }
    });

    // Start IPC server for practice commands
    let socket_path = config.socket_path.clone();
    let mut ipc_server = IpcServer::new(&socket_path, daemon.clone())
        .context("Failed to start IPC server")?;

    info!("Sayback daemon ready");
    info!("   Drive it with: echo start | nc -U {}", socket_path);

    tokio::select! {
        result = ipc_server.run() => {
            if let Err(e) = result {
                error!("IPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    // Cleanup
    let _ = std::fs::remove_file(&socket_path);
    info!("Sayback daemon stopped");

    Ok(())
}
