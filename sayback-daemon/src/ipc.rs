//! Unix socket IPC server for practice commands

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

use crate::pipeline::Daemon;

/// IPC command
#[derive(Debug, PartialEq)]
pub enum IpcCommand {
    /// Select a sentence by catalog id
    Sentence(i64),
    /// Advance to the next catalog sentence
    Next,
    /// Play the prompt, optionally with a named voice
    Say(Option<String>),
    Start,
    Stop,
    Status,
    /// Aggregate accuracy stats for the configured user
    Stats,
    /// Latest attempts, newest first
    History,
    Quit,
}

impl IpcCommand {
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let head = parts.next().unwrap_or("").to_lowercase();

        match head.as_str() {
            "sentence" => {
                let id = parts
                    .next()
                    .context("usage: sentence <id>")?
                    .parse::<i64>()
                    .context("sentence id must be an integer")?;
                Ok(Self::Sentence(id))
            }
            "next" => Ok(Self::Next),
            "say" => Ok(Self::Say(parts.next().map(str::to_string))),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "status" => Ok(Self::Status),
            "stats" => Ok(Self::Stats),
            "history" => Ok(Self::History),
            "quit" | "exit" | "shutdown" => Ok(Self::Quit),
            _ => anyhow::bail!("Unknown command: {}", s.trim()),
        }
    }
}

/// Unix socket IPC server
pub struct IpcServer {
    listener: UnixListener,
    daemon: Arc<Daemon>,
}

impl IpcServer {
    /// Create new IPC server
    pub fn new(socket_path: &str, daemon: Arc<Daemon>) -> Result<Self> {
        // Remove existing socket if it exists
        let _ = std::fs::remove_file(socket_path);

        let listener = UnixListener::bind(socket_path)
            .context("Failed to bind Unix socket")?;

        info!("IPC server listening on {}", socket_path);

        Ok(Self { listener, daemon })
    }

    /// Accept connections until the listener fails.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let (stream, _) = self
                .listener
                .accept()
                .await
                .context("Failed to accept connection")?;
            let daemon = self.daemon.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, daemon).await {
                    error!("IPC connection error: {}", e);
                }
            });
        }
    }
}

/// Handle a single IPC connection
pub async fn handle_connection(mut stream: UnixStream, daemon: Arc<Daemon>) -> Result<()> {
    let mut buffer = [0u8; 1024];
    let n = stream.read(&mut buffer).await?;

    if n == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..n]);
    debug!("Received IPC command: {}", request.trim());

    let response = match IpcCommand::parse(&request) {
        Ok(IpcCommand::Sentence(id)) => reply(daemon.select_sentence(id).await),
        Ok(IpcCommand::Next) => reply(daemon.next_sentence().await),
        Ok(IpcCommand::Say(voice)) => reply(daemon.play_prompt(voice.as_deref()).await),
        Ok(IpcCommand::Start) => reply(daemon.start_attempt().await),
        Ok(IpcCommand::Stop) => reply(daemon.stop_attempt().await),
        Ok(IpcCommand::Status) => daemon.status().await,
        Ok(IpcCommand::Stats) => reply(daemon.user_stats().await),
        Ok(IpcCommand::History) => reply(daemon.recent_history(10).await),
        Ok(IpcCommand::Quit) => {
            info!("Received quit command");
            std::process::exit(0);
        }
        Err(e) => format!("Error: {}", e),
    };

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}

fn reply(result: Result<String>) -> String {
    match result {
        Ok(msg) => msg,
        Err(e) => format!("Error: {}", e),
    }
}
