//! Audio capture as an opaque external process
//!
//! Recording is delegated to a configured arecord-style command; the
//! daemon only starts it, stops it, and hands the finished WAV to
//! validation. A corrupt or truncated file is caught there, not here.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

/// A running capture process and the WAV it is writing.
pub struct CaptureHandle {
    child: Child,
    path: PathBuf,
    started: Instant,
}

/// Spawn the capture command writing a 16 kHz mono WAV to `path`.
///
/// `max_secs` is also passed to the command as its own duration limit,
/// so a capture can never outlive the attempt even if the daemon dies.
pub fn start_capture(
    program: &str,
    device: Option<&str>,
    max_secs: u64,
    path: PathBuf,
) -> Result<CaptureHandle> {
    let mut command = Command::new(program);
    if let Some(device) = device {
        command.arg("-D").arg(device);
    }
    command
        .arg("-q")
        .arg("-f")
        .arg("S16_LE")
        .arg("-r")
        .arg("16000")
        .arg("-c")
        .arg("1")
        .arg("-d")
        .arg(max_secs.to_string())
        .arg(&path)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let child = command
        .spawn()
        .with_context(|| format!("failed to start capture program {program}"))?;

    debug!(program, path = %path.display(), "capture started");
    Ok(CaptureHandle {
        child,
        path,
        started: Instant::now(),
    })
}

impl CaptureHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seconds since capture started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Stop the capture process and return the WAV path with the
    /// elapsed duration. The file may still be invalid (for example
    /// when the process died early); callers validate before use.
    pub fn stop(mut self) -> (PathBuf, f64) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let duration = self.started.elapsed().as_secs_f64();
        debug!(path = %self.path.display(), duration_s = duration, "capture stopped");
        (self.path, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_program_fails_to_start() {
        let dir = TempDir::new().unwrap();
        let result = start_capture(
            "/nonexistent/capture-binary",
            None,
            30,
            dir.path().join("out.wav"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stop_returns_path_and_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        // `true` accepts the arguments, exits immediately, writes nothing;
        // validation downstream is what rejects the missing file
        let handle = start_capture("true", None, 30, path.clone()).unwrap();
        let (returned, duration) = handle.stop();
        assert_eq!(returned, path);
        assert!(duration >= 0.0);
    }
}
