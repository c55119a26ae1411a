//! One-shot webcam frame capture.
//!
//! The camera is an exclusively-owned, short-lived resource: each grab
//! spawns the configured capture command against a temp file, reads the
//! frame back, and releases everything before returning. Nothing is held
//! across a resolution cycle.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use moodlift_core::error::{MoodliftError, Result};

pub struct FrameCapture {
    command: String,
}

impl FrameCapture {
    /// `command` is a whitespace-separated template; the `{output}` token is
    /// replaced with the frame's temp path (appended if absent).
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Grabs a single JPEG frame from the camera.
    pub async fn grab_frame(&self) -> Result<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let frame_path = dir.path().join("frame.jpg");
        let args = build_args(&self.command, &frame_path);
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| MoodliftError::config("capture command is empty"))?;

        debug!(command = %self.command, "capturing frame");
        let output = Command::new(program).args(rest).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MoodliftError::capture(format!(
                "capture command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(&frame_path)
            .await
            .map_err(|_| MoodliftError::capture("capture command wrote no frame"))?;
        if bytes.is_empty() {
            return Err(MoodliftError::capture("captured frame is empty"));
        }
        Ok(bytes)
    }
}

fn build_args(template: &str, frame_path: &Path) -> Vec<String> {
    let path = frame_path.display().to_string();
    let mut args: Vec<String> = template
        .split_whitespace()
        .map(|token| {
            if token == "{output}" {
                path.clone()
            } else {
                token.to_string()
            }
        })
        .collect();
    if !template.split_whitespace().any(|t| t == "{output}") {
        args.push(path);
    }
    args
}
