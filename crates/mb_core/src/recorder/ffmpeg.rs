//! Playback handle backed by FFmpeg.
//!
//! FFmpeg's `-re` flag reads the input at its native frame rate, so the
//! process behaves like a player whose rendered output is re-encoded on
//! the fly. The capture runs for as long as the recorder keeps it open.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::{CaptureSink, HandleError, PlaybackHandle};
use crate::models::MediaCandidate;
use crate::probe::{FfprobeDurationProbe, TempMediaFile};

/// Size of each read from FFmpeg's output pipe.
const CHUNK_SIZE: usize = 64 * 1024;

/// Grace period for FFmpeg to finalise the container after `q`.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Lines of FFmpeg's stderr kept for error messages.
const STDERR_TAIL_LINES: usize = 5;

/// A candidate opened for playback through FFmpeg.
pub struct FfmpegPlayback {
    name: String,
    /// Temporary copy of the candidate; `None` once released.
    file: Option<TempMediaFile>,
    ffmpeg: PathBuf,
    probe: FfprobeDurationProbe,
    duration: Option<f64>,
    position: f64,
}

impl FfmpegPlayback {
    /// Open a candidate for playback.
    pub async fn open(
        candidate: &MediaCandidate,
        ffmpeg: impl Into<PathBuf>,
        probe: FfprobeDurationProbe,
    ) -> std::io::Result<Self> {
        let file = TempMediaFile::materialize(candidate).await?;
        Ok(Self {
            name: candidate.name().to_string(),
            file: Some(file),
            ffmpeg: ffmpeg.into(),
            probe,
            duration: None,
            position: 0.0,
        })
    }

    fn path(&self) -> Result<PathBuf, HandleError> {
        self.file
            .as_ref()
            .map(|f| f.path().to_path_buf())
            .ok_or_else(|| HandleError::new("playback handle already released"))
    }
}

#[async_trait]
impl PlaybackHandle for FfmpegPlayback {
    async fn wait_for_metadata(&mut self) -> Result<f64, HandleError> {
        let path = self.path()?;
        let duration = self
            .probe
            .probe_path(&self.name, &path)
            .await
            .map_err(|e| HandleError::new(e.to_string()))?;
        self.duration = Some(duration);
        Ok(duration)
    }

    async fn seek(&mut self, seconds: f64) -> Result<(), HandleError> {
        self.path()?;
        match self.duration {
            Some(d) if seconds >= 0.0 && seconds <= d => {
                self.position = seconds;
                Ok(())
            }
            Some(d) => Err(HandleError::new(format!(
                "position {:.2}s outside 0..{:.2}s",
                seconds, d
            ))),
            None => Err(HandleError::new("metadata not loaded")),
        }
    }

    // Nothing is rendered, so there is no audio to mute.
    fn set_muted(&mut self, _muted: bool) {}

    async fn play(&mut self) -> Result<(), HandleError> {
        self.path()?;
        Ok(())
    }

    // Playback lives in the capture process; stopping the capture stops it.
    fn pause(&mut self) {}

    fn capture_stream(&mut self) -> Option<Box<dyn CaptureSink>> {
        let path = self.path().ok()?;
        Some(Box::new(FfmpegCapture::new(
            self.ffmpeg.clone(),
            path,
            self.position,
        )))
    }

    fn release(&mut self) {
        if self.file.take().is_some() {
            tracing::debug!("Released playback handle for '{}'", self.name);
        }
    }
}

impl Drop for FfmpegPlayback {
    fn drop(&mut self) {
        self.release();
    }
}

/// Capture of an FFmpeg real-time re-encode, collected as WebM chunks.
pub struct FfmpegCapture {
    ffmpeg: PathBuf,
    input: PathBuf,
    start: f64,
    child: Option<Child>,
    reader: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr: Option<JoinHandle<String>>,
}

impl FfmpegCapture {
    pub fn new(ffmpeg: PathBuf, input: PathBuf, start: f64) -> Self {
        Self {
            ffmpeg,
            input,
            start,
            child: None,
            reader: None,
            stderr: None,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-re")
            .arg("-ss")
            .arg(format!("{:.3}", self.start))
            .arg("-i")
            .arg(&self.input)
            .arg("-c:v")
            .arg("libvpx")
            .arg("-deadline")
            .arg("realtime")
            .arg("-c:a")
            .arg("libopus")
            .arg("-f")
            .arg("webm")
            .arg("pipe:1");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CaptureSink for FfmpegCapture {
    fn mime(&self) -> &str {
        "video/webm"
    }

    async fn start(&mut self) -> Result<(), HandleError> {
        if self.child.is_some() {
            return Err(HandleError::new("capture already started"));
        }

        let mut cmd = self.command();
        tracing::debug!("Running FFmpeg: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| HandleError::new(format!("failed to spawn FFmpeg: {}", e)))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| HandleError::new("failed to capture FFmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| HandleError::new("failed to capture FFmpeg stderr"))?;

        self.reader = Some(tokio::spawn(async move {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; CHUNK_SIZE];
            loop {
                let n = stdout.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            Ok(chunks)
        }));
        self.stderr = Some(tokio::spawn(async move {
            let mut text = String::new();
            if let Err(e) = stderr.read_to_string(&mut text).await {
                tracing::debug!("Reading FFmpeg stderr failed: {}", e);
            }
            text
        }));
        self.child = Some(child);
        Ok(())
    }

    async fn stop(&mut self) -> Result<Vec<Vec<u8>>, HandleError> {
        let mut child = self
            .child
            .take()
            .ok_or_else(|| HandleError::new("capture was not started"))?;

        // `q` asks FFmpeg to finish the container cleanly.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(b"q").await;
        }
        let status = match tokio::time::timeout(STOP_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!("FFmpeg capture exited: {}", status);
                Some(status)
            }
            Ok(Err(e)) => {
                tracing::warn!("Waiting for FFmpeg failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("FFmpeg did not stop within {:?}, killing", STOP_GRACE);
                let _ = child.kill().await;
                None
            }
        };

        let reader = self
            .reader
            .take()
            .ok_or_else(|| HandleError::new("capture reader missing"))?;
        let chunks = reader
            .await
            .map_err(|e| HandleError::new(format!("capture reader failed: {}", e)))?
            .map_err(|e| HandleError::new(format!("failed to read FFmpeg output: {}", e)))?;

        let stderr = match self.stderr.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        let failed = status.is_some_and(|s| !s.success());
        let empty = chunks.iter().all(Vec::is_empty);
        if failed || empty {
            let tail = stderr_tail(&stderr, STDERR_TAIL_LINES);
            if !tail.is_empty() {
                let exit = status.map_or_else(|| "unknown".to_string(), |s| s.to_string());
                tracing::warn!("FFmpeg capture failed ({}): {}", exit, tail);
                return Err(HandleError::new(format!(
                    "FFmpeg exited with {}: {}",
                    exit, tail
                )));
            }
        }

        Ok(chunks)
    }
}

/// Last `lines` non-empty lines of `text`, joined with `" | "`.
fn stderr_tail(text: &str, lines: usize) -> String {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    kept[kept.len().saturating_sub(lines)..].join(" | ")
}
