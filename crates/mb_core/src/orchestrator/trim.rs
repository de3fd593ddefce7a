//! Collaborators for the over-length video path.
//!
//! The orchestrator asks a [`TrimPrompt`] which window to keep, then opens
//! the video through a [`RecorderFactory`] and hands the handle to the
//! segment recorder.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::{MediaCandidate, TrimWindow};
use crate::probe::FfprobeDurationProbe;
use crate::recorder::{FfmpegPlayback, HandleError, PlaybackHandle};

/// Lets the user adjust the suggested trim window.
#[async_trait]
pub trait TrimPrompt: Send + Sync {
    /// Return the window to keep, or `None` when the user cancels.
    async fn confirm(
        &self,
        name: &str,
        total_seconds: f64,
        suggested: TrimWindow,
    ) -> Option<TrimWindow>;
}

/// Keeps the suggested window unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptSuggested;

#[async_trait]
impl TrimPrompt for AcceptSuggested {
    async fn confirm(
        &self,
        _name: &str,
        _total_seconds: f64,
        suggested: TrimWindow,
    ) -> Option<TrimWindow> {
        Some(suggested)
    }
}

/// Slides the suggested window to start at a fixed offset.
///
/// Offsets past the point where a full window fits are pulled back.
#[derive(Debug, Clone, Copy)]
pub struct StartAt(pub f64);

#[async_trait]
impl TrimPrompt for StartAt {
    async fn confirm(
        &self,
        name: &str,
        total_seconds: f64,
        suggested: TrimWindow,
    ) -> Option<TrimWindow> {
        match suggested.with_start(self.0, total_seconds) {
            Ok(window) => Some(window),
            Err(e) => {
                tracing::warn!("Ignoring trim start {} for '{}': {}", self.0, name, e);
                None
            }
        }
    }
}

/// Opens a candidate as something the segment recorder can play.
#[async_trait]
pub trait RecorderFactory: Send + Sync {
    async fn open(
        &self,
        candidate: &MediaCandidate,
    ) -> Result<Box<dyn PlaybackHandle>, HandleError>;
}

/// Plays candidates through FFmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegRecorderFactory {
    ffmpeg: PathBuf,
    probe: FfprobeDurationProbe,
}

impl FfmpegRecorderFactory {
    pub fn new(ffmpeg: impl Into<PathBuf>, probe: FfprobeDurationProbe) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            probe,
        }
    }
}

impl Default for FfmpegRecorderFactory {
    fn default() -> Self {
        Self::new("ffmpeg", FfprobeDurationProbe::default())
    }
}

#[async_trait]
impl RecorderFactory for FfmpegRecorderFactory {
    async fn open(
        &self,
        candidate: &MediaCandidate,
    ) -> Result<Box<dyn PlaybackHandle>, HandleError> {
        let playback = FfmpegPlayback::open(candidate, self.ffmpeg.clone(), self.probe.clone())
            .await
            .map_err(|e| HandleError::new(format!("failed to stage video: {}", e)))?;
        Ok(Box::new(playback))
    }
}
