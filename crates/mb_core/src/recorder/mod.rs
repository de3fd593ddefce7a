//! Real-time re-encoding of a bounded playback window.
//!
//! Instead of transcoding, the recorder plays the video through a
//! [`PlaybackHandle`] and captures the rendered stream for a fixed amount
//! of wall-clock time. This makes media capture a hard requirement of the
//! playback backend: a handle that cannot capture fails with
//! [`RecordError::RecorderInit`].
//!
//! # State machine
//!
//! ```text
//! Idle ─► MetadataWait ─► Seeking ─► Recording ─► Stopped(Success)
//!              │              │           │
//!              └──────────────┴───────────┴─────► Stopped(Failure)
//! ```

mod ffmpeg;
mod segment;
mod state;

use async_trait::async_trait;
use thiserror::Error;

pub use ffmpeg::{FfmpegCapture, FfmpegPlayback};
pub use segment::SegmentRecorder;
pub use state::{RecorderState, StopOutcome};

/// Error reported by a playback handle or capture sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandleError(pub String);

impl HandleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors from recording a segment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The handle errored (or timed out) before reporting a usable duration.
    #[error("Video metadata unavailable: {0}")]
    Metadata(String),

    /// Seeking to the window start failed.
    #[error("Failed to seek to {position:.2}s: {message}")]
    Seek { position: f64, message: String },

    /// Playback could not be started.
    #[error("Playback failed: {0}")]
    Playback(String),

    /// The backend offers no capture capability, or the recorder failed to start.
    #[error("Recording is not available: {0}")]
    RecorderInit(String),

    /// Captured chunks could not be turned into a blob.
    #[error("Failed to assemble recording: {0}")]
    Assembly(String),
}

/// Result type for recorder operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// A playable video the recorder can drive.
#[async_trait]
pub trait PlaybackHandle: Send {
    /// Wait until the handle reports its duration in seconds.
    async fn wait_for_metadata(&mut self) -> Result<f64, HandleError>;

    /// Seek to a position and wait for the seek to complete.
    async fn seek(&mut self, seconds: f64) -> Result<(), HandleError>;

    /// Mute or unmute audible output.
    fn set_muted(&mut self, muted: bool);

    /// Start playback from the current position.
    async fn play(&mut self) -> Result<(), HandleError>;

    /// Stop playback.
    fn pause(&mut self);

    /// Open a capture of the rendered stream.
    ///
    /// Returns `None` when the backend cannot capture.
    fn capture_stream(&mut self) -> Option<Box<dyn CaptureSink>>;

    /// Release any resources held by the handle. Must be idempotent.
    fn release(&mut self);
}

/// Receives the rendered stream of a playing handle as chunks.
#[async_trait]
pub trait CaptureSink: Send {
    /// Container MIME type of the captured chunks.
    fn mime(&self) -> &str;

    /// Begin capturing.
    async fn start(&mut self) -> Result<(), HandleError>;

    /// Stop capturing and hand back every chunk received.
    async fn stop(&mut self) -> Result<Vec<Vec<u8>>, HandleError>;
}
