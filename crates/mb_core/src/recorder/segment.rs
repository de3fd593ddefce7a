//! Segment recorder driving a playback handle through its state machine.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::state::{RecorderState, StopOutcome};
use super::{PlaybackHandle, RecordError, RecordResult};
use crate::models::{MediaBlob, MediaPolicy};

/// Records a bounded window of a playing video into a new blob.
pub struct SegmentRecorder {
    /// Longest clip that will be captured, in seconds.
    max_clip_seconds: f64,
    /// How long to wait for the handle's metadata.
    metadata_timeout: Duration,
    /// Current state.
    state: Mutex<RecorderState>,
    /// States visited by the most recent recording.
    transitions: Mutex<Vec<RecorderState>>,
}

impl SegmentRecorder {
    pub fn new(max_clip_seconds: f64, metadata_timeout: Duration) -> Self {
        Self {
            max_clip_seconds,
            metadata_timeout,
            state: Mutex::new(RecorderState::Idle),
            transitions: Mutex::new(vec![RecorderState::Idle]),
        }
    }

    pub fn from_policy(policy: &MediaPolicy) -> Self {
        Self::new(policy.max_clip_seconds, policy.metadata_timeout())
    }

    /// Current state.
    pub fn state(&self) -> RecorderState {
        *self.state.lock()
    }

    /// States visited by the most recent recording, in order.
    pub fn transitions(&self) -> Vec<RecorderState> {
        self.transitions.lock().clone()
    }

    fn enter(&self, next: RecorderState) {
        let previous = std::mem::replace(&mut *self.state.lock(), next);
        self.transitions.lock().push(next);
        tracing::debug!("Recorder: {} -> {}", previous, next);
    }

    /// Record `duration_seconds` of playback starting at `start_seconds`.
    ///
    /// The start is clamped into the video, and the length is clamped to
    /// the clip limit and to the remaining playback. The handle is
    /// released before this returns, on every path.
    pub async fn record_segment<H>(
        &self,
        handle: &mut H,
        start_seconds: f64,
        duration_seconds: f64,
    ) -> RecordResult<MediaBlob>
    where
        H: PlaybackHandle + ?Sized,
    {
        *self.state.lock() = RecorderState::Idle;
        *self.transitions.lock() = vec![RecorderState::Idle];

        let result = self
            .run(ReleaseGuard(handle), start_seconds, duration_seconds)
            .await;

        match &result {
            Ok(blob) => {
                self.enter(RecorderState::Stopped(StopOutcome::Success));
                tracing::info!(
                    "Captured segment for {:.2}s ({} bytes, {})",
                    blob.capture_wall_seconds,
                    blob.len(),
                    blob.mime
                );
            }
            Err(e) => {
                self.enter(RecorderState::Stopped(StopOutcome::Failure));
                tracing::warn!("Segment recording failed: {}", e);
            }
        }
        result
    }

    async fn run<H>(
        &self,
        mut handle: ReleaseGuard<'_, H>,
        start_seconds: f64,
        duration_seconds: f64,
    ) -> RecordResult<MediaBlob>
    where
        H: PlaybackHandle + ?Sized,
    {
        self.enter(RecorderState::MetadataWait);
        let total = match tokio::time::timeout(self.metadata_timeout, handle.wait_for_metadata())
            .await
        {
            Err(_) => {
                return Err(RecordError::Metadata(format!(
                    "no metadata after {} ms",
                    self.metadata_timeout.as_millis()
                )))
            }
            Ok(Err(e)) => return Err(RecordError::Metadata(e.to_string())),
            Ok(Ok(d)) if !d.is_finite() || d <= 0.0 => {
                return Err(RecordError::Metadata(format!("invalid duration {}", d)))
            }
            Ok(Ok(d)) => d,
        };

        self.enter(RecorderState::Seeking);
        let start = if start_seconds.is_finite() {
            start_seconds.clamp(0.0, total)
        } else {
            0.0
        };
        handle
            .seek(start)
            .await
            .map_err(|e| RecordError::Seek {
                position: start,
                message: e.to_string(),
            })?;

        let clip = clip_length(duration_seconds, self.max_clip_seconds, total - start);
        if clip <= 0.0 {
            return Err(RecordError::Assembly(format!(
                "empty segment at {:.2}s of {:.2}s",
                start, total
            )));
        }

        self.enter(RecorderState::Recording);
        let mut sink = handle
            .capture_stream()
            .ok_or_else(|| RecordError::RecorderInit("capture is not supported".to_string()))?;

        handle.set_muted(true);
        handle
            .play()
            .await
            .map_err(|e| RecordError::Playback(e.to_string()))?;
        if let Err(e) = sink.start().await {
            handle.pause();
            return Err(RecordError::RecorderInit(e.to_string()));
        }

        tracing::debug!("Capturing {:.2}s from {:.2}s", clip, start);
        let started = Instant::now();
        tokio::time::sleep(Duration::from_secs_f64(clip)).await;

        let chunks = sink.stop().await;
        handle.pause();
        let capture_wall_seconds = started.elapsed().as_secs_f64();

        let chunks = chunks.map_err(|e| RecordError::Assembly(e.to_string()))?;
        let bytes = assemble(chunks)?;

        Ok(MediaBlob {
            mime: sink.mime().to_string(),
            bytes,
            capture_wall_seconds,
        })
    }
}

/// Seconds to capture: the request, capped by the clip limit and the remaining playback.
fn clip_length(requested: f64, max_clip: f64, remaining: f64) -> f64 {
    let requested = if requested.is_finite() {
        requested
    } else {
        max_clip
    };
    requested.min(max_clip).min(remaining).max(0.0)
}

/// Concatenate captured chunks into one buffer.
fn assemble(chunks: Vec<Vec<u8>>) -> RecordResult<Vec<u8>> {
    let total: usize = chunks.iter().map(Vec::len).sum();
    if total == 0 {
        return Err(RecordError::Assembly("no data was captured".to_string()));
    }

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(total)
        .map_err(|e| RecordError::Assembly(e.to_string()))?;
    for chunk in chunks {
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Releases the wrapped handle when dropped.
struct ReleaseGuard<'a, H: PlaybackHandle + ?Sized>(&'a mut H);

impl<H: PlaybackHandle + ?Sized> Deref for ReleaseGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.0
    }
}

impl<H: PlaybackHandle + ?Sized> DerefMut for ReleaseGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.0
    }
}

impl<H: PlaybackHandle + ?Sized> Drop for ReleaseGuard<'_, H> {
    fn drop(&mut self) {
        self.0.release();
    }
}
