//! Read-only inspection of video metadata.
//!
//! The pipeline only needs one fact about a video before deciding how to
//! ingest it: its duration. `DurationProbe` is the seam; `FfprobeDurationProbe`
//! is the production implementation, which materialises the candidate as a
//! temporary file and asks `ffprobe` for the container duration.

mod ffprobe;
mod temp_handle;

use std::io;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DurationReport, MediaCandidate};

pub use ffprobe::{parse_ffprobe_duration, FfprobeDurationProbe};
pub use temp_handle::TempMediaFile;

/// Errors from probing a video's duration.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probing tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The probing tool exited with an error.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// Metadata never became available.
    #[error("Metadata for '{name}' was not available after {timeout_ms} ms")]
    MetadataTimeout { name: String, timeout_ms: u64 },

    /// The container did not expose a duration (malformed or unsupported).
    #[error("Could not read the duration of '{name}': {message}")]
    Unreadable { name: String, message: String },

    /// A duration was reported but is not finite and positive.
    #[error("'{name}' reported an invalid duration ({seconds})")]
    InvalidDuration { name: String, seconds: f64 },

    /// Creating or writing the temporary handle failed.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    pub fn unreadable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreadable {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Something that can report a video's duration in seconds.
///
/// Implementations must release any temporary handle they create on
/// both the success and failure paths.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Probe the duration of a candidate, in seconds.
    async fn probe_duration(&self, candidate: &MediaCandidate) -> ProbeResult<f64>;
}

/// Probe a candidate and evaluate the result against the clip ceiling.
///
/// Durations that are not finite and positive are reported as
/// [`ProbeError::InvalidDuration`].
pub async fn probe_report(
    probe: &dyn DurationProbe,
    candidate: &MediaCandidate,
    max_clip_seconds: f64,
) -> ProbeResult<DurationReport> {
    let seconds = probe.probe_duration(candidate).await?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(ProbeError::InvalidDuration {
            name: candidate.name().to_string(),
            seconds,
        });
    }

    let report = DurationReport::evaluate(seconds, max_clip_seconds);
    tracing::debug!(
        "Probed '{}': {:.2}s (ceiling {:.0}s, valid: {})",
        candidate.name(),
        report.seconds,
        max_clip_seconds,
        report.valid
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;

    fn video() -> MediaCandidate {
        MediaCandidate::from_bytes("clip.mp4", "video/mp4", vec![0u8; 16])
    }

    #[tokio::test]
    async fn report_marks_long_video_for_trim() {
        let probe = FakeProbe::seconds(45.0);
        let report = probe_report(&probe, &video(), 30.0).await.unwrap();
        assert_eq!(report.seconds, 45.0);
        assert!(report.needs_trim());
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn report_rejects_nonsense_duration() {
        let probe = FakeProbe::seconds(f64::INFINITY);
        let err = probe_report(&probe, &video(), 30.0).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidDuration { .. }));
    }

    #[tokio::test]
    async fn report_propagates_probe_failure() {
        let probe = FakeProbe::failing();
        let err = probe_report(&probe, &video(), 30.0).await.unwrap_err();
        assert!(matches!(err, ProbeError::Unreadable { .. }));
    }
}
