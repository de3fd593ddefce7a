//! Error types for the ingestion orchestrator.
//!
//! Errors from every stage chain into `IngestError`, which is turned into
//! a user-facing message at the orchestrator boundary and never returned
//! to the caller.

use thiserror::Error;

use crate::encoding::EncodeError;
use crate::models::TrimError;
use crate::probe::ProbeError;
use crate::recorder::RecordError;
use crate::validation::ValidationError;

/// Any failure while ingesting a batch.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Trim(#[from] TrimError),

    /// The user dismissed the trim prompt for an over-length video.
    #[error("Trimming '{name}' was cancelled")]
    TrimDeclined { name: String, max_seconds: f64 },

    /// The video could not be opened for playback.
    #[error("Failed to open '{name}' for playback: {message}")]
    PlaybackOpen { name: String, message: String },
}

impl IngestError {
    pub fn trim_declined(name: impl Into<String>, max_seconds: f64) -> Self {
        Self::TrimDeclined {
            name: name.into(),
            max_seconds,
        }
    }

    pub fn playback_open(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PlaybackOpen {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Message shown to the user in the field's error slot.
    pub fn user_message(&self) -> String {
        match self {
            IngestError::Validation(e) => e.to_string(),
            IngestError::Encode(EncodeError::Timeout { name, .. }) => format!(
                "Processing '{}' took too long. Try a smaller file.",
                name
            ),
            IngestError::Encode(EncodeError::ResultTooLarge { name, .. }) => {
                format!("'{}' is too large after conversion. Try a smaller file.", name)
            }
            IngestError::Encode(EncodeError::Read { name, .. }) => {
                format!("Could not read '{}'. The file may be corrupt.", name)
            }
            IngestError::Probe(_) => {
                "Could not read the video's duration. The file may be corrupt or unsupported."
                    .to_string()
            }
            IngestError::Record(RecordError::RecorderInit(_)) => {
                "Video trimming is not supported on this device.".to_string()
            }
            IngestError::Record(RecordError::Assembly(_)) => {
                "Could not save the trimmed video.".to_string()
            }
            IngestError::Record(_) | IngestError::PlaybackOpen { .. } => {
                "Could not prepare the video for trimming.".to_string()
            }
            IngestError::Trim(e) => format!("Invalid trim selection: {}", e),
            IngestError::TrimDeclined { max_seconds, .. } => format!(
                "Video was not added: videos can be at most {:.0} seconds long.",
                max_seconds
            ),
        }
    }
}

/// Result type for ingestion stages.
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn validation_message_passes_through() {
        let err = IngestError::from(ValidationError::CountLimitExceeded {
            max: 6,
            noun: "photos",
        });
        assert_eq!(
            err.user_message(),
            "You can add at most 6 photos per memory!"
        );
    }

    #[test]
    fn timeout_message_names_the_file() {
        let err = IngestError::from(EncodeError::timeout("beach.jpg", Duration::from_secs(10)));
        assert!(err.user_message().contains("beach.jpg"));
        assert!(err.to_string().contains("10000 ms"));
    }

    #[test]
    fn declined_trim_mentions_limit() {
        let err = IngestError::trim_declined("long.mp4", 30.0);
        assert!(err.user_message().contains("30 seconds"));
    }
}
