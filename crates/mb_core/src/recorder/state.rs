//! Recorder lifecycle states.

use serde::{Deserialize, Serialize};

/// How a recording ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopOutcome {
    Success,
    Failure,
}

/// Where a segment recording currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderState {
    #[default]
    Idle,
    MetadataWait,
    Seeking,
    Recording,
    Stopped(StopOutcome),
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "idle"),
            RecorderState::MetadataWait => write!(f, "waiting for metadata"),
            RecorderState::Seeking => write!(f, "seeking"),
            RecorderState::Recording => write!(f, "recording"),
            RecorderState::Stopped(StopOutcome::Success) => write!(f, "stopped (success)"),
            RecorderState::Stopped(StopOutcome::Failure) => write!(f, "stopped (failure)"),
        }
    }
}
