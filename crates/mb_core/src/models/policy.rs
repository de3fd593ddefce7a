//! Ingestion policy limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const MB: u64 = 1024 * 1024;

/// Limits applied by the ingestion pipeline.
///
/// Supplied by the caller so different call sites can use different limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaPolicy {
    /// Largest accepted photo, in bytes.
    pub max_photo_bytes: u64,
    /// Most photos a single memory may hold.
    pub max_photos: usize,
    /// Largest accepted video, in bytes.
    pub max_video_bytes: u64,
    /// Longest video clip kept, in seconds.
    pub max_clip_seconds: f64,
    /// Wall-clock budget for encoding one file.
    pub encode_timeout_ms: u64,
    /// Ceiling on the encoded (textual) size.
    pub max_encoded_result_bytes: usize,
    /// How long to wait for media metadata before giving up.
    pub metadata_timeout_ms: u64,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_photo_bytes: 3 * MB,
            max_photos: 6,
            max_video_bytes: 16 * MB,
            max_clip_seconds: 30.0,
            encode_timeout_ms: 10_000,
            max_encoded_result_bytes: 24 * MB as usize,
            metadata_timeout_ms: 10_000,
        }
    }
}

impl MediaPolicy {
    pub fn encode_timeout(&self) -> Duration {
        Duration::from_millis(self.encode_timeout_ms)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }
}
