//! Trim windows and duration reports for over-length videos.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for comparing second offsets coming from media players.
const EPSILON: f64 = 1e-6;

/// Reasons a trim window can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrimError {
    #[error("Trim bounds must be finite numbers")]
    NonFinite,

    #[error("Video duration {0} is not a positive number of seconds")]
    InvalidDuration(f64),

    #[error("Trim start {0:.2}s is before the beginning of the video")]
    NegativeStart(f64),

    #[error("Trim start {start:.2}s is after trim end {end:.2}s")]
    StartAfterEnd { start: f64, end: f64 },

    #[error("Trim length {length:.2}s exceeds the {max:.0}s clip limit")]
    TooLong { length: f64, max: f64 },

    #[error("Trim end {end:.2}s is past the end of the video ({total:.2}s)")]
    PastEnd { end: f64, total: f64 },
}

/// A user-chosen start/end pair bounding the kept segment of a video.
///
/// Always satisfies `0 <= start <= end`, `end - start <= max_clip`, and
/// `end <= total` for the duration and clip limit it was built against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    start_seconds: f64,
    end_seconds: f64,
}

impl TrimWindow {
    /// Build a window, rejecting bounds that break the invariants.
    pub fn new(start: f64, end: f64, total: f64, max_clip: f64) -> Result<Self, TrimError> {
        if !start.is_finite() || !end.is_finite() || !max_clip.is_finite() {
            return Err(TrimError::NonFinite);
        }
        check_total(total)?;
        if start < 0.0 {
            return Err(TrimError::NegativeStart(start));
        }
        if start > end {
            return Err(TrimError::StartAfterEnd { start, end });
        }
        if end - start > max_clip + EPSILON {
            return Err(TrimError::TooLong {
                length: end - start,
                max: max_clip,
            });
        }
        if end > total + EPSILON {
            return Err(TrimError::PastEnd { end, total });
        }

        Ok(Self {
            start_seconds: start,
            end_seconds: end.min(total),
        })
    }

    /// The initial window offered for a video: from zero up to the clip limit.
    pub fn suggest(total: f64, max_clip: f64) -> Result<Self, TrimError> {
        check_total(total)?;
        if !max_clip.is_finite() || max_clip <= 0.0 {
            return Err(TrimError::NonFinite);
        }
        Ok(Self {
            start_seconds: 0.0,
            end_seconds: total.min(max_clip),
        })
    }

    /// Slide the window to a new start, preserving its length.
    pub fn with_start(self, start: f64, total: f64) -> Result<Self, TrimError> {
        if !start.is_finite() {
            return Err(TrimError::NonFinite);
        }
        check_total(total)?;

        let length = self.length().min(total);
        let start = start.clamp(0.0, total - length);
        Ok(Self {
            start_seconds: start,
            end_seconds: start + length,
        })
    }

    pub fn start(&self) -> f64 {
        self.start_seconds
    }

    pub fn end(&self) -> f64 {
        self.end_seconds
    }

    /// Kept length in seconds.
    pub fn length(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

fn check_total(total: f64) -> Result<(), TrimError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(TrimError::InvalidDuration(total));
    }
    Ok(())
}

/// Result of probing a video candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationReport {
    /// Probed duration in seconds.
    pub seconds: f64,
    /// Whether the duration is usable as-is (finite, positive, within the ceiling).
    pub valid: bool,
}

impl DurationReport {
    /// Evaluate a probed duration against the clip ceiling.
    pub fn evaluate(seconds: f64, max_clip_seconds: f64) -> Self {
        let valid = is_playable(seconds) && seconds <= max_clip_seconds + EPSILON;
        Self { seconds, valid }
    }

    /// Whether the video is playable but longer than the ceiling.
    pub fn needs_trim(&self) -> bool {
        is_playable(self.seconds) && !self.valid
    }
}

fn is_playable(seconds: f64) -> bool {
    seconds.is_finite() && seconds > 0.0
}
