//! Per-file byte ceilings.

use super::{partition, ValidationError, ValidationResult};
use crate::models::{MediaCandidate, MediaKind};

const MB: f64 = 1024.0 * 1024.0;

/// Partition `files` into those within `max_bytes` and the rest.
///
/// Files under the limit stay in `accepted` even when others are rejected.
pub fn validate_size(
    files: &[MediaCandidate],
    max_bytes: u64,
) -> ValidationResult<MediaCandidate> {
    check(files, max_bytes, "file(s)")
}

/// [`validate_size`] with the error worded for a media kind.
pub fn validate_size_for(
    kind: MediaKind,
    files: &[MediaCandidate],
    max_bytes: u64,
) -> ValidationResult<MediaCandidate> {
    let noun = match kind {
        MediaKind::Photo => "photo(s)",
        MediaKind::Video => "video(s)",
    };
    check(files, max_bytes, noun)
}

fn check(
    files: &[MediaCandidate],
    max_bytes: u64,
    noun: &'static str,
) -> ValidationResult<MediaCandidate> {
    let (accepted, rejected) = partition(files, |f| f.size() <= max_bytes);
    if rejected == 0 {
        return ValidationResult::ok(accepted);
    }

    tracing::debug!(
        "{} of {} file(s) over {} bytes",
        rejected,
        files.len(),
        max_bytes
    );
    ValidationResult::rejected(
        ValidationError::SizeLimitExceeded {
            count: rejected,
            noun,
            limit_mb: format_mb(max_bytes),
        },
        accepted,
    )
}

/// Render a byte count in MB, without decimals when it is a whole number.
pub fn format_mb(bytes: u64) -> String {
    let mb = bytes as f64 / MB;
    if mb.fract() == 0.0 {
        format!("{}", mb as u64)
    } else {
        format!("{:.1}", mb)
    }
}
