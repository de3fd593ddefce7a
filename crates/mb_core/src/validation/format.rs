//! Supported formats per media kind.

use super::{partition, ValidationError, ValidationResult};
use crate::models::{MediaCandidate, MediaKind};

/// Partition `files` into those `kind` supports and the rest.
///
/// The extension decides; files without one fall back to the declared MIME type.
pub fn validate_format(
    files: &[MediaCandidate],
    kind: MediaKind,
) -> ValidationResult<MediaCandidate> {
    let (accepted, rejected) = partition(files, |f| is_supported(f, kind));
    if rejected == 0 {
        return ValidationResult::ok(accepted);
    }
    ValidationResult::rejected(
        ValidationError::UnsupportedFormat {
            count: rejected,
            kind,
        },
        accepted,
    )
}

fn is_supported(file: &MediaCandidate, kind: MediaKind) -> bool {
    match file.extension() {
        Some(ext) => MediaKind::from_extension(&ext) == Some(kind),
        None => file.mime().starts_with(kind.mime_prefix()),
    }
}
