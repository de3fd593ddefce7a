//! Collection size ceilings.

use super::ValidationError;
use crate::models::{Media, MediaCandidate, MediaKind};

/// Fail when `current + incoming` would exceed `max`.
pub fn validate_count(current: usize, incoming: usize, max: usize) -> Result<(), ValidationError> {
    check(current, incoming, max, "items")
}

/// [`validate_count`] with the error worded for a media kind.
pub fn validate_count_for(
    kind: MediaKind,
    current: usize,
    incoming: usize,
    max: usize,
) -> Result<(), ValidationError> {
    check(current, incoming, max, kind.plural())
}

/// Check that adding `new_files` keeps a memory within `max_photos`.
pub fn validate_photo_limit(
    current_photos: &[Media],
    new_files: &[MediaCandidate],
    max_photos: usize,
) -> Result<(), ValidationError> {
    validate_count_for(
        MediaKind::Photo,
        current_photos.len(),
        new_files.len(),
        max_photos,
    )
}

fn check(
    current: usize,
    incoming: usize,
    max: usize,
    noun: &'static str,
) -> Result<(), ValidationError> {
    if current.saturating_add(incoming) > max {
        return Err(ValidationError::CountLimitExceeded { max, noun });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EncodedMedia;

    #[test]
    fn fails_only_above_ceiling() {
        for current in 0..8 {
            for incoming in 0..8 {
                let result = validate_count(current, incoming, 6);
                assert_eq!(result.is_err(), current + incoming > 6);
            }
        }
    }

    #[test]
    fn photo_limit_names_the_ceiling() {
        let photo = Media::Photo {
            data: EncodedMedia::from_bytes("image/png", b"p"),
        };
        let current = vec![photo; 5];
        let new_files = vec![
            MediaCandidate::from_bytes("f1.png", "image/png", vec![1]),
            MediaCandidate::from_bytes("f2.png", "image/png", vec![2]),
        ];

        let err = validate_photo_limit(&current, &new_files, 6).unwrap_err();
        let message = err.to_string();
        assert!(message.contains('6'));
        assert!(message.contains("photos"));

        assert!(validate_photo_limit(&current, &new_files[..1], 6).is_ok());
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert!(validate_count(usize::MAX, 1, 6).is_err());
    }
}
