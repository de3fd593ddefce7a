//! Pure, synchronous checks run before any encoding work.
//!
//! - `count`: collection size ceilings (fail the whole batch)
//! - `size`: per-file byte ceilings (partition the batch)
//! - `format`: supported extensions per media kind (partition the batch)
//!
//! None of these do I/O; calling them twice on the same input gives the
//! same answer.

mod count;
mod format;
mod size;

use thiserror::Error;

use crate::models::MediaKind;

pub use count::{validate_count, validate_count_for, validate_photo_limit};
pub use format::validate_format;
pub use size::{format_mb, validate_size, validate_size_for};

/// Reasons a batch (or part of it) was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("You can add at most {max} {noun} per memory!")]
    CountLimitExceeded { max: usize, noun: &'static str },

    #[error("{count} {noun} exceed the {limit_mb} MB limit and were not added!")]
    SizeLimitExceeded {
        count: usize,
        noun: &'static str,
        limit_mb: String,
    },

    #[error("{count} file(s) are not a supported {kind} format and were not added!")]
    UnsupportedFormat { count: usize, kind: MediaKind },

    #[error("Only one video can be added at a time (got {count})")]
    TooManyVideos { count: usize },
}

/// Outcome of a partitioning validator.
///
/// `valid()` is false exactly when an error is present; accepted items
/// stay usable either way.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult<T> {
    error: Option<ValidationError>,
    accepted: Vec<T>,
}

impl<T> ValidationResult<T> {
    /// Every item was accepted.
    pub fn ok(accepted: Vec<T>) -> Self {
        Self {
            error: None,
            accepted,
        }
    }

    /// Some items were rejected; `accepted` holds the rest.
    pub fn rejected(error: ValidationError, accepted: Vec<T>) -> Self {
        Self {
            error: Some(error),
            accepted,
        }
    }

    pub fn valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// User-facing error text, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn accepted(&self) -> &[T] {
        &self.accepted
    }

    pub fn into_parts(self) -> (Option<ValidationError>, Vec<T>) {
        (self.error, self.accepted)
    }
}

/// Split `items` by `keep`, preserving order.
fn partition<T: Clone>(items: &[T], keep: impl Fn(&T) -> bool) -> (Vec<T>, usize) {
    let accepted: Vec<T> = items.iter().filter(|&item| keep(item)).cloned().collect();
    let rejected = items.len() - accepted.len();
    (accepted, rejected)
}
