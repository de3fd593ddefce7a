//! Caller-owned state the orchestrator writes into.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::{Media, MediaKind};

/// Progress callback type for reporting ingestion progress.
///
/// Arguments: (file_name, files_done, files_total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Shared, append-only list of media attached to a form.
///
/// Clones share the same list, so overlapping ingest calls can append
/// to it concurrently.
#[derive(Debug, Clone, Default)]
pub struct MediaList {
    items: Arc<Mutex<Vec<Media>>>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&self, media: Media) {
        self.items.lock().push(media);
    }

    /// Remove the item at `index` (the form's "remove" button).
    pub fn remove(&self, index: usize) -> Option<Media> {
        let mut items = self.items.lock();
        (index < items.len()).then(|| items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Number of items of a given kind.
    pub fn count_of(&self, kind: MediaKind) -> usize {
        self.items.lock().iter().filter(|m| m.kind() == kind).count()
    }

    /// Copy of the current items.
    pub fn snapshot(&self) -> Vec<Media> {
        self.items.lock().clone()
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }
}

/// Single error message shown under a form field.
///
/// Setting a message replaces the previous one; messages never accumulate.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot {
    message: Arc<Mutex<Option<String>>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, message: impl Into<String>) {
        *self.message.lock() = Some(message.into());
    }

    pub fn clear(&self) {
        *self.message.lock() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.message.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.message.lock().is_some()
    }
}

/// What an ingest call writes into.
#[derive(Default)]
pub struct IngestContext {
    /// Encoded media attached so far.
    pub media: MediaList,
    /// Error message for the upload field.
    pub error: ErrorSlot,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl IngestContext {
    /// Create a context over existing caller state.
    pub fn new(media: MediaList, error: ErrorSlot) -> Self {
        Self {
            media,
            error,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, file_name: &str, done: usize, total: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback(file_name, done, total);
        }
    }
}

/// Summary of one ingest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Kind requested by the caller.
    pub kind: MediaKind,
    /// Files handed in.
    pub submitted: usize,
    /// Items appended to the media list.
    pub appended: usize,
    /// Message left in the error slot, if any.
    pub error: Option<String>,
}

impl IngestReport {
    pub fn new(kind: MediaKind, submitted: usize) -> Self {
        Self {
            kind,
            submitted,
            appended: 0,
            error: None,
        }
    }

    /// Submitted files that did not make it into the media list.
    pub fn rejected(&self) -> usize {
        self.submitted.saturating_sub(self.appended)
    }

    /// Every submitted file was appended without complaint.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.appended == self.submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EncodedMedia;

    fn photo() -> Media {
        Media::Photo {
            data: EncodedMedia::from_bytes("image/png", b"p"),
        }
    }

    #[test]
    fn clones_share_the_list() {
        let list = MediaList::new();
        let other = list.clone();
        other.push(photo());
        assert_eq!(list.len(), 1);
        assert_eq!(list.count_of(MediaKind::Photo), 1);
        assert_eq!(list.count_of(MediaKind::Video), 0);
    }

    #[test]
    fn remove_ignores_out_of_range() {
        let list = MediaList::new();
        list.push(photo());
        assert!(list.remove(3).is_none());
        assert!(list.remove(0).is_some());
        assert!(list.is_empty());
    }

    #[test]
    fn error_slot_replaces_message() {
        let slot = ErrorSlot::new();
        slot.set("first");
        slot.set("second");
        assert_eq!(slot.get().as_deref(), Some("second"));
        slot.clear();
        assert!(!slot.is_set());
    }

    #[test]
    fn progress_callback_is_invoked() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = IngestContext::default().with_progress_callback(Box::new(
            move |name: &str, done: usize, total: usize| {
                sink.lock().push(format!("{name} {done}/{total}"));
            },
        ));

        ctx.report_progress("a.png", 1, 2);
        assert_eq!(seen.lock().as_slice(), ["a.png 1/2".to_string()]);
    }

    #[test]
    fn report_counts_rejections() {
        let mut report = IngestReport::new(MediaKind::Photo, 3);
        report.appended = 2;
        assert_eq!(report.rejected(), 1);
        assert!(!report.is_clean());

        report.appended = 3;
        assert_eq!(report.rejected(), 0);
        assert!(report.is_clean());
    }
}
