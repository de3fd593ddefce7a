//! Core enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// Kind of media a user can attach to a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// File extensions accepted for this kind (lowercase, no dot).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Photo => &["png", "jpg", "jpeg", "gif", "webp"],
            MediaKind::Video => &["mp4", "mov", "avi", "webm", "mkv", "m4v"],
        }
    }

    /// Top-level MIME type for this kind.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaKind::Photo => "image/",
            MediaKind::Video => "video/",
        }
    }

    /// Route a file extension to a media kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [MediaKind::Photo, MediaKind::Video]
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }

    /// Plural noun used in user-facing messages.
    pub fn plural(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Video => "videos",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_extensions_case_insensitively() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Photo));
        assert_eq!(MediaKind::from_extension("webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("pdf"), None);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&MediaKind::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }
}
