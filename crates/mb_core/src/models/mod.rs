//! Data models for Memory Book media.
//!
//! This module contains the core data structures used throughout the crate:
//! - Enums for media kinds
//! - Candidates, encoded media, and recorded blobs
//! - Trim windows and duration reports for videos
//! - The ingestion policy
//! - The memory payload sent to the persistence API

mod enums;
mod media;
mod memory;
mod policy;
mod trim;

// Re-export all public types
pub use enums::MediaKind;
pub use media::{
    ByteSource, DecodedMedia, EncodedMedia, FileSource, Media, MediaBlob, MediaCandidate,
    MemorySource,
};
pub use memory::{
    MemoryDraft, MemoryPayload, Music, PayloadError, COLOR_PALETTE, MAX_DESCRIPTION_CHARS,
    MAX_TITLE_CHARS,
};
pub use policy::MediaPolicy;
pub use trim::{DurationReport, TrimError, TrimWindow};
