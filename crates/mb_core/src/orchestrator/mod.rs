//! Ingestion orchestrator.
//!
//! Ties the validators, encoder, probe and recorder together for a batch
//! of files picked by the user. Results land in caller-owned state
//! ([`MediaList`] and [`ErrorSlot`]) rather than being returned, so a
//! form can render whatever the batch produced.

mod errors;
mod ingest;
mod trim;
mod types;

pub use errors::{IngestError, IngestResult};
pub use ingest::IngestionOrchestrator;
pub use trim::{AcceptSuggested, FfmpegRecorderFactory, RecorderFactory, StartAt, TrimPrompt};
pub use types::{ErrorSlot, IngestContext, IngestReport, MediaList, ProgressCallback};
