//! Orchestrator that runs a batch of files through the ingestion stages.

use std::sync::Arc;

use super::errors::{IngestError, IngestResult};
use super::trim::{AcceptSuggested, FfmpegRecorderFactory, RecorderFactory, TrimPrompt};
use super::types::{IngestContext, IngestReport};
use crate::encoding::TimedEncoder;
use crate::models::{Media, MediaCandidate, MediaKind, MediaPolicy, TrimWindow};
use crate::probe::{probe_report, DurationProbe, FfprobeDurationProbe};
use crate::recorder::SegmentRecorder;
use crate::validation::{validate_count_for, validate_format, validate_size_for, ValidationError};

/// Runs a batch of files from the user into the caller's media list.
///
/// Stages, in order:
/// 1. Count ceiling (photos) or single-file rule (videos)
/// 2. Format gate, then size ceiling; rejected files are dropped with a message
/// 3. Photos: encode each in order, stopping at the first failure
/// 4. Video: probe, then encode directly or trim, record, and encode
///
/// Every failure ends up as a message in the context's error slot; nothing
/// is returned as an error.
pub struct IngestionOrchestrator {
    policy: MediaPolicy,
    encoder: TimedEncoder,
    probe: Arc<dyn DurationProbe>,
    recorders: Arc<dyn RecorderFactory>,
    prompt: Arc<dyn TrimPrompt>,
}

impl IngestionOrchestrator {
    /// Create an orchestrator backed by FFmpeg tools on `PATH`.
    pub fn new(policy: MediaPolicy) -> Self {
        let probe = FfprobeDurationProbe::new("ffprobe", policy.metadata_timeout());
        Self {
            encoder: TimedEncoder::from_policy(&policy),
            probe: Arc::new(probe.clone()),
            recorders: Arc::new(FfmpegRecorderFactory::new("ffmpeg", probe)),
            prompt: Arc::new(AcceptSuggested),
            policy,
        }
    }

    /// Replace the duration probe (builder pattern).
    pub fn with_probe(mut self, probe: Arc<dyn DurationProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the recorder factory (builder pattern).
    pub fn with_recorders(mut self, recorders: Arc<dyn RecorderFactory>) -> Self {
        self.recorders = recorders;
        self
    }

    /// Replace the trim prompt (builder pattern).
    pub fn with_prompt(mut self, prompt: Arc<dyn TrimPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }

    /// Ingest `files` as `kind`.
    ///
    /// Clears the error slot first. Appends every item that makes it
    /// through to `ctx.media`; the first message that stops the batch (or
    /// the last non-fatal rejection) is left in `ctx.error`.
    pub async fn ingest(
        &self,
        files: Vec<MediaCandidate>,
        kind: MediaKind,
        ctx: &IngestContext,
    ) -> IngestReport {
        ctx.error.clear();
        let mut report = IngestReport::new(kind, files.len());
        if files.is_empty() {
            return report;
        }

        tracing::info!("Ingesting {} {} file(s)", files.len(), kind);

        let outcome = match kind {
            MediaKind::Photo => self.ingest_photos(files, ctx, &mut report).await,
            MediaKind::Video => self.ingest_video(files, ctx, &mut report).await,
        };

        if let Err(e) = outcome {
            tracing::warn!("Ingest stopped: {}", e);
            self.surface(ctx, &mut report, e.user_message());
        }

        tracing::info!(
            "Ingest finished: {}/{} {} appended, {} rejected",
            report.appended,
            report.submitted,
            kind.plural(),
            report.rejected()
        );
        report
    }

    async fn ingest_photos(
        &self,
        files: Vec<MediaCandidate>,
        ctx: &IngestContext,
        report: &mut IngestReport,
    ) -> IngestResult<()> {
        let current = ctx.media.count_of(MediaKind::Photo);
        validate_count_for(MediaKind::Photo, current, files.len(), self.policy.max_photos)?;

        let accepted = self.screen(&files, MediaKind::Photo, ctx, report);
        let total = accepted.len();

        for (i, candidate) in accepted.iter().enumerate() {
            let data = self.encoder.encode(candidate).await?;
            ctx.media.push(Media::Photo { data });
            report.appended += 1;
            ctx.report_progress(candidate.name(), i + 1, total);
        }
        Ok(())
    }

    async fn ingest_video(
        &self,
        files: Vec<MediaCandidate>,
        ctx: &IngestContext,
        report: &mut IngestReport,
    ) -> IngestResult<()> {
        if files.len() > 1 {
            return Err(ValidationError::TooManyVideos { count: files.len() }.into());
        }

        let accepted = self.screen(&files, MediaKind::Video, ctx, report);
        let Some(candidate) = accepted.into_iter().next() else {
            return Ok(());
        };

        let max_clip = self.policy.max_clip_seconds;
        let duration = probe_report(self.probe.as_ref(), &candidate, max_clip).await?;

        let media = if duration.valid {
            let data = self.encoder.encode(&candidate).await?;
            Media::Video { data }
        } else {
            self.trim_and_record(&candidate, duration.seconds).await?
        };

        ctx.media.push(media);
        report.appended += 1;
        ctx.report_progress(candidate.name(), 1, 1);
        Ok(())
    }

    /// Ask for a window, record it, and encode the recording.
    async fn trim_and_record(
        &self,
        candidate: &MediaCandidate,
        total_seconds: f64,
    ) -> IngestResult<Media> {
        let max_clip = self.policy.max_clip_seconds;
        let suggested = TrimWindow::suggest(total_seconds, max_clip)?;
        tracing::info!(
            "'{}' is {:.2}s, over the {:.0}s limit; suggesting {:.2}-{:.2}s",
            candidate.name(),
            total_seconds,
            max_clip,
            suggested.start(),
            suggested.end()
        );

        let chosen = self
            .prompt
            .confirm(candidate.name(), total_seconds, suggested)
            .await
            .ok_or_else(|| IngestError::trim_declined(candidate.name(), max_clip))?;
        let window = TrimWindow::new(chosen.start(), chosen.end(), total_seconds, max_clip)?;

        let mut handle = self
            .recorders
            .open(candidate)
            .await
            .map_err(|e| IngestError::playback_open(candidate.name(), e.to_string()))?;

        let recorder = SegmentRecorder::from_policy(&self.policy);
        let blob = recorder
            .record_segment(handle.as_mut(), window.start(), window.length())
            .await?;

        let recorded = blob.into_candidate(trimmed_name(candidate.name()));
        let data = self.encoder.encode(&recorded).await?;
        Ok(Media::TrimmedVideo { data, window })
    }

    /// Run the format gate and size ceiling, surfacing rejections without stopping.
    fn screen(
        &self,
        files: &[MediaCandidate],
        kind: MediaKind,
        ctx: &IngestContext,
        report: &mut IngestReport,
    ) -> Vec<MediaCandidate> {
        let (format_error, supported) = validate_format(files, kind).into_parts();
        if let Some(e) = format_error {
            self.surface(ctx, report, e.to_string());
        }

        let max_bytes = match kind {
            MediaKind::Photo => self.policy.max_photo_bytes,
            MediaKind::Video => self.policy.max_video_bytes,
        };
        let (size_error, accepted) = validate_size_for(kind, &supported, max_bytes).into_parts();
        if let Some(e) = size_error {
            self.surface(ctx, report, e.to_string());
        }
        accepted
    }

    fn surface(&self, ctx: &IngestContext, report: &mut IngestReport, message: String) {
        tracing::debug!("Surfacing: {}", message);
        ctx.error.set(message.clone());
        report.error = Some(message);
    }
}

/// Name given to a recorded segment: the source stem plus `-trimmed.webm`.
fn trimmed_name(original: &str) -> String {
    let stem = original
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(original);
    format!("{}-trimmed.webm", stem)
}
