//! Test doubles shared by the unit tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::{ByteSource, MediaCandidate, TrimWindow};
use crate::orchestrator::{RecorderFactory, TrimPrompt};
use crate::probe::{DurationProbe, ProbeError, ProbeResult};
use crate::recorder::{CaptureSink, HandleError, PlaybackHandle};

/// Byte source that never finishes, or finishes after a delay.
#[derive(Debug)]
pub struct StalledSource {
    delay: Option<Duration>,
}

impl StalledSource {
    pub fn forever() -> Self {
        Self { delay: None }
    }

    pub fn after(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }
}

#[async_trait]
impl ByteSource for StalledSource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        match self.delay {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                Ok(vec![0u8; 10])
            }
            None => std::future::pending().await,
        }
    }
}

/// Byte source whose read always fails.
#[derive(Debug)]
pub struct FailingSource;

#[async_trait]
impl ByteSource for FailingSource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt file"))
    }
}

/// Probe returning a fixed duration, or failing.
#[derive(Debug)]
pub struct FakeProbe {
    seconds: Option<f64>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn seconds(seconds: f64) -> Self {
        Self {
            seconds: Some(seconds),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            seconds: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurationProbe for FakeProbe {
    async fn probe_duration(&self, candidate: &MediaCandidate) -> ProbeResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seconds
            .ok_or_else(|| ProbeError::unreadable(candidate.name(), "no video stream"))
    }
}

/// What a [`FakePlayback`] was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackLog {
    pub seeked_to: Option<f64>,
    pub muted: bool,
    pub played: bool,
    pub paused: bool,
    pub releases: usize,
}

#[derive(Debug, Clone)]
enum Metadata {
    Ready,
    Fails(HandleError),
    Stalls,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Capture {
    Chunks,
    Empty,
    Unsupported,
}

/// Scriptable playback handle.
///
/// Clones share one log, so a handle handed out by [`FakeRecorders`] can
/// still be inspected through the template.
#[derive(Debug, Clone)]
pub struct FakePlayback {
    total: f64,
    metadata: Metadata,
    seek_error: Option<HandleError>,
    capture: Capture,
    log: Arc<Mutex<PlaybackLog>>,
}

impl FakePlayback {
    pub fn new(total: f64) -> Self {
        Self {
            total,
            metadata: Metadata::Ready,
            seek_error: None,
            capture: Capture::Chunks,
            log: Arc::new(Mutex::new(PlaybackLog::default())),
        }
    }

    pub fn with_metadata_error(mut self, error: HandleError) -> Self {
        self.metadata = Metadata::Fails(error);
        self
    }

    pub fn with_stalled_metadata(mut self) -> Self {
        self.metadata = Metadata::Stalls;
        self
    }

    pub fn with_seek_error(mut self, error: HandleError) -> Self {
        self.seek_error = Some(error);
        self
    }

    pub fn without_capture(mut self) -> Self {
        self.capture = Capture::Unsupported;
        self
    }

    pub fn with_empty_capture(mut self) -> Self {
        self.capture = Capture::Empty;
        self
    }

    pub fn log(&self) -> PlaybackLog {
        self.log.lock().clone()
    }
}

#[async_trait]
impl PlaybackHandle for FakePlayback {
    async fn wait_for_metadata(&mut self) -> Result<f64, HandleError> {
        match &self.metadata {
            Metadata::Ready => Ok(self.total),
            Metadata::Fails(e) => Err(e.clone()),
            Metadata::Stalls => std::future::pending().await,
        }
    }

    async fn seek(&mut self, seconds: f64) -> Result<(), HandleError> {
        if let Some(e) = &self.seek_error {
            return Err(e.clone());
        }
        self.log.lock().seeked_to = Some(seconds);
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.lock().muted = muted;
    }

    async fn play(&mut self) -> Result<(), HandleError> {
        self.log.lock().played = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.log.lock().paused = true;
    }

    fn capture_stream(&mut self) -> Option<Box<dyn CaptureSink>> {
        let chunks = match self.capture {
            Capture::Unsupported => return None,
            Capture::Empty => Vec::new(),
            Capture::Chunks => vec![vec![0x1a, 0x45, 0xdf, 0xa3], vec![0x42, 0x86, 0x81]],
        };
        Some(Box::new(FakeCapture { chunks }))
    }

    fn release(&mut self) {
        self.log.lock().releases += 1;
    }
}

struct FakeCapture {
    chunks: Vec<Vec<u8>>,
}

#[async_trait]
impl CaptureSink for FakeCapture {
    fn mime(&self) -> &str {
        "video/webm"
    }

    async fn start(&mut self) -> Result<(), HandleError> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<Vec<Vec<u8>>, HandleError> {
        Ok(std::mem::take(&mut self.chunks))
    }
}

/// Recorder factory handing out clones of a template handle.
pub struct FakeRecorders {
    template: FakePlayback,
}

impl FakeRecorders {
    pub fn new(template: FakePlayback) -> Self {
        Self { template }
    }
}

#[async_trait]
impl RecorderFactory for FakeRecorders {
    async fn open(
        &self,
        _candidate: &MediaCandidate,
    ) -> Result<Box<dyn PlaybackHandle>, HandleError> {
        Ok(Box::new(self.template.clone()))
    }
}

/// Trim prompt with a canned answer that remembers what it was offered.
pub struct ScriptedPrompt {
    answer: Answer,
    offered: Mutex<Option<TrimWindow>>,
}

enum Answer {
    Accept,
    Decline,
    Window(TrimWindow),
}

impl ScriptedPrompt {
    pub fn accept() -> Self {
        Self::with_answer(Answer::Accept)
    }

    pub fn decline() -> Self {
        Self::with_answer(Answer::Decline)
    }

    /// Answer with a fixed window, whatever the video's bounds.
    pub fn respond(start: f64, end: f64) -> Self {
        let window = TrimWindow::new(start, end, f64::MAX, f64::MAX).expect("ordered window");
        Self::with_answer(Answer::Window(window))
    }

    fn with_answer(answer: Answer) -> Self {
        Self {
            answer,
            offered: Mutex::new(None),
        }
    }

    pub fn offered(&self) -> Option<TrimWindow> {
        *self.offered.lock()
    }
}

#[async_trait]
impl TrimPrompt for ScriptedPrompt {
    async fn confirm(
        &self,
        _name: &str,
        _total_seconds: f64,
        suggested: TrimWindow,
    ) -> Option<TrimWindow> {
        *self.offered.lock() = Some(suggested);
        match self.answer {
            Answer::Accept => Some(suggested),
            Answer::Decline => None,
            Answer::Window(window) => Some(window),
        }
    }
}
