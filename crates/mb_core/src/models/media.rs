//! Media-related data structures (candidates, encoded media, recorded blobs).

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::enums::MediaKind;
use super::trim::TrimWindow;
use crate::encoding::{self, DataUrlResult};

/// Asynchronous source of a candidate's raw bytes.
///
/// Implemented for in-memory buffers and files on disk. Tests provide
/// stalled or failing sources to exercise the encoder's timeout and
/// read-error paths.
#[async_trait]
pub trait ByteSource: Send + Sync + fmt::Debug {
    /// Read the whole content.
    async fn read_all(&self) -> io::Result<Vec<u8>>;
}

/// Bytes already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource(Arc<[u8]>);

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }
}

/// Bytes read lazily from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ByteSource for FileSource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// A raw file selected by the user, not yet validated or encoded.
#[derive(Debug, Clone)]
pub struct MediaCandidate {
    /// File name as selected (used for extension routing and messages).
    name: String,
    /// Declared MIME type, or one guessed from the name when none was declared.
    mime: String,
    /// Byte length.
    size: u64,
    /// Where the bytes come from.
    source: Arc<dyn ByteSource>,
}

impl MediaCandidate {
    /// Create a candidate from in-memory bytes with an explicit MIME type.
    pub fn from_bytes(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes = bytes.into();
        let name = name.into();
        let mime = resolve_mime(&name, mime.into());
        Self {
            name,
            mime,
            size: bytes.len() as u64,
            source: Arc::new(MemorySource::new(bytes)),
        }
    }

    /// Create a candidate from in-memory bytes, guessing the MIME type from the name.
    pub fn from_bytes_guessed(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let mime = guess_mime(&name);
        Self::from_bytes(name, mime, bytes)
    }

    /// Create a candidate backed by a file on disk.
    ///
    /// Only the metadata is read here; the content is read by the encoder.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = guess_mime(&name);

        Ok(Self {
            name,
            mime,
            size: metadata.len(),
            source: Arc::new(FileSource::new(path)),
        })
    }

    /// Create a candidate over a custom byte source.
    pub fn with_source(
        name: impl Into<String>,
        mime: impl Into<String>,
        size: u64,
        source: Arc<dyn ByteSource>,
    ) -> Self {
        let name = name.into();
        let mime = resolve_mime(&name, mime.into());
        Self {
            name,
            mime,
            size,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Lowercase file extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Read the candidate's bytes.
    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        self.source.read_all().await
    }
}

/// Keep a declared MIME type; fall back to the name when it is blank.
fn resolve_mime(name: &str, declared: String) -> String {
    let declared = declared.trim();
    if declared.is_empty() {
        guess_mime(name)
    } else {
        declared.to_string()
    }
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Textual, embeddable representation of binary media (`data:` URL).
///
/// Immutable once produced. Serializes as a plain string so it can be
/// embedded directly in the memory payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedMedia(String);

impl EncodedMedia {
    /// Encode raw bytes into a base64 data URL.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(encoding::to_data_url(mime, bytes))
    }

    /// Wrap an existing data URL, checking its header.
    pub fn from_data_url(data_url: impl Into<String>) -> DataUrlResult<Self> {
        let data_url = data_url.into();
        encoding::split_data_url(&data_url)?;
        Ok(Self(data_url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the textual representation in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// MIME type declared in the data URL header.
    pub fn mime(&self) -> Option<&str> {
        encoding::split_data_url(&self.0).ok().map(|(mime, _)| mime)
    }

    /// Decode back into raw bytes.
    pub fn decode(&self) -> DataUrlResult<DecodedMedia> {
        encoding::parse_data_url(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads are large; only show the header.
        match encoding::split_data_url(&self.0) {
            Ok((mime, payload)) => write!(f, "data:{};base64,<{} chars>", mime, payload.len()),
            Err(_) => write!(f, "<invalid data url>"),
        }
    }
}

/// Raw bytes recovered from an [`EncodedMedia`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMedia {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedMedia {
    /// File extension derived from the MIME subtype.
    ///
    /// `image/jpeg` maps to `jpg`; a MIME type without a subtype maps to `bin`.
    pub fn extension(&self) -> String {
        let Some((_, subtype)) = self.mime.split_once('/') else {
            return "bin".to_string();
        };
        let subtype = subtype
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match subtype.as_str() {
            "" => "bin".to_string(),
            "jpeg" => "jpg".to_string(),
            _ => subtype,
        }
    }
}

/// Media produced by the segment recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlob {
    /// Container MIME type of the capture.
    pub mime: String,
    /// Assembled bytes.
    pub bytes: Vec<u8>,
    /// Wall-clock seconds the capture ran. This is the length of the capture
    /// window, not a measurement of the blob's playback length.
    pub capture_wall_seconds: f64,
}

impl MediaBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Turn the blob into a candidate so it can go through the encoder.
    pub fn into_candidate(self, name: impl Into<String>) -> MediaCandidate {
        MediaCandidate::from_bytes(name, self.mime, self.bytes)
    }
}

/// Media attached to a memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Media {
    Photo {
        data: EncodedMedia,
    },
    Video {
        data: EncodedMedia,
    },
    /// A video cut down to a trim window before encoding.
    TrimmedVideo {
        data: EncodedMedia,
        window: TrimWindow,
    },
}

impl Media {
    pub fn kind(&self) -> MediaKind {
        match self {
            Media::Photo { .. } => MediaKind::Photo,
            Media::Video { .. } | Media::TrimmedVideo { .. } => MediaKind::Video,
        }
    }

    pub fn encoded(&self) -> &EncodedMedia {
        match self {
            Media::Photo { data } | Media::Video { data } | Media::TrimmedVideo { data, .. } => {
                data
            }
        }
    }

    pub fn trim_window(&self) -> Option<&TrimWindow> {
        match self {
            Media::TrimmedVideo { window, .. } => Some(window),
            _ => None,
        }
    }
}
