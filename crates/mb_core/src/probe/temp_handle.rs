//! Temporary on-disk handle for a candidate's bytes.

use std::io;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

use crate::models::MediaCandidate;

/// A candidate materialised as a temporary file so external tools can open it.
///
/// The file is deleted when the handle is dropped, so every exit path
/// (success, error, or a dropped future) releases it.
#[derive(Debug)]
pub struct TempMediaFile {
    file: NamedTempFile,
}

impl TempMediaFile {
    /// Write the candidate's bytes into a fresh temporary file.
    ///
    /// The file keeps the candidate's extension so tools can sniff the container.
    pub async fn materialize(candidate: &MediaCandidate) -> io::Result<Self> {
        let bytes = candidate.read_bytes().await?;
        Self::from_bytes(&bytes, candidate.extension().as_deref()).await
    }

    /// Write raw bytes into a fresh temporary file.
    pub async fn from_bytes(bytes: &[u8], extension: Option<&str>) -> io::Result<Self> {
        let suffix = extension.map(|e| format!(".{}", e)).unwrap_or_default();
        let file = Builder::new().prefix("mb-media-").suffix(&suffix).tempfile()?;
        tokio::fs::write(file.path(), bytes).await?;
        tracing::trace!("Acquired temporary handle {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for TempMediaFile {
    fn drop(&mut self) {
        tracing::trace!("Releasing temporary handle {}", self.file.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_is_removed_on_drop() {
        let candidate = MediaCandidate::from_bytes("clip.webm", "video/webm", b"abc".to_vec());
        let handle = TempMediaFile::materialize(&candidate).await.unwrap();
        let path = handle.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("webm"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");

        drop(handle);
        assert!(!path.exists());
    }
}
