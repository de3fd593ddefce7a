//! Timeout-bounded encoding of candidates into data URLs.

use std::io;
use std::time::Duration;

use thiserror::Error;

use super::data_url::{data_url_len, to_data_url};
use crate::models::{EncodedMedia, MediaCandidate, MediaPolicy};

/// Errors from encoding a single candidate.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The bytes could not be read (corrupt file, aborted read).
    #[error("Failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The read did not finish before the timer fired.
    #[error("Timed out after {timeout_ms} ms while encoding '{name}'")]
    Timeout { name: String, timeout_ms: u64 },

    /// The encoded text is larger than allowed.
    #[error("Encoded '{name}' would be {size} bytes, over the {limit} byte limit")]
    ResultTooLarge {
        name: String,
        size: usize,
        limit: usize,
    },
}

impl EncodeError {
    pub fn read(name: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            name: name.into(),
            source,
        }
    }

    pub fn timeout(name: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            name: name.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn result_too_large(name: impl Into<String>, size: usize, limit: usize) -> Self {
        Self::ResultTooLarge {
            name: name.into(),
            size,
            limit,
        }
    }
}

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Encoder that races each read against a timer.
#[derive(Debug, Clone, Copy)]
pub struct TimedEncoder {
    timeout: Duration,
    max_result_bytes: usize,
}

impl TimedEncoder {
    pub fn new(timeout: Duration, max_result_bytes: usize) -> Self {
        Self {
            timeout,
            max_result_bytes,
        }
    }

    /// Build an encoder from the policy's timeout and result ceiling.
    pub fn from_policy(policy: &MediaPolicy) -> Self {
        Self::new(policy.encode_timeout(), policy.max_encoded_result_bytes)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_result_bytes(&self) -> usize {
        self.max_result_bytes
    }

    /// Encode a candidate.
    ///
    /// Produces exactly one of the encoded media or an error. The timer
    /// covers both the read and the base64 pass; when it wins, the pending
    /// work is dropped and its result is never observed.
    pub async fn encode(&self, candidate: &MediaCandidate) -> EncodeResult<EncodedMedia> {
        encode(candidate, self.timeout, self.max_result_bytes).await
    }
}

/// Encode a candidate within `timeout`, rejecting results over `max_result_bytes`.
pub async fn encode(
    candidate: &MediaCandidate,
    timeout: Duration,
    max_result_bytes: usize,
) -> EncodeResult<EncodedMedia> {
    let name = candidate.name();
    tracing::debug!(
        "Encoding '{}' ({} bytes, timeout {:?})",
        name,
        candidate.size(),
        timeout
    );

    // Read and base64 encoding share one deadline.
    let work = async {
        let bytes = candidate
            .read_bytes()
            .await
            .map_err(|e| EncodeError::read(name, e))?;

        let size = data_url_len(candidate.mime(), bytes.len());
        if size > max_result_bytes {
            return Err(EncodeError::result_too_large(name, size, max_result_bytes));
        }

        let mime = candidate.mime().to_string();
        let data_url = tokio::task::spawn_blocking(move || to_data_url(&mime, &bytes))
            .await
            .map_err(|e| EncodeError::read(name, io::Error::other(e)))?;
        Ok::<_, EncodeError>(data_url)
    };

    let data_url = tokio::time::timeout(timeout, work).await.map_err(|_| {
        tracing::warn!("Encoding '{}' timed out after {:?}", name, timeout);
        EncodeError::timeout(name, timeout)
    })??;

    let encoded = EncodedMedia::from_data_url(data_url)
        .map_err(|e| EncodeError::read(name, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    tracing::debug!("Encoded '{}' into {} chars", name, encoded.len());
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingSource, StalledSource};
    use std::sync::Arc;
    use tokio::time::Instant;

    const MB: usize = 1024 * 1024;

    #[tokio::test]
    async fn encodes_two_megabyte_image_under_ceiling() {
        let candidate = MediaCandidate::from_bytes("big.png", "image/png", vec![0xAB; 2 * MB]);
        let encoded = encode(&candidate, Duration::from_millis(15_000), 10 * MB)
            .await
            .unwrap();

        assert!(encoded.len() < 10 * MB);
        assert!(encoded.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(encoded.decode().unwrap().bytes.len(), 2 * MB);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_read_times_out_at_the_deadline() {
        let candidate = MediaCandidate::with_source(
            "stuck.jpg",
            "image/jpeg",
            10,
            Arc::new(StalledSource::forever()),
        );
        let started = Instant::now();

        let err = encode(&candidate, Duration::from_millis(1), MB)
            .await
            .unwrap_err();

        assert!(matches!(err, EncodeError::Timeout { timeout_ms: 1, .. }));
        assert!(started.elapsed() < Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_read_loses_to_timer() {
        let candidate = MediaCandidate::with_source(
            "slow.jpg",
            "image/jpeg",
            10,
            Arc::new(StalledSource::after(Duration::from_secs(60))),
        );
        let started = Instant::now();

        let err = encode(&candidate, Duration::from_millis(500), MB)
            .await
            .unwrap_err();

        assert!(matches!(err, EncodeError::Timeout { .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn read_failure_is_reported() {
        let candidate =
            MediaCandidate::with_source("bad.png", "image/png", 10, Arc::new(FailingSource));
        let err = encode(&candidate, Duration::from_secs(1), MB)
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::Read { .. }));
    }

    #[tokio::test]
    async fn bloated_result_is_rejected() {
        let candidate = MediaCandidate::from_bytes("a.gif", "image/gif", vec![1u8; 900]);
        let err = encode(&candidate, Duration::from_secs(1), 1000)
            .await
            .unwrap_err();
        match err {
            EncodeError::ResultTooLarge { size, limit, .. } => {
                assert!(size > 1000);
                assert_eq!(limit, 1000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn blank_mime_encodes_with_guessed_type() {
        let candidate = MediaCandidate::from_bytes("beach.jpg", "", vec![7u8; 10]);
        let encoded = encode(&candidate, Duration::from_secs(1), MB)
            .await
            .unwrap();
        assert_eq!(encoded.mime(), Some("image/jpeg"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn large_encode_leaves_runtime_responsive() {
        let candidate = MediaCandidate::from_bytes("clip.mp4", "video/mp4", vec![3u8; 16 * MB]);
        let ticker = tokio::spawn(async {
            tokio::task::yield_now().await;
            true
        });

        let encoded = TimedEncoder::new(Duration::from_secs(30), 24 * MB)
            .encode(&candidate)
            .await
            .unwrap();

        assert!(ticker.is_finished());
        assert_eq!(encoded.decode().unwrap().bytes.len(), 16 * MB);
    }

    #[test]
    fn from_policy_uses_policy_limits() {
        let policy = MediaPolicy::default();
        let encoder = TimedEncoder::from_policy(&policy);
        assert_eq!(encoder.timeout(), Duration::from_millis(10_000));
        assert_eq!(encoder.max_result_bytes(), 24 * MB);
    }
}
