//! Duration probing using `ffprobe`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::temp_handle::TempMediaFile;
use super::{DurationProbe, ProbeError, ProbeResult};
use crate::models::MediaCandidate;

/// Probe that asks `ffprobe` for the container duration.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    /// Path or name of the ffprobe executable.
    program: PathBuf,
    /// How long to wait for metadata.
    metadata_timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new(program: impl Into<PathBuf>, metadata_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            metadata_timeout,
        }
    }

    /// Probe a file that is already on disk.
    pub async fn probe_path(&self, name: &str, path: &Path) -> ProbeResult<f64> {
        let tool = self.program.display().to_string();

        let mut cmd = Command::new(&self.program);
        cmd.arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("json")
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!("Running {}: {:?}", tool, cmd);

        let output = tokio::time::timeout(self.metadata_timeout, cmd.output())
            .await
            .map_err(|_| ProbeError::MetadataTimeout {
                name: name.to_string(),
                timeout_ms: self.metadata_timeout.as_millis() as u64,
            })?
            .map_err(|e| ProbeError::Spawn {
                tool: tool.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::CommandFailed {
                tool,
                exit_code: output.status.code().unwrap_or(-1),
                message: stderr.trim().to_string(),
            });
        }

        let json: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ProbeError::unreadable(name, format!("bad {} output: {}", tool, e)))?;

        parse_ffprobe_duration(&json)
            .ok_or_else(|| ProbeError::unreadable(name, "container reports no duration"))
    }
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new("ffprobe", Duration::from_secs(10))
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe_duration(&self, candidate: &MediaCandidate) -> ProbeResult<f64> {
        // Released when `handle` drops, whichever way this returns.
        let handle = TempMediaFile::materialize(candidate)
            .await
            .map_err(|e| ProbeError::io("materializing temporary media", e))?;

        self.probe_path(candidate.name(), handle.path()).await
    }
}

/// Extract `format.duration` from `ffprobe -of json` output.
///
/// ffprobe prints the duration as a string; `"N/A"` and missing values
/// yield `None`.
pub fn parse_ffprobe_duration(json: &Value) -> Option<f64> {
    let duration = json.get("format")?.get("duration")?;
    match duration {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .filter(|d| d.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_duration() {
        let out = json!({ "format": { "duration": "45.021000" } });
        assert_eq!(parse_ffprobe_duration(&out), Some(45.021));
    }

    #[test]
    fn parses_numeric_duration() {
        let out = json!({ "format": { "duration": 12.5 } });
        assert_eq!(parse_ffprobe_duration(&out), Some(12.5));
    }

    #[test]
    fn missing_or_unknown_duration_is_none() {
        assert_eq!(parse_ffprobe_duration(&json!({})), None);
        assert_eq!(
            parse_ffprobe_duration(&json!({ "format": { "duration": "N/A" } })),
            None
        );
        assert_eq!(
            parse_ffprobe_duration(&json!({ "format": { "duration": "inf" } })),
            None
        );
    }

    #[tokio::test]
    async fn missing_tool_is_a_spawn_error() {
        let probe = FfprobeDurationProbe::new(
            "/nonexistent/definitely-not-ffprobe",
            Duration::from_secs(5),
        );
        let candidate = MediaCandidate::from_bytes("clip.mp4", "video/mp4", vec![0u8; 8]);
        let err = probe.probe_duration(&candidate).await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
