//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::MediaPolicy;

const MB: f64 = 1024.0 * 1024.0;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Ingestion limits.
    #[serde(default)]
    pub policy: PolicySettings,

    /// Trim and recording behavior.
    #[serde(default)]
    pub recorder: RecorderSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// The ingestion policy described by the `[policy]` section.
    pub fn policy(&self) -> MediaPolicy {
        let p = &self.policy;
        MediaPolicy {
            max_photo_bytes: mb_to_bytes(p.max_photo_mb),
            max_photos: p.max_photos,
            max_video_bytes: mb_to_bytes(p.max_video_mb),
            max_clip_seconds: p.max_clip_seconds,
            encode_timeout_ms: p.encode_timeout_ms,
            max_encoded_result_bytes: mb_to_bytes(p.max_encoded_mb) as usize,
            metadata_timeout_ms: p.metadata_timeout_ms,
        }
    }
}

fn mb_to_bytes(mb: f64) -> u64 {
    if mb.is_finite() && mb > 0.0 {
        (mb * MB).round() as u64
    } else {
        0
    }
}

/// Ingestion limits, in user-facing units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Largest accepted photo, in MB.
    #[serde(default = "default_max_photo_mb")]
    pub max_photo_mb: f64,

    /// Most photos per memory.
    #[serde(default = "default_max_photos")]
    pub max_photos: usize,

    /// Largest accepted video, in MB.
    #[serde(default = "default_max_video_mb")]
    pub max_video_mb: f64,

    /// Longest kept video clip, in seconds.
    #[serde(default = "default_max_clip_seconds")]
    pub max_clip_seconds: f64,

    /// Time budget for encoding one file.
    #[serde(default = "default_timeout_ms")]
    pub encode_timeout_ms: u64,

    /// Ceiling on an encoded file, in MB.
    #[serde(default = "default_max_encoded_mb")]
    pub max_encoded_mb: f64,

    /// Time budget for reading video metadata.
    #[serde(default = "default_timeout_ms")]
    pub metadata_timeout_ms: u64,
}

fn default_max_photo_mb() -> f64 {
    3.0
}

fn default_max_photos() -> usize {
    6
}

fn default_max_video_mb() -> f64 {
    16.0
}

fn default_max_clip_seconds() -> f64 {
    30.0
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_encoded_mb() -> f64 {
    24.0
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            max_photo_mb: default_max_photo_mb(),
            max_photos: default_max_photos(),
            max_video_mb: default_max_video_mb(),
            max_clip_seconds: default_max_clip_seconds(),
            encode_timeout_ms: default_timeout_ms(),
            max_encoded_mb: default_max_encoded_mb(),
            metadata_timeout_ms: default_timeout_ms(),
        }
    }
}

/// What to do with videos over the clip limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderSettings {
    /// Trim over-length videos instead of rejecting them.
    #[serde(default = "default_true")]
    pub auto_trim: bool,

    /// Where the trim window starts, in seconds.
    #[serde(default)]
    pub trim_start_seconds: f64,
}

fn default_true() -> bool {
    true
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            auto_trim: true,
            trim_start_seconds: 0.0,
        }
    }
}

/// Paths of the FFmpeg tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffprobe_path: default_ffprobe(),
            ffmpeg_path: default_ffmpeg(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write a daily log file.
    #[serde(default)]
    pub log_to_file: bool,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            log_to_file: false,
            logs_folder: default_logs_folder(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Policy,
    Recorder,
    Tools,
    Logging,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Policy,
        ConfigSection::Recorder,
        ConfigSection::Tools,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Policy => "policy",
            ConfigSection::Recorder => "recorder",
            ConfigSection::Tools => "tools",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section.
    pub(crate) fn description(&self) -> &'static str {
        match self {
            ConfigSection::Policy => "Upload limits",
            ConfigSection::Recorder => "Trimming of videos over the clip limit",
            ConfigSection::Tools => "FFmpeg tool locations",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[policy]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("max_photo_mb"));
    }

    #[test]
    fn default_policy_matches_media_policy() {
        assert_eq!(Settings::default().policy(), MediaPolicy::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[policy]\nmax_photos = 10";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.policy.max_photos, 10);
        assert_eq!(parsed.policy.max_clip_seconds, 30.0);
        assert_eq!(parsed.tools.ffmpeg_path, "ffmpeg");
        assert!(parsed.recorder.auto_trim);
    }

    #[test]
    fn fractional_megabytes_convert() {
        let mut settings = Settings::default();
        settings.policy.max_photo_mb = 1.5;
        settings.policy.max_video_mb = -1.0;
        let policy = settings.policy();
        assert_eq!(policy.max_photo_bytes, 1024 * 1024 + 512 * 1024);
        assert_eq!(policy.max_video_bytes, 0);
    }

    #[test]
    fn log_level_is_lowercase() {
        let parsed: Settings = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(parsed.logging.level, LogLevel::Debug);
    }
}
