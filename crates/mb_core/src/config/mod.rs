//! Configuration management for Memory Book.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use mb_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! let policy = config.settings().policy();
//! println!("Up to {} photos per memory", policy.max_photos);
//!
//! config.settings_mut().policy.max_clip_seconds = 20.0;
//! config.update_section(ConfigSection::Policy).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PolicySettings, RecorderSettings, Settings, ToolSettings,
};
