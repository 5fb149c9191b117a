// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline settings.
//!
//! Stored as RON next to the scene files and shared by the editing helpers
//! and the playback driver.

use crate::error::{Result, TimelineError};
use crate::playback::EndBehavior;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "timeline.ron";

/// Timeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Format version
    pub version: u32,
    /// Length of the timeline in seconds
    pub max_time: f32,
    /// Drag edits snap to multiples of this step (seconds)
    pub snap_step: f32,
    /// Shortest range an edge drag may leave on a durative command
    pub min_duration: f32,
    /// Fixed tick rate for headless playback (Hz)
    pub tick_rate: f32,
    /// Playback speed multiplier
    pub speed: f32,
    /// What playback does on reaching `max_time`
    pub end_behavior: EndBehavior,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            max_time: 10.0,
            snap_step: 0.05,
            min_duration: 0.05,
            tick_rate: 60.0,
            speed: 1.0,
            end_behavior: EndBehavior::default(),
        }
    }
}

impl TimelineSettings {
    /// Parse settings from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let settings: TimelineSettings = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(TimelineError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Duration of one fixed tick in seconds
    pub fn tick_seconds(&self) -> f32 {
        if self.tick_rate > 0.0 {
            1.0 / self.tick_rate
        } else {
            1.0 / 60.0
        }
    }
}
