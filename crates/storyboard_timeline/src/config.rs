// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline configuration.
//!
//! Every tunable constant of the timeline lives here:
//! - Axis geometry (label column, base scale, trailing padding)
//! - Gesture tolerances (magnet threshold, minimum scene duration)
//! - Auto-scroll and playhead tuning
//! - Zoom range
//!
//! Settings are stored as RON and fall back to defaults when no file exists.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing the settings failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer version
    #[error("Unsupported config version {found} (max {CONFIG_FORMAT_VERSION})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
    },

    /// A value is out of its valid range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Tunable timeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Format version
    pub version: u32,
    /// Width of the fixed label column left of the tracks (px)
    pub label_width: f64,
    /// Pixels per second at zoom level 10
    pub base_pixels_per_second: f64,
    /// Empty time appended after the furthest scene or track end (s)
    pub trailing_padding: f64,
    /// Lowest zoom the "fit" mode may compute
    pub min_fit_zoom: f64,
    /// Drag magnet tolerance (s), converted to pixels at the current zoom
    pub magnet_threshold: f64,
    /// Snap to the nearest boundary when none is inside the magnet threshold
    pub snap_fallback_to_nearest: bool,
    /// Shortest scene a resize may produce (s)
    pub min_scene_duration: f64,
    /// Height of the scrollbar strip at the bottom of the ruler (px)
    pub scrollbar_strip_height: f64,
    /// Distance from a container edge where auto-scroll kicks in (px)
    pub auto_scroll_edge: f64,
    /// Auto-scroll speed right at the edge (px per frame)
    pub auto_scroll_max_speed: f64,
    /// Length of the snap-back animation after a rejected drop (ms)
    pub snap_back_ms: u64,
    /// Delay before centering a newly focused scene (ms)
    pub focus_debounce_ms: u64,
    /// Smallest selectable zoom level
    pub min_zoom: f64,
    /// Largest selectable zoom level
    pub max_zoom: f64,
    /// Multiplier applied by zoom in/out steps
    pub zoom_step: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            label_width: 80.0,
            base_pixels_per_second: 100.0,
            trailing_padding: 30.0,
            min_fit_zoom: 0.1,
            magnet_threshold: 0.5,
            snap_fallback_to_nearest: false,
            min_scene_duration: 0.1,
            scrollbar_strip_height: 17.0,
            auto_scroll_edge: 100.0,
            auto_scroll_max_speed: 10.0,
            snap_back_ms: 300,
            focus_debounce_ms: 50,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 1.5,
        }
    }
}

impl TimelineConfig {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No timeline config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse settings from a RON string
    pub fn from_ron(content: &str) -> Result<Self> {
        let config: TimelineConfig = ron::from_str(content)?;
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion { found: config.version });
        }
        config.validate()?;
        Ok(config)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default()
            .depth_limit(2)
            .separate_tuple_members(true);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.base_pixels_per_second <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "base_pixels_per_second",
                reason: "must be positive",
            });
        }
        if self.min_scene_duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_scene_duration",
                reason: "must be positive",
            });
        }
        if self.label_width < 0.0 || self.trailing_padding < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "label_width",
                reason: "geometry must not be negative",
            });
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvalidValue {
                field: "min_zoom",
                reason: "must be positive and not above max_zoom",
            });
        }
        if self.zoom_step <= 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "zoom_step",
                reason: "must be greater than 1",
            });
        }
        Ok(())
    }

    /// Snap-back animation length
    pub fn snap_back_duration(&self) -> Duration {
        Duration::from_millis(self.snap_back_ms)
    }

    /// Focus-centering debounce
    pub fn focus_debounce(&self) -> Duration {
        Duration::from_millis(self.focus_debounce_ms)
    }
}
