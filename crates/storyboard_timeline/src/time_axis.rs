// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mapping between seconds and pixels.
//!
//! Pixel values are in track space: 0 is the left edge of the tracks, right
//! of the label column, before any scrolling is applied.

use crate::config::TimelineConfig;
use crate::scene::{AudioTrack, Scene};

/// Visible seconds at zoom level 10
const FULL_ZOOM_VISIBLE_SECONDS: f64 = 120.0;

/// Rendered timeline length: the furthest scene, track or total end plus padding
pub fn extended_duration(
    scenes: &[Scene],
    audio_tracks: &[AudioTrack],
    total_duration: f64,
    trailing_padding: f64,
) -> f64 {
    let furthest = scenes
        .iter()
        .map(|s| s.end)
        .chain(audio_tracks.iter().map(|t| t.end))
        .fold(total_duration, f64::max);
    furthest + trailing_padding
}

/// Time axis for one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    extended_duration: f64,
    effective_zoom: f64,
    pixels_per_second: f64,
}

impl TimeAxis {
    /// Build the axis for a zoom level; zoom 0 fits the timeline to the container
    pub fn new(
        config: &TimelineConfig,
        extended_duration: f64,
        zoom_level: f64,
        container_width: f64,
    ) -> Self {
        let effective_zoom = if zoom_level == 0.0 {
            Self::fit_zoom(config, extended_duration, container_width)
        } else {
            zoom_level
        };

        Self {
            extended_duration,
            effective_zoom,
            pixels_per_second: config.base_pixels_per_second * effective_zoom / 10.0,
        }
    }

    /// Build the axis straight from timeline content
    pub fn for_content(
        config: &TimelineConfig,
        scenes: &[Scene],
        audio_tracks: &[AudioTrack],
        total_duration: f64,
        zoom_level: f64,
        container_width: f64,
    ) -> Self {
        let extended = extended_duration(scenes, audio_tracks, total_duration, config.trailing_padding);
        Self::new(config, extended, zoom_level, container_width)
    }

    /// Zoom that makes the extended duration fill the track area exactly
    fn fit_zoom(config: &TimelineConfig, extended_duration: f64, container_width: f64) -> f64 {
        if container_width <= 0.0 {
            return 1.0;
        }
        if extended_duration <= 0.0 {
            return config.min_fit_zoom;
        }
        let track_width = (container_width - config.label_width).max(0.0);
        let zoom = track_width * 10.0 / (extended_duration * config.base_pixels_per_second);
        zoom.max(config.min_fit_zoom)
    }

    /// Padded timeline length in seconds
    pub fn extended_duration(&self) -> f64 {
        self.extended_duration
    }

    /// Zoom level after resolving "fit"
    pub fn effective_zoom(&self) -> f64 {
        self.effective_zoom
    }

    /// Horizontal scale
    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// Total width of the tracks in pixels
    pub fn timeline_width(&self) -> f64 {
        self.extended_duration * self.pixels_per_second
    }

    /// Convert time to x position
    pub fn time_to_pixel(&self, time: f64) -> f64 {
        if self.extended_duration <= 0.0 {
            return 0.0;
        }
        time * self.pixels_per_second
    }

    /// Convert x position to time
    pub fn pixel_to_time(&self, px: f64) -> f64 {
        if self.pixels_per_second <= 0.0 || self.extended_duration <= 0.0 {
            return 0.0;
        }
        px / self.pixels_per_second
    }

    /// Convert a time span to a pixel span
    pub fn seconds_to_pixels(&self, seconds: f64) -> f64 {
        seconds * self.pixels_per_second
    }

    /// Seconds visible in one screen at the current zoom
    pub fn visible_duration(&self) -> f64 {
        if self.effective_zoom > 0.0 {
            FULL_ZOOM_VISIBLE_SECONDS / (self.effective_zoom / 10.0)
        } else {
            self.extended_duration
        }
    }

    /// Spacing of ruler markers in seconds
    pub fn ruler_interval(&self) -> f64 {
        let visible = self.visible_duration();
        if visible > 60.0 {
            10.0
        } else if visible > 30.0 {
            5.0
        } else {
            1.0
        }
    }

    /// Times of all ruler markers from zero to the extended duration
    pub fn ruler_marks(&self) -> Vec<f64> {
        let interval = self.ruler_interval();
        let count = (self.extended_duration / interval).floor().max(0.0) as usize;
        (0..=count).map(|i| i as f64 * interval).collect()
    }
}

/// Format seconds as `MM.SS` for ruler labels
pub fn format_timecode(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes:02}.{secs:02}")
}
