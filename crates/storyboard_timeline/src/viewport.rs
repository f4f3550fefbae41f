// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scrolled viewport over the timeline.

use crate::config::TimelineConfig;
use crate::time_axis::TimeAxis;

/// How a scroll request should be animated by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Ease towards the target
    #[default]
    Smooth,
    /// Jump straight to the target
    Instant,
}

/// Programmatic scroll request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Target scroll offset in pixels
    pub target: f64,
    /// Animation behavior
    pub behavior: ScrollBehavior,
}

/// Horizontal viewport state
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Current horizontal scroll offset (px)
    pub scroll_offset: f64,
    /// Visible width of the scroll container including the label column (px)
    pub container_width: f64,
    /// Zoom level, 0 means fit to container
    pub zoom_level: f64,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(container_width: f64, zoom_level: f64) -> Self {
        Self {
            scroll_offset: 0.0,
            container_width,
            zoom_level,
        }
    }

    /// Full scrollable width: label column plus tracks
    pub fn content_width(&self, config: &TimelineConfig, axis: &TimeAxis) -> f64 {
        config.label_width + axis.timeline_width()
    }

    /// Largest valid scroll offset
    pub fn max_scroll(&self, config: &TimelineConfig, axis: &TimeAxis) -> f64 {
        (self.content_width(config, axis) - self.container_width).max(0.0)
    }

    /// Clamp and apply a scroll offset
    pub fn scroll_to(&mut self, target: f64, max_scroll: f64) -> f64 {
        self.scroll_offset = target.max(0.0).min(max_scroll);
        self.scroll_offset
    }

    /// Scroll by a delta, returns the distance actually moved
    pub fn scroll_by(&mut self, delta: f64, max_scroll: f64) -> f64 {
        let before = self.scroll_offset;
        self.scroll_to(before + delta, max_scroll);
        self.scroll_offset - before
    }

    /// Apply a mouse wheel event; the dominant axis drives horizontal scrolling
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, max_scroll: f64) -> Option<ScrollRequest> {
        let amount = if delta_x.abs() > delta_y.abs() {
            delta_x
        } else if delta_y.abs() > delta_x.abs() {
            delta_y
        } else {
            return None;
        };
        let target = self.scroll_to(self.scroll_offset + amount, max_scroll);
        Some(ScrollRequest { target, behavior: ScrollBehavior::Instant })
    }

    /// Apply a programmatic scroll request
    pub fn apply(&mut self, request: ScrollRequest, max_scroll: f64) {
        self.scroll_to(request.target, max_scroll);
    }

    /// Convert a container-relative pointer x to track-space pixels
    pub fn track_x(&self, config: &TimelineConfig, pointer_x: f64) -> f64 {
        pointer_x - config.label_width + self.scroll_offset
    }

    /// Whether a track-space pixel position is inside the visible window
    pub fn is_visible(&self, track_px: f64) -> bool {
        track_px >= self.scroll_offset && track_px <= self.scroll_offset + self.container_width
    }

    /// Scroll offset that centers a track-space pixel position, clamped
    pub fn centered_on(&self, config: &TimelineConfig, track_px: f64, max_scroll: f64) -> f64 {
        let target = config.label_width + track_px - self.container_width / 2.0;
        target.max(0.0).min(max_scroll)
    }

    /// Step the zoom level up
    pub fn zoom_in(&mut self, config: &TimelineConfig, axis: &TimeAxis) -> f64 {
        let current = self.resolved_zoom(axis);
        self.zoom_level = (current * config.zoom_step).min(config.max_zoom);
        self.zoom_level
    }

    /// Step the zoom level down
    pub fn zoom_out(&mut self, config: &TimelineConfig, axis: &TimeAxis) -> f64 {
        let current = self.resolved_zoom(axis);
        self.zoom_level = (current / config.zoom_step).max(config.min_zoom);
        self.zoom_level
    }

    /// Return to fit mode
    pub fn zoom_to_fit(&mut self) {
        self.zoom_level = 0.0;
    }

    fn resolved_zoom(&self, axis: &TimeAxis) -> f64 {
        if self.zoom_level == 0.0 {
            axis.effective_zoom()
        } else {
            self.zoom_level
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TimelineConfig, TimeAxis, Viewport) {
        let config = TimelineConfig::default();
        // 45 s at 100 px/s => 4500 px of track
        let axis = TimeAxis::new(&config, 45.0, 10.0, 800.0);
        (config, axis, Viewport::new(800.0, 10.0))
    }

    #[test]
    fn test_max_scroll() {
        let (config, axis, viewport) = setup();
        assert_eq!(viewport.max_scroll(&config, &axis), 80.0 + 4500.0 - 800.0);
    }

    #[test]
    fn test_scroll_clamps() {
        let (config, axis, mut viewport) = setup();
        let max = viewport.max_scroll(&config, &axis);
        assert_eq!(viewport.scroll_by(-50.0, max), 0.0);
        viewport.scroll_to(10_000.0, max);
        assert_eq!(viewport.scroll_offset, max);
    }

    #[test]
    fn test_wheel_uses_dominant_axis() {
        let (config, axis, mut viewport) = setup();
        let max = viewport.max_scroll(&config, &axis);
        let request = viewport.wheel(5.0, 120.0, max).unwrap();
        assert_eq!(request.target, 120.0);
        assert_eq!(request.behavior, ScrollBehavior::Instant);
        viewport.wheel(-40.0, 10.0, max);
        assert_eq!(viewport.scroll_offset, 80.0);
        assert!(viewport.wheel(3.0, 3.0, max).is_none());
    }

    #[test]
    fn test_track_x_and_visibility() {
        let (config, _axis, mut viewport) = setup();
        viewport.scroll_offset = 200.0;
        assert_eq!(viewport.track_x(&config, 100.0), 220.0);
        assert!(viewport.is_visible(500.0));
        assert!(!viewport.is_visible(100.0));
        assert!(!viewport.is_visible(1200.0));
    }

    #[test]
    fn test_centered_on() {
        let (config, axis, viewport) = setup();
        let max = viewport.max_scroll(&config, &axis);
        assert_eq!(viewport.centered_on(&config, 1000.0, max), 80.0 + 1000.0 - 400.0);
        assert_eq!(viewport.centered_on(&config, 10.0, max), 0.0);
        assert_eq!(viewport.centered_on(&config, 1_000_000.0, max), max);
    }

    #[test]
    fn test_zoom_steps() {
        let (config, axis, mut viewport) = setup();
        viewport.zoom_level = 2.0;
        assert_eq!(viewport.zoom_in(&config, &axis), 3.0);
        viewport.zoom_level = 4.0;
        assert_eq!(viewport.zoom_in(&config, &axis), 5.0);
        viewport.zoom_level = 0.12;
        assert_eq!(viewport.zoom_out(&config, &axis), 0.1);

        viewport.zoom_to_fit();
        let fit_axis = TimeAxis::new(&config, 45.0, 0.0, 800.0);
        let zoomed = viewport.zoom_in(&config, &fit_axis);
        assert!((zoomed - fit_axis.effective_zoom() * 1.5).abs() < 1e-9);
    }
}
