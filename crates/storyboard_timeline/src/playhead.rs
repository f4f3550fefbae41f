// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playhead seeking and viewport following.
//!
//! Seeking happens three ways: a click on the ruler, scrubbing the ruler, or
//! dragging the playhead marker. Independently of seeking, the playhead keeps
//! itself visible while external playback moves it, and a newly focused scene
//! is centered after a short debounce.

use crate::config::TimelineConfig;
use crate::scene::{Scene, SceneId};
use crate::time_axis::TimeAxis;
use crate::viewport::{ScrollBehavior, ScrollRequest, Viewport};
use std::time::Duration;

/// Continuous seek gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekGesture {
    /// Dragging the playhead marker
    MarkerDrag,
    /// Dragging across the ruler
    RulerScrub,
}

/// Seeking and auto-centering state
#[derive(Debug, Clone)]
pub struct PlayheadController {
    gesture: Option<SeekGesture>,
    scrollbar_strip_height: f64,
    last_time: Option<f64>,
}

impl PlayheadController {
    /// Create a controller from timeline settings
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            gesture: None,
            scrollbar_strip_height: config.scrollbar_strip_height,
            last_time: None,
        }
    }

    /// Active seek gesture
    pub fn gesture(&self) -> Option<SeekGesture> {
        self.gesture
    }

    /// Whether the user is moving the playhead
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Seek time for a click on the ruler
    ///
    /// `pointer_y` is measured from the top of a ruler `ruler_height` pixels
    /// tall. Clicks on the scrollbar strip at its bottom, and clicks left of
    /// the tracks, are ignored.
    pub fn ruler_click(
        &self,
        pointer_x: f64,
        pointer_y: f64,
        ruler_height: f64,
        viewport: &Viewport,
        axis: &TimeAxis,
        config: &TimelineConfig,
        total_duration: f64,
    ) -> Option<f64> {
        if pointer_y > ruler_height - self.scrollbar_strip_height {
            return None;
        }
        let track_x = viewport.track_x(config, pointer_x);
        if track_x < 0.0 {
            return None;
        }
        Some(clamp_time(axis.pixel_to_time(track_x), total_duration))
    }

    /// Press on the ruler: seek, then keep scrubbing while the button is held
    pub fn begin_scrub(
        &mut self,
        pointer_x: f64,
        pointer_y: f64,
        ruler_height: f64,
        viewport: &Viewport,
        axis: &TimeAxis,
        config: &TimelineConfig,
        total_duration: f64,
    ) -> Option<f64> {
        if self.gesture.is_some() {
            return None;
        }
        let time = self.ruler_click(pointer_x, pointer_y, ruler_height, viewport, axis, config, total_duration)?;
        self.gesture = Some(SeekGesture::RulerScrub);
        Some(time)
    }

    /// Press on the playhead marker
    pub fn begin_marker_drag(&mut self) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        self.gesture = Some(SeekGesture::MarkerDrag);
        true
    }

    /// Seek time for a pointer move during a marker drag or scrub
    pub fn drag_to(
        &mut self,
        pointer_x: f64,
        viewport: &Viewport,
        axis: &TimeAxis,
        config: &TimelineConfig,
        total_duration: f64,
    ) -> Option<f64> {
        self.gesture?;
        let track_x = viewport.track_x(config, pointer_x).max(0.0);
        Some(clamp_time(axis.pixel_to_time(track_x), total_duration))
    }

    /// Release the marker or ruler
    pub fn end_drag(&mut self) -> Option<SeekGesture> {
        self.gesture.take()
    }

    /// Keep the playhead in view as playback time changes
    ///
    /// Only reacts when `current_time` differs from the last observed value,
    /// and never while the user is dragging the playhead.
    pub fn follow(
        &mut self,
        current_time: f64,
        is_playing: bool,
        viewport: &Viewport,
        axis: &TimeAxis,
        config: &TimelineConfig,
    ) -> Option<ScrollRequest> {
        let changed = self.last_time != Some(current_time);
        self.last_time = Some(current_time);
        if !changed || self.is_dragging() {
            return None;
        }

        let px = axis.time_to_pixel(current_time);
        if viewport.is_visible(px) {
            return None;
        }
        let max_scroll = viewport.max_scroll(config, axis);
        let behavior = if is_playing { ScrollBehavior::Instant } else { ScrollBehavior::Smooth };
        Some(ScrollRequest {
            target: viewport.centered_on(config, px, max_scroll),
            behavior,
        })
    }
}

fn clamp_time(time: f64, total_duration: f64) -> f64 {
    time.max(0.0).min(total_duration.max(0.0))
}

/// Debounced centering of the focused scene
#[derive(Debug, Clone)]
pub struct FocusTracker {
    debounce: Duration,
    focused: Option<SceneId>,
    zoom_level: f64,
    pending: Option<Duration>,
}

impl FocusTracker {
    /// Create a tracker from timeline settings
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            debounce: config.focus_debounce(),
            focused: None,
            zoom_level: 0.0,
            pending: None,
        }
    }

    /// Whether a centering request is waiting for its debounce
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the current focus and zoom; (re)arms the debounce on change
    pub fn observe(&mut self, focused: Option<&SceneId>, zoom_level: f64) {
        let id_changed = self.focused.as_ref() != focused;
        let zoom_changed = self.zoom_level != zoom_level;
        self.focused = focused.cloned();
        self.zoom_level = zoom_level;

        if self.focused.is_none() {
            self.pending = None;
        } else if id_changed || zoom_changed {
            self.pending = Some(self.debounce);
        }
    }

    /// Advance the debounce; yields the centering request when it fires
    pub fn tick(
        &mut self,
        elapsed: Duration,
        scenes: &[Scene],
        viewport: &Viewport,
        axis: &TimeAxis,
        config: &TimelineConfig,
    ) -> Option<ScrollRequest> {
        let remaining = self.pending?.saturating_sub(elapsed);
        if !remaining.is_zero() {
            self.pending = Some(remaining);
            return None;
        }
        self.pending = None;

        let focused = self.focused.as_ref()?;
        let Some(scene) = scenes.iter().find(|s| &s.id == focused) else {
            tracing::debug!("Focused scene {focused} is not on the timeline");
            return None;
        };
        let px = axis.time_to_pixel(scene.midpoint());
        let max_scroll = viewport.max_scroll(config, axis);
        Some(ScrollRequest {
            target: viewport.centered_on(config, px, max_scroll),
            behavior: ScrollBehavior::Smooth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TimelineConfig, TimeAxis, Viewport) {
        let config = TimelineConfig::default();
        // 100 px/s over 60 s => 6000 px of track
        let axis = TimeAxis::new(&config, 60.0, 10.0, 800.0);
        (config, axis, Viewport::new(800.0, 10.0))
    }

    #[test]
    fn test_ruler_click_seeks() {
        let (config, axis, mut viewport) = setup();
        let playhead = PlayheadController::new(&config);
        viewport.scroll_offset = 100.0;

        let time = playhead.ruler_click(330.0, 10.0, 40.0, &viewport, &axis, &config, 30.0);
        assert_eq!(time, Some(3.5));
        assert_eq!(playhead.ruler_click(5000.0, 10.0, 40.0, &viewport, &axis, &config, 30.0), Some(30.0));
    }

    #[test]
    fn test_ruler_click_ignores_strip_and_label() {
        let (config, axis, viewport) = setup();
        let playhead = PlayheadController::new(&config);
        assert_eq!(playhead.ruler_click(300.0, 30.0, 40.0, &viewport, &axis, &config, 30.0), None);
        assert_eq!(playhead.ruler_click(40.0, 10.0, 40.0, &viewport, &axis, &config, 30.0), None);
    }

    #[test]
    fn test_marker_drag_clamps_to_track_start() {
        let (config, axis, viewport) = setup();
        let mut playhead = PlayheadController::new(&config);
        assert_eq!(playhead.drag_to(300.0, &viewport, &axis, &config, 30.0), None);

        assert!(playhead.begin_marker_drag());
        assert!(!playhead.begin_marker_drag());
        assert_eq!(playhead.drag_to(10.0, &viewport, &axis, &config, 30.0), Some(0.0));
        assert_eq!(playhead.drag_to(280.0, &viewport, &axis, &config, 30.0), Some(2.0));
        assert_eq!(playhead.end_drag(), Some(SeekGesture::MarkerDrag));
        assert!(!playhead.is_dragging());
    }

    #[test]
    fn test_ruler_scrub() {
        let (config, axis, viewport) = setup();
        let mut playhead = PlayheadController::new(&config);
        assert_eq!(playhead.begin_scrub(180.0, 5.0, 40.0, &viewport, &axis, &config, 30.0), Some(1.0));
        assert_eq!(playhead.gesture(), Some(SeekGesture::RulerScrub));
        assert_eq!(playhead.drag_to(580.0, &viewport, &axis, &config, 30.0), Some(5.0));
        playhead.end_drag();

        // Pressing on the strip does not start a scrub
        assert_eq!(playhead.begin_scrub(180.0, 35.0, 40.0, &viewport, &axis, &config, 30.0), None);
        assert!(!playhead.is_dragging());
    }

    #[test]
    fn test_follow_centers_offscreen_playhead() {
        let (config, axis, viewport) = setup();
        let mut playhead = PlayheadController::new(&config);
        assert_eq!(playhead.follow(2.0, true, &viewport, &axis, &config), None);

        let request = playhead.follow(20.0, true, &viewport, &axis, &config).unwrap();
        assert_eq!(request.target, 80.0 + 2000.0 - 400.0);
        assert_eq!(request.behavior, ScrollBehavior::Instant);

        // Same time again: nothing to do
        assert_eq!(playhead.follow(20.0, true, &viewport, &axis, &config), None);

        let paused = playhead.follow(30.0, false, &viewport, &axis, &config).unwrap();
        assert_eq!(paused.behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn test_follow_never_fights_a_drag() {
        let (config, axis, viewport) = setup();
        let mut playhead = PlayheadController::new(&config);
        playhead.begin_marker_drag();
        for time in [10.0, 25.0, 40.0, 55.0] {
            assert_eq!(playhead.follow(time, true, &viewport, &axis, &config), None);
        }
        playhead.end_drag();
        assert!(playhead.follow(50.0, true, &viewport, &axis, &config).is_some());
    }

    #[test]
    fn test_focus_debounce() {
        let (config, axis, viewport) = setup();
        let scenes = vec![Scene::new("A", 1, 0.0, 5.0), Scene::new("B", 2, 20.0, 30.0)];
        let mut focus = FocusTracker::new(&config);

        focus.observe(Some(&SceneId::from("B")), 10.0);
        assert!(focus.is_pending());
        assert_eq!(focus.tick(Duration::from_millis(30), &scenes, &viewport, &axis, &config), None);

        // Unchanged focus keeps the running timer
        focus.observe(Some(&SceneId::from("B")), 10.0);
        let request = focus
            .tick(Duration::from_millis(20), &scenes, &viewport, &axis, &config)
            .unwrap();
        assert_eq!(request.target, 80.0 + 2500.0 - 400.0);
        assert!(!focus.is_pending());
    }

    #[test]
    fn test_focus_rearms_on_change_only() {
        let (config, axis, viewport) = setup();
        let scenes = vec![Scene::new("A", 1, 0.0, 5.0)];
        let mut focus = FocusTracker::new(&config);

        focus.observe(Some(&SceneId::from("A")), 10.0);
        let request = focus.tick(Duration::from_millis(50), &scenes, &viewport, &axis, &config);
        assert_eq!(request.map(|r| r.target), Some(0.0));

        focus.observe(Some(&SceneId::from("A")), 10.0);
        assert!(!focus.is_pending());
        focus.observe(Some(&SceneId::from("A")), 20.0);
        assert!(focus.is_pending());
        focus.observe(None, 20.0);
        assert!(!focus.is_pending());
    }
}
