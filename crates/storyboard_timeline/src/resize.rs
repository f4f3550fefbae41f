// SPDX-License-Identifier: MIT OR Apache-2.0
//! Trim handles on scene blocks.

use crate::config::TimelineConfig;
use crate::scene::{Boundary, Scene, SceneId};
use crate::time_axis::TimeAxis;

/// Active resize gesture
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    /// Scene being trimmed
    pub scene_id: SceneId,
    /// Handle being dragged
    pub handle: Boundary,
    /// Scene start when the handle was grabbed
    pub origin_start: f64,
    /// Scene end when the handle was grabbed
    pub origin_end: f64,
    /// Pointer x when the handle was grabbed (px)
    pub origin_x: f64,
    /// Live position of the dragged edge (s)
    pub preview_boundary: Option<f64>,
}

impl ResizeState {
    /// Start and end as currently previewed
    pub fn preview_range(&self) -> (f64, f64) {
        match (self.handle, self.preview_boundary) {
            (Boundary::Start, Some(start)) => (start, self.origin_end),
            (Boundary::End, Some(end)) => (self.origin_start, end),
            (_, None) => (self.origin_start, self.origin_end),
        }
    }
}

/// Resize committed on release
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeIntent {
    /// Trimmed scene
    pub scene_id: SceneId,
    /// New start (s)
    pub start: f64,
    /// New end (s)
    pub end: f64,
}

/// Applies the lower bound before the upper one so crossed bounds resolve
/// to the upper bound instead of panicking like `f64::clamp`.
fn clamp_ordered(value: f64, lower: f64, upper: f64) -> f64 {
    value.max(lower).min(upper)
}

/// Single-handle resize state machine
#[derive(Debug, Clone)]
pub struct ResizeController {
    state: Option<ResizeState>,
    min_duration: f64,
}

impl ResizeController {
    /// Create a controller from timeline settings
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            state: None,
            min_duration: config.min_scene_duration,
        }
    }

    /// Active gesture, if any
    pub fn state(&self) -> Option<&ResizeState> {
        self.state.as_ref()
    }

    /// Whether a handle is held
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Grab a handle; refused while another resize is active
    pub fn begin(&mut self, scene: &Scene, handle: Boundary, pointer_x: f64) -> bool {
        if let Some(active) = &self.state {
            tracing::warn!(
                "Resize of {} ignored: {} is already being resized",
                scene.id,
                active.scene_id
            );
            return false;
        }
        tracing::debug!(scene = %scene.id, handle = handle.name(), "Resize started");
        self.state = Some(ResizeState {
            scene_id: scene.id.clone(),
            handle,
            origin_start: scene.start,
            origin_end: scene.end,
            origin_x: pointer_x,
            preview_boundary: None,
        });
        true
    }

    /// Move the held handle and return the clamped preview edge
    ///
    /// A start handle stays between the previous scene's end (or zero) and
    /// the scene end minus the minimum duration. An end handle stays between
    /// the scene start plus the minimum duration and the extended duration;
    /// it is not bounded by the next scene.
    pub fn update(&mut self, pointer_x: f64, sorted: &[&Scene], axis: &TimeAxis) -> Option<f64> {
        let min_duration = self.min_duration;
        let state = self.state.as_mut()?;
        let pps = axis.pixels_per_second();
        let delta = if pps > 0.0 { (pointer_x - state.origin_x) / pps } else { 0.0 };

        let preview = match state.handle {
            Boundary::Start => {
                let index = sorted.iter().position(|s| s.id == state.scene_id);
                let lower = index
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|i| sorted.get(i))
                    .map_or(0.0, |prev| prev.end);
                clamp_ordered(state.origin_start + delta, lower, state.origin_end - min_duration)
            }
            Boundary::End => clamp_ordered(
                state.origin_end + delta,
                state.origin_start + min_duration,
                axis.extended_duration(),
            ),
        };
        state.preview_boundary = Some(preview);
        Some(preview)
    }

    /// Release the handle; yields an intent when the scene actually changed
    pub fn commit(&mut self) -> Option<ResizeIntent> {
        let state = self.state.take()?;
        let (start, end) = state.preview_range();
        if start == state.origin_start && end == state.origin_end {
            tracing::debug!(scene = %state.scene_id, "Resize released without change");
            return None;
        }
        tracing::debug!(scene = %state.scene_id, start, end, "Resize committed");
        Some(ResizeIntent {
            scene_id: state.scene_id,
            start,
            end,
        })
    }

    /// Drop the gesture without committing
    pub fn cancel(&mut self) {
        self.state = None;
    }

    /// Previewed range for a scene under resize
    pub fn preview_for(&self, scene_id: &SceneId) -> Option<(f64, f64)> {
        self.state
            .as_ref()
            .filter(|s| &s.scene_id == scene_id)
            .map(ResizeState::preview_range)
    }
}
