// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag-to-reorder for scene blocks.
//!
//! `Idle -> Dragging -> (commit | snap back) -> Idle`. While dragging, the
//! pointer is matched against sibling scene edges with a magnet threshold;
//! a drop over a recorded edge reports a reorder intent, anything else plays
//! the snap-back cue and changes nothing.

use crate::config::TimelineConfig;
use crate::scene::{Boundary, Scene, SceneId};
use crate::time_axis::TimeAxis;
use crate::transition::{apply_mutations, repair_pairings};
use std::time::Duration;

/// Transient state of an active scene drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Scene being dragged
    pub dragged_scene_id: SceneId,
    /// Index of the dragged scene in start order when the drag began
    pub original_index: usize,
    /// Pointer offset from the left edge of the grabbed block (px)
    pub grab_offset: f64,
    /// Sibling whose edge the pointer is locked onto
    pub hover_target_index: Option<usize>,
    /// Which edge of the hover target
    pub hover_boundary: Option<Boundary>,
    /// Scenes highlighted as being displaced by the insertion
    pub adjacent_indices: [Option<usize>; 2],
}

impl DragState {
    fn clear_hover(&mut self) {
        self.hover_target_index = None;
        self.hover_boundary = None;
        self.adjacent_indices = [None, None];
    }
}

/// Controller phase
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragPhase {
    /// No drag in progress
    #[default]
    Idle,
    /// A scene is being dragged
    Dragging(DragState),
    /// A rejected drop is animating back to its origin
    SnappingBack {
        /// Scene returning to its slot
        scene_id: SceneId,
        /// Time left in the animation
        remaining: Duration,
    },
}

/// Reorder proposed by a successful drop
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderIntent {
    /// Dragged scene
    pub scene_id: SceneId,
    /// Original index in start order
    pub from_index: usize,
    /// Index of the scene whose edge was targeted
    pub to_index: usize,
    /// Insert before (`Start`) or after (`End`) the target
    pub boundary: Boundary,
}

/// Result of releasing a drag
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The caller should reorder its scene list
    Reorder(ReorderIntent),
    /// Nothing changes; the block animates back
    SnapBack,
    /// No drag was active
    Ignored,
}

/// Drag-to-reorder state machine
#[derive(Debug, Clone)]
pub struct DragReorderController {
    phase: DragPhase,
    magnet_threshold: f64,
    snap_fallback_to_nearest: bool,
    snap_back: Duration,
}

impl DragReorderController {
    /// Create a controller from timeline settings
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            phase: DragPhase::Idle,
            magnet_threshold: config.magnet_threshold,
            snap_fallback_to_nearest: config.snap_fallback_to_nearest,
            snap_back: config.snap_back_duration(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Active drag state
    pub fn state(&self) -> Option<&DragState> {
        match &self.phase {
            DragPhase::Dragging(state) => Some(state),
            _ => None,
        }
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Whether the snap-back cue is playing
    pub fn is_snapping_back(&self) -> bool {
        matches!(self.phase, DragPhase::SnappingBack { .. })
    }

    /// Start dragging a scene; refused while another drag is active
    pub fn begin(&mut self, scene_id: SceneId, original_index: usize, grab_offset: f64) -> bool {
        if self.is_dragging() {
            tracing::warn!("Drag start for {scene_id} ignored: a drag is already active");
            return false;
        }
        tracing::debug!(scene = %scene_id, original_index, "Scene drag started");
        self.phase = DragPhase::Dragging(DragState {
            dragged_scene_id: scene_id,
            original_index,
            grab_offset,
            hover_target_index: None,
            hover_boundary: None,
            adjacent_indices: [None, None],
        });
        true
    }

    /// Track the pointer; `track_x` is in track-space pixels (scroll applied)
    pub fn update(&mut self, track_x: f64, sorted: &[&Scene], axis: &TimeAxis) -> Option<&DragState> {
        let magnet_px = axis.seconds_to_pixels(self.magnet_threshold);
        let fallback = self.snap_fallback_to_nearest;
        let DragPhase::Dragging(state) = &mut self.phase else {
            return None;
        };
        if track_x < 0.0 {
            return Some(&*state);
        }

        let dragged_index = sorted
            .iter()
            .position(|s| s.id == state.dragged_scene_id)
            .unwrap_or(state.original_index);

        let mut best: Option<(usize, Boundary, f64)> = None;
        for (index, scene) in sorted.iter().enumerate() {
            if index == dragged_index {
                continue;
            }
            let to_start = (track_x - axis.time_to_pixel(scene.start)).abs();
            let to_end = (track_x - axis.time_to_pixel(scene.end)).abs();
            let distance = to_start.min(to_end);
            if best.map_or(true, |(_, _, d)| distance < d) {
                let boundary = if to_start < to_end { Boundary::Start } else { Boundary::End };
                best = Some((index, boundary, distance));
            }
        }

        let candidate = best.filter(|&(_, _, distance)| fallback || distance < magnet_px);
        let Some((target, boundary, _)) = candidate else {
            state.clear_hover();
            return Some(&*state);
        };

        if in_no_op_zone(track_x, state.original_index, sorted, axis) {
            state.clear_hover();
            return Some(&*state);
        }

        state.hover_target_index = Some(target);
        state.hover_boundary = Some(boundary);
        state.adjacent_indices = match boundary {
            Boundary::Start => [target.checked_sub(1), Some(target)],
            Boundary::End => [Some(target), (target + 1 < sorted.len()).then_some(target + 1)],
        };
        Some(&*state)
    }

    /// Release over the timeline
    pub fn commit(&mut self) -> DropOutcome {
        let DragPhase::Dragging(state) = std::mem::take(&mut self.phase) else {
            return DropOutcome::Ignored;
        };

        let (Some(target), Some(boundary)) = (state.hover_target_index, state.hover_boundary) else {
            tracing::debug!(scene = %state.dragged_scene_id, "Drop without target, snapping back");
            return self.snap_back(state.dragged_scene_id);
        };

        let from = state.original_index;
        let unchanged = target == from
            || (boundary == Boundary::Start && target == from + 1)
            || (boundary == Boundary::End && target + 1 == from);
        if unchanged {
            tracing::debug!(scene = %state.dragged_scene_id, target, "Drop leaves order unchanged, snapping back");
            return self.snap_back(state.dragged_scene_id);
        }

        tracing::debug!(scene = %state.dragged_scene_id, from, to = target, boundary = boundary.name(), "Scene reorder");
        DropOutcome::Reorder(ReorderIntent {
            scene_id: state.dragged_scene_id,
            from_index: from,
            to_index: target,
            boundary,
        })
    }

    /// Drag ended without a drop on the timeline
    pub fn end(&mut self) -> DropOutcome {
        match std::mem::take(&mut self.phase) {
            DragPhase::Dragging(state) => self.snap_back(state.dragged_scene_id),
            other => {
                self.phase = other;
                DropOutcome::Ignored
            }
        }
    }

    /// Abandon any drag or animation immediately
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Advance the snap-back animation; true when it just finished
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let DragPhase::SnappingBack { remaining, .. } = &mut self.phase else {
            return false;
        };
        *remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.phase = DragPhase::Idle;
            return true;
        }
        false
    }

    fn snap_back(&mut self, scene_id: SceneId) -> DropOutcome {
        self.phase = DragPhase::SnappingBack {
            scene_id,
            remaining: self.snap_back,
        };
        DropOutcome::SnapBack
    }
}

/// Whether the pointer sits strictly between the midpoints of the dragged
/// scene's original neighbors, i.e. roughly where the drag started
fn in_no_op_zone(track_x: f64, original_index: usize, sorted: &[&Scene], axis: &TimeAxis) -> bool {
    let Some(prev) = original_index.checked_sub(1).and_then(|i| sorted.get(i)) else {
        return false;
    };
    let Some(next) = sorted.get(original_index + 1) else {
        return false;
    };
    let prev_mid = axis.time_to_pixel(prev.midpoint());
    let next_mid = axis.time_to_pixel(next.midpoint());
    track_x > prev_mid && track_x < next_mid
}

/// Apply a reorder to a scene list owned by the caller
///
/// The scene moves before or after the target, the list is re-timed
/// contiguously from the earliest start with durations preserved, scene
/// numbers restart at 1, and transition pairs broken by the move are cleared.
/// Returns false and leaves the list untouched when the intent does not fit
/// it, including when the scene at `from_index` is no longer the dragged one.
pub fn apply_reorder(scenes: &mut Vec<Scene>, intent: &ReorderIntent) -> bool {
    if intent.from_index == intent.to_index {
        return false;
    }
    let mut order: Vec<usize> = (0..scenes.len()).collect();
    order.sort_by(|&a, &b| scenes[a].start.total_cmp(&scenes[b].start));
    let (Some(&from), Some(_)) = (order.get(intent.from_index), order.get(intent.to_index)) else {
        return false;
    };
    if scenes[from].id != intent.scene_id {
        tracing::debug!(
            expected = %intent.scene_id,
            found = %scenes[from].id,
            "Reorder does not match the scene list"
        );
        return false;
    }

    scenes.sort_by(|a, b| a.start.total_cmp(&b.start));

    let origin = scenes[0].start;
    let target_id = scenes[intent.to_index].id.clone();
    let moved = scenes.remove(intent.from_index);
    let Some(target) = scenes.iter().position(|s| s.id == target_id) else {
        return false;
    };
    let insert_at = match intent.boundary {
        Boundary::Start => target,
        Boundary::End => target + 1,
    };
    scenes.insert(insert_at, moved);

    let mut cursor = origin;
    for (i, scene) in scenes.iter_mut().enumerate() {
        let duration = scene.duration();
        scene.start = cursor;
        scene.end = cursor + duration;
        scene.scene_number = i as u32 + 1;
        cursor = scene.end;
    }

    let repairs = repair_pairings(scenes);
    if !repairs.is_empty() {
        tracing::debug!(count = repairs.len(), "Cleared transition pairs broken by reorder");
        apply_mutations(scenes, &repairs);
    }
    true
}
