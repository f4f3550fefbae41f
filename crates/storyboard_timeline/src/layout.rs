// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render-ready geometry of the timeline.
//!
//! All x positions are track-space pixels; add the label width and subtract
//! the scroll offset to get container coordinates.

use crate::scene::{Scene, SceneId};
use crate::time_axis::{format_timecode, TimeAxis};
use serde::Serialize;

/// One scene block on the video track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneBlock {
    /// Scene shown by the block
    pub scene_id: SceneId,
    /// Position in start order
    pub index: usize,
    /// Left edge (px)
    pub left: f64,
    /// Block width (px)
    pub width: f64,
    /// The block is being dragged
    pub is_dragging: bool,
    /// The block is animating back after a rejected drop
    pub is_snapping_back: bool,
    /// The pointer is locked onto one of this block's edges
    pub is_hover_target: bool,
    /// The block is displaced by the pending insertion
    pub is_adjacent: bool,
    /// The block is the focused scene
    pub is_focused: bool,
    /// Shares an environment with the focused scene
    pub shares_environment: bool,
    /// Faded because the focused scene is in another environment
    pub is_dimmed: bool,
    /// Shows the file-drop highlight
    pub show_drop_indicator: bool,
    /// Label of the start-edge transition, empty when none
    pub transition_in_label: &'static str,
    /// Label of the end-edge transition, empty when none
    pub transition_out_label: &'static str,
}

/// Ruler tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerMark {
    /// Time of the tick (s)
    pub time: f64,
    /// Position (px)
    pub x: f64,
    /// `MM.SS` label
    pub label: String,
}

/// Whole-timeline geometry for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    /// Width of the tracks (px)
    pub timeline_width: f64,
    /// Scrollable width including the label column (px)
    pub content_width: f64,
    /// Current scroll offset (px)
    pub scroll_offset: f64,
    /// Scene blocks in start order
    pub blocks: Vec<SceneBlock>,
    /// Insertion marker while a drop target is locked (px)
    pub insertion_line: Option<f64>,
    /// Playhead position (px)
    pub playhead_x: f64,
    /// Ruler ticks
    pub ruler: Vec<RulerMark>,
}

/// Environment relation of a scene to the focused scene: (shares, dimmed)
pub(crate) fn environment_relation(scene: &Scene, focused: Option<&Scene>) -> (bool, bool) {
    let Some(focused) = focused else {
        return (false, false);
    };
    if focused.id == scene.id {
        return (false, false);
    }
    let shares = matches!(
        (&scene.environment, &focused.environment),
        (Some(a), Some(b)) if a == b
    );
    let dimmed = focused.environment.is_some() && !shares;
    (shares, dimmed)
}

pub(crate) fn ruler(axis: &TimeAxis) -> Vec<RulerMark> {
    axis.ruler_marks()
        .into_iter()
        .map(|time| RulerMark {
            time,
            x: axis.time_to_pixel(time),
            label: format_timecode(time),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;

    #[test]
    fn test_environment_relation() {
        let a = Scene::new("A", 1, 0.0, 5.0).with_environment("forest");
        let b = Scene::new("B", 2, 5.0, 10.0).with_environment("forest");
        let c = Scene::new("C", 3, 10.0, 15.0).with_environment("city");
        let d = Scene::new("D", 4, 15.0, 20.0);

        assert_eq!(environment_relation(&b, Some(&a)), (true, false));
        assert_eq!(environment_relation(&c, Some(&a)), (false, true));
        assert_eq!(environment_relation(&d, Some(&a)), (false, true));
        assert_eq!(environment_relation(&a, Some(&a)), (false, false));
        assert_eq!(environment_relation(&a, Some(&d)), (false, false));
        assert_eq!(environment_relation(&a, None), (false, false));
    }

    #[test]
    fn test_ruler_labels() {
        let axis = TimeAxis::new(&TimelineConfig::default(), 75.0, 10.0, 800.0);
        let marks = ruler(&axis);
        assert_eq!(marks.len(), 8);
        assert_eq!(marks[7].label, "01.10");
        assert_eq!(marks[7].x, 7000.0);
    }
}
