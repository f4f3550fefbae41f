// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted editing session.
//!
//! Drives a mounted timeline with a fixed sequence of pointer gestures, feeds
//! every proposed edit into the storyboard with undo history, and reports
//! what happened.

use crate::history::{History, HistoryError, HistoryStats};
use crate::storyboard::Storyboard;
use serde::Serialize;
use std::time::Duration;
use storyboard_timeline::scene::sorted_by_start;
use storyboard_timeline::{
    AudioTrack, Boundary, DroppedFile, IntentQueue, Scene, SceneId, StoryboardTimeline, TimelineCallbacks,
    TimelineConfig, TimelineIntent, TimelineLayout, TransitionKind,
};
use thiserror::Error;
use uuid::Uuid;

/// Container width the session pretends to render into (px)
const CONTAINER_WIDTH: f64 = 960.0;
/// Height of the ruler (px)
const RULER_HEIGHT: f64 = 40.0;
/// One display frame
const FRAME: Duration = Duration::from_millis(16);

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Undo/redo failed
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Result type for the session
pub type Result<T> = std::result::Result<T, SessionError>;

/// Outcome of one scripted step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// What the step did
    pub action: String,
    /// Edits the timeline proposed
    pub intents: Vec<TimelineIntent>,
    /// Descriptions of applied edits
    pub applied: Vec<String>,
    /// Reasons edits were refused by the model
    pub rejected: Vec<String>,
}

/// Full session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Random session ID
    pub session_id: Uuid,
    /// Steps in order
    pub steps: Vec<StepReport>,
    /// Scenes after the session
    pub final_scenes: Vec<Scene>,
    /// Undo stack state
    pub history: HistoryStats,
    /// Timeline geometry after the session
    pub layout: TimelineLayout,
}

/// Storyboard, timeline and history wired together
pub struct Session {
    storyboard: Storyboard,
    timeline: StoryboardTimeline,
    queue: IntentQueue,
    history: History,
    steps: Vec<StepReport>,
}

impl Session {
    /// Mount a timeline over a storyboard
    pub fn new(config: TimelineConfig, storyboard: Storyboard) -> Self {
        let queue = IntentQueue::default();
        let timeline = StoryboardTimeline::new(
            config,
            storyboard.props(false),
            TimelineCallbacks::queued(&queue),
            CONTAINER_WIDTH,
        );
        Self {
            storyboard,
            timeline,
            queue,
            history: History::new(),
            steps: Vec::new(),
        }
    }

    /// Demo storyboard: four scenes across two environments plus music
    pub fn demo_storyboard() -> Storyboard {
        Storyboard::new(vec![
            Scene::new("opening", 1, 0.0, 6.0).with_environment("beach"),
            Scene::new("arrival", 2, 6.0, 10.0).with_environment("beach"),
            Scene::new("market", 3, 10.0, 18.0).with_environment("town"),
            Scene::new("sunset", 4, 18.0, 24.0).with_environment("beach"),
        ])
        .with_audio_track(AudioTrack::new("score", "Score", 0.0, 26.0))
        .with_audio_track(AudioTrack::new("ambience", "Ambience", 4.0, 20.0))
    }

    /// Container x of a time, at the current scroll
    fn x_at(&self, time: f64) -> f64 {
        let axis = self.timeline.axis();
        self.timeline.config().label_width + axis.time_to_pixel(time) - self.timeline.viewport().scroll_offset
    }

    /// Apply queued intents to the storyboard and push new props
    ///
    /// Everything one gesture proposed becomes a single undo step.
    fn settle(&mut self, action: &str) {
        let intents: Vec<TimelineIntent> = self.queue.borrow_mut().drain(..).collect();
        let mut applied = Vec::new();
        let mut rejected = Vec::new();
        let before = self.storyboard.clone();

        for intent in &intents {
            match self.storyboard.apply(intent) {
                Ok(description) => applied.push(description),
                Err(err) => {
                    tracing::warn!("{action}: {err}");
                    rejected.push(err.to_string());
                }
            }
        }
        if !applied.is_empty() {
            if let Err(err) = self.history.record(action, &before, &self.storyboard) {
                tracing::warn!("Edit not recorded in history: {err}");
            }
        }

        self.timeline.set_props(self.storyboard.props(false));
        tracing::info!("{action}: {} proposed, {} applied", intents.len(), applied.len());
        self.steps.push(StepReport {
            action: action.to_string(),
            intents,
            applied,
            rejected,
        });
    }

    fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.timeline.tick(FRAME);
        }
    }

    fn scene_id(&self, index: usize) -> Option<SceneId> {
        sorted_by_start(&self.storyboard.scenes)
            .get(index)
            .map(|s| s.id.clone())
    }

    /// Drag the scene at `from` onto an edge of the scene at `to`
    pub fn drag_scene(&mut self, from: usize, to: usize, boundary: Boundary) {
        let (Some(dragged), Some(target)) = (self.scene_id(from), self.scene_id(to)) else {
            return;
        };
        let Some(target_scene) = self.storyboard.scenes.iter().find(|s| s.id == target) else {
            return;
        };
        let grab_x = self.storyboard.scenes.iter().find(|s| s.id == dragged).map_or(0.0, |s| s.midpoint());
        let edge_x = self.x_at(target_scene.edge(boundary)) - 4.0;

        self.timeline.scene_drag_start(&dragged, self.x_at(grab_x));
        for step in 1..=4 {
            let x = self.x_at(grab_x) + (edge_x - self.x_at(grab_x)) * f64::from(step) / 4.0;
            self.timeline.scene_drag_over(x);
            self.frames(1);
        }
        self.timeline.scene_drop();
        self.frames(20);
        self.settle(&format!("Drag scene #{from} to the {} of #{to}", boundary.name()));
    }

    /// Drag a trim handle by `delta` seconds
    pub fn trim(&mut self, index: usize, handle: Boundary, delta: f64) {
        let Some(id) = self.scene_id(index) else {
            return;
        };
        let Some(edge) = self.storyboard.scenes.iter().find(|s| s.id == id).map(|s| s.edge(handle)) else {
            return;
        };
        let pps = self.timeline.axis().pixels_per_second();
        let x = self.x_at(edge);
        self.timeline.resize_start(&id, handle, x);
        self.timeline.resize_move(x + delta * pps);
        self.timeline.resize_end();
        self.settle(&format!("Trim {} of #{index} by {delta:+.1}s", handle.name()));
    }

    /// Pick a transition from a scene edge's menu
    pub fn transition(&mut self, index: usize, kind: TransitionKind, boundary: Boundary) {
        let Some(id) = self.scene_id(index) else {
            return;
        };
        if kind == TransitionKind::None {
            self.timeline.remove_transition(&id, boundary);
        } else {
            self.timeline.set_transition(&id, kind, boundary);
        }
        self.settle(&format!("{} on {} of #{index}", kind.name(), boundary.name()));
    }

    /// Pick a transition from the apply-to-all menu
    pub fn transition_all(&mut self, kind: TransitionKind) {
        self.timeline.set_transition_to_all(kind);
        self.settle(&format!("{} on all scenes", kind.name()));
    }

    /// Scrub the ruler from one time to another
    pub fn scrub(&mut self, from: f64, to: f64) {
        let start = self.x_at(from);
        self.timeline.ruler_press(start, 8.0, RULER_HEIGHT);
        self.timeline.playhead_move(self.x_at((from + to) / 2.0));
        self.timeline.playhead_move(self.x_at(to));
        self.timeline.playhead_release();
        self.settle(&format!("Scrub {from:.1}s -> {to:.1}s"));
    }

    /// Drop files from the OS onto a scene
    pub fn drop_files(&mut self, index: usize, files: &[DroppedFile]) {
        let Some(id) = self.scene_id(index) else {
            return;
        };
        self.timeline.set_dragging_files(true);
        self.timeline.media_drop(&id, files);
        self.settle(&format!("Drop {} file(s) on #{index}", files.len()));
    }

    /// Press the add-scene button
    pub fn add_scene(&mut self) {
        self.timeline.add_scene();
        self.settle("Add scene");
    }

    /// Delete an audio track
    pub fn delete_track(&mut self, track_id: &str) {
        self.timeline.delete_track(&track_id.into());
        self.settle(&format!("Delete track {track_id}"));
    }

    /// Click a scene and let the debounce center it
    pub fn focus(&mut self, index: usize) {
        let Some(id) = self.scene_id(index) else {
            return;
        };
        self.timeline.scene_click(&id);
        self.settle(&format!("Focus #{index}"));
        self.frames(5);
    }

    /// Undo the last edit
    pub fn undo(&mut self) -> Result<()> {
        if !self.history.can_undo() {
            tracing::debug!("Nothing to undo");
            return Ok(());
        }
        let description = self.history.undo_description().unwrap_or_default().to_string();
        self.storyboard = self.history.undo()?;
        self.timeline.set_props(self.storyboard.props(false));
        self.steps.push(StepReport {
            action: format!("Undo {description}"),
            intents: Vec::new(),
            applied: Vec::new(),
            rejected: Vec::new(),
        });
        Ok(())
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> Result<()> {
        if !self.history.can_redo() {
            tracing::debug!("Nothing to redo");
            return Ok(());
        }
        self.storyboard = self.history.redo()?;
        self.timeline.set_props(self.storyboard.props(false));
        self.steps.push(StepReport {
            action: "Redo".to_string(),
            intents: Vec::new(),
            applied: Vec::new(),
            rejected: Vec::new(),
        });
        Ok(())
    }

    /// Finish and build the report
    pub fn finish(mut self) -> SessionReport {
        let leaked = self.timeline.unmount();
        if leaked > 0 {
            tracing::warn!(leaked, "Gesture listeners still registered at unmount");
        }
        SessionReport {
            session_id: Uuid::new_v4(),
            layout: self.timeline.layout(),
            steps: std::mem::take(&mut self.steps),
            final_scenes: self.storyboard.scenes.clone(),
            history: self.history.stats(),
        }
    }
}

/// Run the scripted demo
pub fn run_demo(config: TimelineConfig) -> Result<SessionReport> {
    let mut session = Session::new(config, Session::demo_storyboard());

    session.drag_scene(0, 1, Boundary::End);
    session.transition(0, TransitionKind::Crossfade, Boundary::End);
    session.transition(3, TransitionKind::Crossfade, Boundary::End);
    session.transition(2, TransitionKind::FadeToBlack, Boundary::Start);
    session.trim(2, Boundary::End, 3.0);
    session.trim(1, Boundary::Start, 1.5);
    session.trim(2, Boundary::Start, -4.0);
    session.scrub(2.0, 40.0);
    session.drop_files(
        1,
        &[DroppedFile::new("harbor.mov", "video/quicktime"), DroppedFile::new("notes.txt", "text/plain")],
    );
    session.drop_files(2, &[DroppedFile::new("notes.txt", "text/plain")]);
    session.add_scene();
    session.delete_track("ambience");
    session.focus(3);
    session.transition(0, TransitionKind::None, Boundary::End);
    session.transition_all(TransitionKind::ContinuousShot);
    session.undo()?;
    session.redo()?;
    session.undo()?;

    Ok(session.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_timeline::pairing_violations;

    fn order(report: &SessionReport) -> Vec<&str> {
        report.final_scenes.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_drag_step_reorders() {
        let mut session = Session::new(TimelineConfig::default(), Session::demo_storyboard());
        session.drag_scene(0, 1, Boundary::End);
        let report = session.finish();
        assert_eq!(report.steps[0].applied.len(), 1);
        assert_eq!(&order(&report)[..2], ["arrival", "opening"]);
    }

    #[test]
    fn test_rejected_transition_proposes_nothing() {
        let mut session = Session::new(TimelineConfig::default(), Session::demo_storyboard());
        session.transition(3, TransitionKind::Crossfade, Boundary::End);
        let report = session.finish();
        assert!(report.steps[0].intents.is_empty());
        assert!(report.final_scenes.iter().all(|s| s.transition_out == TransitionKind::None));
    }

    #[test]
    fn test_transition_step_is_one_undo() {
        let mut session = Session::new(TimelineConfig::default(), Session::demo_storyboard());
        session.transition(1, TransitionKind::Crossfade, Boundary::End);
        assert_eq!(session.steps[0].intents.len(), 2);
        assert_eq!(session.history.stats().undo_count, 1);
        assert_eq!(session.storyboard.scenes[1].transition_out, TransitionKind::Crossfade);
        assert_eq!(session.storyboard.scenes[2].transition_in, TransitionKind::Crossfade);

        session.undo().unwrap();
        assert_eq!(session.storyboard.scenes[1].transition_out, TransitionKind::None);
        assert_eq!(session.storyboard.scenes[2].transition_in, TransitionKind::None);
    }

    #[test]
    fn test_focus_step_clicks_scene() {
        let mut session = Session::new(TimelineConfig::default(), Session::demo_storyboard());
        session.focus(2);
        assert_eq!(session.storyboard.focused_scene_id, Some(SceneId::from("market")));
        assert_eq!(session.timeline.props().focused_scene_id, Some(SceneId::from("market")));
    }

    #[test]
    fn test_demo_runs_clean() {
        let report = run_demo(TimelineConfig::default()).unwrap();
        assert_eq!(report.steps.len(), 18);
        assert!(report.steps.iter().all(|s| s.rejected.is_empty()));
        assert_eq!(report.steps[14].intents.len(), 8);

        // The last undo took back the apply-to-all; the crossfade removal stays
        let scenes = &report.final_scenes;
        assert_eq!(scenes.len(), 5);
        assert_eq!(scenes[0].transition_out, TransitionKind::None);
        assert_eq!(scenes[1].transition_in, TransitionKind::None);
        assert_eq!(scenes[1].transition_out, TransitionKind::FadeOut);
        assert_eq!(scenes[2].transition_in, TransitionKind::FadeIn);
        assert!(pairing_violations(scenes).is_empty());
        assert_eq!(report.history.redo_count, 1);
        assert!(serde_json::to_string(&report).is_ok());
    }
}
