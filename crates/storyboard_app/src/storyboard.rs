// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authoritative storyboard model.
//!
//! The timeline only proposes edits; this is where they are applied.
//! Transition edits arrive one scene edge at a time, already resolved by the
//! timeline's rules, and are written as given.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use storyboard_timeline::{
    apply_reorder, AudioTrack, MediaKind, ReorderIntent, Scene, SceneId, TimelineIntent, TimelineProps, TrackId,
    TransitionKind,
};
use thiserror::Error;

/// Length of a scene created by the add-scene button (s)
const NEW_SCENE_DURATION: f64 = 5.0;

/// Errors applying an edit
#[derive(Debug, Error)]
pub enum StoryboardError {
    /// No scene with this ID
    #[error("Unknown scene: {0}")]
    UnknownScene(SceneId),

    /// No audio track with this ID
    #[error("Unknown audio track: {0}")]
    UnknownTrack(TrackId),

    /// Reorder indices do not fit the scene list
    #[error("Cannot move scene {from} next to scene {to}")]
    InvalidReorder {
        /// Source index
        from: usize,
        /// Target index
        to: usize,
    },

    /// Resize would leave an empty or inverted scene
    #[error("Invalid range {start}..{end} for scene {scene_id}")]
    InvalidRange {
        /// Scene
        scene_id: SceneId,
        /// Requested start
        start: f64,
        /// Requested end
        end: f64,
    },
}

/// Result type for storyboard edits
pub type Result<T> = std::result::Result<T, StoryboardError>;

/// Scene list, audio tracks and playback state of one project
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Storyboard {
    /// Scenes in start order
    pub scenes: Vec<Scene>,
    /// Audio tracks by ID, in insertion order
    pub audio_tracks: IndexMap<TrackId, AudioTrack>,
    /// Playback position (s)
    pub current_time: f64,
    /// Timeline zoom level
    pub zoom_level: f64,
    /// Scene highlighted in the editor
    pub focused_scene_id: Option<SceneId>,
}

impl Storyboard {
    /// Create a storyboard from scenes
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            zoom_level: 10.0,
            ..Self::default()
        }
    }

    /// Add an audio track
    pub fn with_audio_track(mut self, track: AudioTrack) -> Self {
        self.audio_tracks.insert(track.id.clone(), track);
        self
    }

    /// Project length: the end of the last scene
    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.end).fold(0.0, f64::max)
    }

    /// Props for the timeline component
    pub fn props(&self, is_playing: bool) -> TimelineProps {
        TimelineProps {
            scenes: self.scenes.clone(),
            audio_tracks: self.audio_tracks.values().cloned().collect(),
            total_duration: self.total_duration(),
            current_time: self.current_time,
            zoom_level: self.zoom_level,
            focused_scene_id: self.focused_scene_id.clone(),
            is_playing,
        }
    }

    fn scene_mut(&mut self, scene_id: &SceneId) -> Result<&mut Scene> {
        self.scenes
            .iter_mut()
            .find(|s| &s.id == scene_id)
            .ok_or_else(|| StoryboardError::UnknownScene(scene_id.clone()))
    }

    /// Append a scene after the last one with a fresh ID
    pub fn add_scene(&mut self) -> SceneId {
        let start = self.total_duration();
        let scene = Scene::new(SceneId::new(), self.scenes.len() as u32 + 1, start, start + NEW_SCENE_DURATION);
        let id = scene.id.clone();
        tracing::info!("Added scene {} at {start:.1}s", scene.scene_number);
        self.scenes.push(scene);
        id
    }

    /// Apply a timeline intent; returns a description for the history
    pub fn apply(&mut self, intent: &TimelineIntent) -> Result<String> {
        match intent {
            TimelineIntent::Reorder { scene_id, from_index, to_index, boundary } => {
                let reorder = ReorderIntent {
                    scene_id: scene_id.clone(),
                    from_index: *from_index,
                    to_index: *to_index,
                    boundary: *boundary,
                };
                if !apply_reorder(&mut self.scenes, &reorder) {
                    return Err(StoryboardError::InvalidReorder { from: *from_index, to: *to_index });
                }
                Ok(format!("Move scene {scene_id} to the {} of #{to_index}", boundary.name()))
            }
            TimelineIntent::Resize { scene_id, start, end } => {
                if end <= start {
                    return Err(StoryboardError::InvalidRange {
                        scene_id: scene_id.clone(),
                        start: *start,
                        end: *end,
                    });
                }
                let scene = self.scene_mut(scene_id)?;
                scene.start = *start;
                scene.end = *end;
                Ok(format!("Trim scene {scene_id} to {start:.2}..{end:.2}"))
            }
            TimelineIntent::Seek { time } => {
                self.current_time = *time;
                Ok(format!("Seek to {time:.2}s"))
            }
            TimelineIntent::SetTransition { scene_id, kind, boundary } => {
                *self.scene_mut(scene_id)?.transition_mut(*boundary) = *kind;
                Ok(format!("Set {} on {} of {scene_id}", kind.name(), boundary.name()))
            }
            TimelineIntent::RemoveTransition { scene_id, boundary } => {
                *self.scene_mut(scene_id)?.transition_mut(*boundary) = TransitionKind::None;
                Ok(format!("Clear transition on {} of {scene_id}", boundary.name()))
            }
            TimelineIntent::SceneClick { scene_id } => {
                self.scene_mut(scene_id)?;
                self.focused_scene_id = Some(scene_id.clone());
                Ok(format!("Focus {scene_id}"))
            }
            TimelineIntent::MediaDrop { scene_id, file, kind } => {
                let scene = self.scene_mut(scene_id)?;
                match kind {
                    MediaKind::Image => scene.image_url = Some(file.name.clone()),
                    MediaKind::Video => scene.video_url = Some(file.name.clone()),
                }
                Ok(format!("Attach {} to {scene_id}", file.name))
            }
            TimelineIntent::AddScene => {
                let id = self.add_scene();
                Ok(format!("Add scene {id}"))
            }
            TimelineIntent::DeleteTrack { track_id } => {
                let track = self
                    .audio_tracks
                    .shift_remove(track_id)
                    .ok_or_else(|| StoryboardError::UnknownTrack(track_id.clone()))?;
                Ok(format!("Delete track {}", track.name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_timeline::Boundary;

    fn storyboard() -> Storyboard {
        Storyboard::new(vec![
            Scene::new("A", 1, 0.0, 5.0),
            Scene::new("B", 2, 5.0, 10.0),
            Scene::new("C", 3, 10.0, 15.0),
        ])
        .with_audio_track(AudioTrack::new("music", "Music", 0.0, 20.0))
        .with_audio_track(AudioTrack::new("vo", "Voice-over", 2.0, 12.0))
    }

    #[test]
    fn test_apply_reorder() {
        let mut board = storyboard();
        board
            .apply(&TimelineIntent::Reorder {
                scene_id: SceneId::from("A"),
                from_index: 0,
                to_index: 1,
                boundary: Boundary::End,
            })
            .unwrap();
        let ids: Vec<&str> = board.scenes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn test_transition_edits_write_one_edge() {
        let mut board = storyboard();
        board
            .apply(&TimelineIntent::SetTransition {
                scene_id: SceneId::from("B"),
                kind: TransitionKind::FadeIn,
                boundary: Boundary::Start,
            })
            .unwrap();
        assert_eq!(board.scenes[1].transition_in, TransitionKind::FadeIn);
        assert_eq!(board.scenes[0].transition_out, TransitionKind::None);

        board
            .apply(&TimelineIntent::RemoveTransition { scene_id: SceneId::from("B"), boundary: Boundary::Start })
            .unwrap();
        assert_eq!(board.scenes[1].transition_in, TransitionKind::None);

        let before = board.clone();
        let err = board
            .apply(&TimelineIntent::SetTransition {
                scene_id: SceneId::from("Z"),
                kind: TransitionKind::Crossfade,
                boundary: Boundary::End,
            })
            .unwrap_err();
        assert!(matches!(err, StoryboardError::UnknownScene(_)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_scene_click_sets_focus() {
        let mut board = storyboard();
        board.apply(&TimelineIntent::SceneClick { scene_id: SceneId::from("C") }).unwrap();
        assert_eq!(board.focused_scene_id, Some(SceneId::from("C")));
        assert!(board.apply(&TimelineIntent::SceneClick { scene_id: SceneId::from("Z") }).is_err());
        assert_eq!(board.focused_scene_id, Some(SceneId::from("C")));
    }

    #[test]
    fn test_add_scene_and_delete_track() {
        let mut board = storyboard();
        board.apply(&TimelineIntent::AddScene).unwrap();
        let added = board.scenes.last().unwrap();
        assert_eq!((added.start, added.end, added.scene_number), (15.0, 20.0, 4));
        assert_ne!(added.id, SceneId::from("C"));

        board.apply(&TimelineIntent::DeleteTrack { track_id: TrackId::from("music") }).unwrap();
        let names: Vec<&str> = board.audio_tracks.values().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Voice-over"]);
        assert!(matches!(
            board.apply(&TimelineIntent::DeleteTrack { track_id: TrackId::from("music") }),
            Err(StoryboardError::UnknownTrack(_))
        ));
    }

    #[test]
    fn test_resize_validation() {
        let mut board = storyboard();
        let err = board
            .apply(&TimelineIntent::Resize { scene_id: SceneId::from("A"), start: 4.0, end: 4.0 })
            .unwrap_err();
        assert!(matches!(err, StoryboardError::InvalidRange { .. }));

        board
            .apply(&TimelineIntent::Resize { scene_id: SceneId::from("A"), start: 0.0, end: 8.0 })
            .unwrap();
        assert_eq!(board.scenes[0].end, 8.0);
    }

    #[test]
    fn test_props_follow_model() {
        let board = storyboard();
        let props = board.props(true);
        assert_eq!(props.total_duration, 15.0);
        assert_eq!(props.audio_tracks.len(), 2);
        assert!(props.is_playing);
    }
}
