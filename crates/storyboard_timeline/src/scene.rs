// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene and audio track definitions for the storyboard timeline.

use crate::transition::TransitionKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a scene
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneId(pub String);

impl SceneId {
    /// Create a new random scene ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an audio track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the environment group a scene is shot in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentId(pub String);

impl From<&str> for EnvironmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Production status of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneStatus {
    /// Not yet generated or reviewed
    #[default]
    Draft,
    /// Media generation in progress
    Generating,
    /// Reviewed and accepted
    Approved,
}

/// Edge of a scene in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// Left edge (scene start)
    Start,
    /// Right edge (scene end)
    End,
}

impl Boundary {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// A timed block on the video track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique scene ID
    pub id: SceneId,
    /// Display number, 1-based
    pub scene_number: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds, always greater than `start`
    pub end: f64,
    /// Production status
    pub status: SceneStatus,
    /// Environment group
    pub environment: Option<EnvironmentId>,
    /// Transition applied at the start edge
    pub transition_in: TransitionKind,
    /// Transition applied at the end edge
    pub transition_out: TransitionKind,
    /// Optional title
    pub title: Option<String>,
    /// Attached still image
    pub image_url: Option<String>,
    /// Attached video clip
    pub video_url: Option<String>,
}

impl Scene {
    /// Create a new scene
    pub fn new(id: impl Into<SceneId>, scene_number: u32, start: f64, end: f64) -> Self {
        Self {
            id: id.into(),
            scene_number,
            start,
            end,
            status: SceneStatus::Draft,
            environment: None,
            transition_in: TransitionKind::None,
            transition_out: TransitionKind::None,
            title: None,
            image_url: None,
            video_url: None,
        }
    }

    /// Set the environment group
    pub fn with_environment(mut self, environment: impl Into<EnvironmentId>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set both transitions
    pub fn with_transitions(mut self, transition_in: TransitionKind, transition_out: TransitionKind) -> Self {
        self.transition_in = transition_in;
        self.transition_out = transition_out;
        self
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Time halfway between start and end
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Time of the given edge
    pub fn edge(&self, boundary: Boundary) -> f64 {
        match boundary {
            Boundary::Start => self.start,
            Boundary::End => self.end,
        }
    }

    /// Transition stored on the given edge
    pub fn transition(&self, boundary: Boundary) -> TransitionKind {
        match boundary {
            Boundary::Start => self.transition_in,
            Boundary::End => self.transition_out,
        }
    }

    /// Mutable transition slot on the given edge
    pub fn transition_mut(&mut self, boundary: Boundary) -> &mut TransitionKind {
        match boundary {
            Boundary::Start => &mut self.transition_in,
            Boundary::End => &mut self.transition_out,
        }
    }
}

/// Audio track, only used to extend the rendered timeline length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl AudioTrack {
    /// Create a new audio track
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
        }
    }
}

/// Scenes sorted by start time, as every timeline computation sees them
pub fn sorted_by_start(scenes: &[Scene]) -> Vec<&Scene> {
    let mut sorted: Vec<&Scene> = scenes.iter().collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));
    sorted
}

/// Position of a scene in start order
pub fn sorted_index_of(scenes: &[Scene], scene_id: &SceneId) -> Option<usize> {
    sorted_by_start(scenes).iter().position(|s| &s.id == scene_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_start() {
        let scenes = vec![
            Scene::new("C", 3, 10.0, 15.0),
            Scene::new("A", 1, 0.0, 5.0),
            Scene::new("B", 2, 5.0, 10.0),
        ];
        let ids: Vec<&str> = sorted_by_start(&scenes).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(sorted_index_of(&scenes, &SceneId::from("C")), Some(2));
        assert_eq!(sorted_index_of(&scenes, &SceneId::from("Z")), None);
    }

    #[test]
    fn test_edges_and_transitions() {
        let mut scene = Scene::new("A", 1, 2.0, 6.0)
            .with_transitions(TransitionKind::FadeIn, TransitionKind::None);
        assert_eq!(scene.duration(), 4.0);
        assert_eq!(scene.midpoint(), 4.0);
        assert_eq!(scene.edge(Boundary::End), 6.0);
        assert_eq!(scene.transition(Boundary::Start), TransitionKind::FadeIn);

        *scene.transition_mut(Boundary::End) = TransitionKind::FadeOut;
        assert_eq!(scene.transition_out, TransitionKind::FadeOut);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(SceneId::new(), SceneId::new());
        assert_ne!(TrackId::new(), TrackId::new());
    }
}
