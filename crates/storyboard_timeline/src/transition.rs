// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition kinds and the rules that keep adjacent scenes consistent.
//!
//! Requests are resolved through a dispatch table keyed by
//! `(TransitionKind, Boundary)`. Each rule writes into a [`MutationPlan`],
//! which reads back its own pending writes so rules can be chained (unpair
//! first, then set). The resulting mutation list is what the host applies.
//!
//! Paired kinds (crossfade, continuous shot) always occupy both halves of a
//! boundary: `prev.transition_out == next.transition_in == kind`.

use crate::scene::{sorted_by_start, Boundary, Scene, SceneId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transition applied to a scene edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// No transition
    #[default]
    None,
    /// Fade from black at the scene start
    FadeIn,
    /// Fade to black at the scene end
    FadeOut,
    /// Fade out of one scene and into the next through black
    FadeToBlack,
    /// Blend across the boundary between two scenes
    Crossfade,
    /// The shot continues across the boundary
    ContinuousShot,
}

impl TransitionKind {
    /// Whether the kind only exists as a matched pair across a boundary
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Crossfade | Self::ContinuousShot)
    }

    /// Short label shown on the transitions track
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::FadeIn => "FI",
            Self::FadeOut => "FO",
            Self::FadeToBlack => "FTB",
            Self::Crossfade => "XF",
            Self::ContinuousShot => "CS",
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::FadeIn => "Fade In",
            Self::FadeOut => "Fade Out",
            Self::FadeToBlack => "Fade to Black",
            Self::Crossfade => "Crossfade",
            Self::ContinuousShot => "Continuous Shot",
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [TransitionKind] {
        &[
            Self::None,
            Self::FadeIn,
            Self::FadeOut,
            Self::FadeToBlack,
            Self::Crossfade,
            Self::ContinuousShot,
        ]
    }
}

/// Rejected transition requests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// The scene is not in the list
    #[error("Scene not found: {0}")]
    UnknownScene(SceneId),

    /// A paired kind needs an adjacent scene on that side
    #[error("Cannot set {kind:?} at the {} of {scene_id}: no adjacent scene", .boundary.name())]
    NoNeighbor {
        /// Requested scene
        scene_id: SceneId,
        /// Requested edge
        boundary: Boundary,
        /// Requested kind
        kind: TransitionKind,
    },

    /// The kind does not apply to that edge
    #[error("{kind:?} cannot be placed at a scene {}", .boundary.name())]
    WrongBoundary {
        /// Requested kind
        kind: TransitionKind,
        /// Requested edge
        boundary: Boundary,
    },
}

/// Result type for transition rules
pub type Result<T> = std::result::Result<T, TransitionError>;

/// One write to a scene's transition field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// Target scene
    pub scene_id: SceneId,
    /// Edge whose transition changes (`Start` = `transition_in`)
    pub boundary: Boundary,
    /// New value
    pub value: TransitionKind,
}

/// Pending writes, collapsed per (scene, edge)
#[derive(Debug, Default)]
pub struct MutationPlan {
    entries: Vec<Mutation>,
}

impl MutationPlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of an edge after the writes planned so far
    pub fn current(&self, scene: &Scene, boundary: Boundary) -> TransitionKind {
        self.entries
            .iter()
            .find(|m| m.scene_id == scene.id && m.boundary == boundary)
            .map(|m| m.value)
            .unwrap_or_else(|| scene.transition(boundary))
    }

    /// Plan a write, replacing an earlier write to the same edge
    pub fn set(&mut self, scene_id: &SceneId, boundary: Boundary, value: TransitionKind) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|m| &m.scene_id == scene_id && m.boundary == boundary)
        {
            entry.value = value;
        } else {
            self.entries.push(Mutation {
                scene_id: scene_id.clone(),
                boundary,
                value,
            });
        }
    }

    /// Drop writes that leave a field unchanged and return the rest
    pub fn finish(self, scenes: &[Scene]) -> Vec<Mutation> {
        self.entries
            .into_iter()
            .filter(|m| {
                scenes
                    .iter()
                    .find(|s| s.id == m.scene_id)
                    .map_or(true, |s| s.transition(m.boundary) != m.value)
            })
            .collect()
    }
}

/// A scene with its neighbors in start order
struct Neighborhood<'a> {
    scene: &'a Scene,
    prev: Option<&'a Scene>,
    next: Option<&'a Scene>,
}

impl<'a> Neighborhood<'a> {
    fn at(sorted: &[&'a Scene], index: usize) -> Self {
        Self {
            scene: sorted[index],
            prev: index.checked_sub(1).map(|i| sorted[i]),
            next: sorted.get(index + 1).copied(),
        }
    }

    /// Scene across the given edge
    fn across(&self, boundary: Boundary) -> Option<&'a Scene> {
        match boundary {
            Boundary::Start => self.prev,
            Boundary::End => self.next,
        }
    }
}

/// Edge of the neighbor that faces the given edge
fn facing(boundary: Boundary) -> Boundary {
    match boundary {
        Boundary::Start => Boundary::End,
        Boundary::End => Boundary::Start,
    }
}

type Rule = fn(&mut MutationPlan, &Neighborhood<'_>, TransitionKind, Boundary) -> Result<()>;

/// Dispatch table: which rule handles a request
fn rule_for(kind: TransitionKind, boundary: Boundary) -> Option<Rule> {
    match (kind, boundary) {
        (TransitionKind::None, _) => Some(clear_edge),
        (TransitionKind::FadeIn, Boundary::Start) | (TransitionKind::FadeOut, Boundary::End) => {
            Some(set_single_sided)
        }
        (TransitionKind::FadeIn, Boundary::End) | (TransitionKind::FadeOut, Boundary::Start) => None,
        (TransitionKind::FadeToBlack, _) => Some(cascade_through_black),
        (TransitionKind::Crossfade | TransitionKind::ContinuousShot, _) => Some(pair_with_neighbor),
    }
}

/// Clear a paired edge together with the neighbor half facing it
fn unpair(plan: &mut MutationPlan, hood: &Neighborhood<'_>, boundary: Boundary) {
    if !plan.current(hood.scene, boundary).is_paired() {
        return;
    }
    plan.set(&hood.scene.id, boundary, TransitionKind::None);
    if let Some(neighbor) = hood.across(boundary) {
        if plan.current(neighbor, facing(boundary)).is_paired() {
            plan.set(&neighbor.id, facing(boundary), TransitionKind::None);
        }
    }
}

fn clear_edge(plan: &mut MutationPlan, hood: &Neighborhood<'_>, _kind: TransitionKind, boundary: Boundary) -> Result<()> {
    unpair(plan, hood, boundary);
    plan.set(&hood.scene.id, boundary, TransitionKind::None);
    Ok(())
}

fn set_single_sided(plan: &mut MutationPlan, hood: &Neighborhood<'_>, kind: TransitionKind, boundary: Boundary) -> Result<()> {
    unpair(plan, hood, boundary);
    plan.set(&hood.scene.id, boundary, kind);
    Ok(())
}

fn cascade_through_black(plan: &mut MutationPlan, hood: &Neighborhood<'_>, _kind: TransitionKind, boundary: Boundary) -> Result<()> {
    unpair(plan, hood, boundary);
    let (own, across) = match boundary {
        Boundary::Start => (TransitionKind::FadeIn, TransitionKind::FadeOut),
        Boundary::End => (TransitionKind::FadeOut, TransitionKind::FadeIn),
    };
    plan.set(&hood.scene.id, boundary, own);
    if let Some(neighbor) = hood.across(boundary) {
        plan.set(&neighbor.id, facing(boundary), across);
    }
    Ok(())
}

fn pair_with_neighbor(plan: &mut MutationPlan, hood: &Neighborhood<'_>, kind: TransitionKind, boundary: Boundary) -> Result<()> {
    let Some(neighbor) = hood.across(boundary) else {
        return Err(TransitionError::NoNeighbor {
            scene_id: hood.scene.id.clone(),
            boundary,
            kind,
        });
    };
    plan.set(&hood.scene.id, boundary, kind);
    plan.set(&neighbor.id, facing(boundary), kind);
    Ok(())
}

fn plan_request(
    plan: &mut MutationPlan,
    sorted: &[&Scene],
    index: usize,
    kind: TransitionKind,
    boundary: Boundary,
) -> Result<()> {
    let rule = rule_for(kind, boundary).ok_or(TransitionError::WrongBoundary { kind, boundary })?;
    rule(plan, &Neighborhood::at(sorted, index), kind, boundary)
}

/// Mutations needed to set `kind` at one edge of a scene
pub fn apply_transition(
    scenes: &[Scene],
    scene_id: &SceneId,
    kind: TransitionKind,
    boundary: Boundary,
) -> Result<Vec<Mutation>> {
    let sorted = sorted_by_start(scenes);
    let index = sorted
        .iter()
        .position(|s| &s.id == scene_id)
        .ok_or_else(|| TransitionError::UnknownScene(scene_id.clone()))?;

    let mut plan = MutationPlan::new();
    plan_request(&mut plan, &sorted, index, kind, boundary)?;
    let mutations = plan.finish(scenes);
    tracing::debug!(
        scene = %scene_id,
        ?kind,
        boundary = boundary.name(),
        count = mutations.len(),
        "Planned transition"
    );
    Ok(mutations)
}

/// Mutations needed to clear one edge of a scene
pub fn remove_transition(scenes: &[Scene], scene_id: &SceneId, boundary: Boundary) -> Result<Vec<Mutation>> {
    apply_transition(scenes, scene_id, TransitionKind::None, boundary)
}

/// Mutations needed to put `kind` on every scene
///
/// Paired kinds link every adjacent pair, fades go on every start or end,
/// fade-to-black bridges every boundary, and `None` clears everything.
pub fn apply_transition_to_all(scenes: &[Scene], kind: TransitionKind) -> Result<Vec<Mutation>> {
    let sorted = sorted_by_start(scenes);
    let mut plan = MutationPlan::new();

    for index in 0..sorted.len() {
        let is_last = index + 1 == sorted.len();
        match kind {
            TransitionKind::None => {
                plan_request(&mut plan, &sorted, index, kind, Boundary::Start)?;
                plan_request(&mut plan, &sorted, index, kind, Boundary::End)?;
            }
            TransitionKind::FadeIn | TransitionKind::FadeToBlack => {
                plan_request(&mut plan, &sorted, index, kind, Boundary::Start)?;
                if kind == TransitionKind::FadeToBlack && is_last {
                    plan_request(&mut plan, &sorted, index, kind, Boundary::End)?;
                }
            }
            TransitionKind::FadeOut => {
                plan_request(&mut plan, &sorted, index, kind, Boundary::End)?;
            }
            TransitionKind::Crossfade | TransitionKind::ContinuousShot => {
                if !is_last {
                    plan_request(&mut plan, &sorted, index, kind, Boundary::End)?;
                }
            }
        }
    }

    Ok(plan.finish(scenes))
}

/// Write mutations into a scene list, returns how many fields changed
pub fn apply_mutations(scenes: &mut [Scene], mutations: &[Mutation]) -> usize {
    let mut changed = 0;
    for mutation in mutations {
        if let Some(scene) = scenes.iter_mut().find(|s| s.id == mutation.scene_id) {
            let slot = scene.transition_mut(mutation.boundary);
            if *slot != mutation.value {
                *slot = mutation.value;
                changed += 1;
            }
        }
    }
    changed
}

/// Edges holding a paired kind whose facing neighbor half does not match
pub fn pairing_violations(scenes: &[Scene]) -> Vec<(SceneId, Boundary)> {
    let sorted = sorted_by_start(scenes);
    let mut violations = Vec::new();

    for index in 0..sorted.len() {
        let hood = Neighborhood::at(&sorted, index);
        for boundary in [Boundary::Start, Boundary::End] {
            let kind = hood.scene.transition(boundary);
            if !kind.is_paired() {
                continue;
            }
            let matched = hood
                .across(boundary)
                .is_some_and(|n| n.transition(facing(boundary)) == kind);
            if !matched {
                violations.push((hood.scene.id.clone(), boundary));
            }
        }
    }

    violations
}

/// Mutations clearing every unmatched paired half, e.g. after a reorder
pub fn repair_pairings(scenes: &[Scene]) -> Vec<Mutation> {
    pairing_violations(scenes)
        .into_iter()
        .map(|(scene_id, boundary)| Mutation {
            scene_id,
            boundary,
            value: TransitionKind::None,
        })
        .collect()
}
