// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storyboard timeline interaction core.
//!
//! This crate provides the editing logic behind a video storyboard timeline:
//! - Drag-to-reorder of scene blocks with boundary magnet
//! - Trim handles with clamped live preview
//! - Playhead seeking, scrubbing and auto-centering
//! - Transition pairing and cascade rules between adjacent scenes
//! - Edge auto-scroll while dragging
//!
//! ## Architecture
//!
//! The timeline is built on:
//! - A pure time axis mapping seconds to pixels
//! - Explicit gesture state machines driven by pointer events
//! - A transition rule table producing mutation lists
//! - Optional host callbacks; the host owns the scene list
//!
//! Nothing here reads a clock or renders; the host supplies frame time
//! through [`StoryboardTimeline::tick`] and draws [`TimelineLayout`].

pub mod auto_scroll;
pub mod config;
pub mod drag;
pub mod layout;
pub mod listeners;
pub mod media;
pub mod playhead;
pub mod resize;
pub mod scene;
pub mod time_axis;
pub mod timeline;
pub mod transition;
pub mod viewport;

pub use auto_scroll::{AutoScrollController, ScrollDirection, ScrollTask};
pub use config::{ConfigError, TimelineConfig};
pub use drag::{apply_reorder, DragPhase, DragReorderController, DragState, DropOutcome, ReorderIntent};
pub use layout::{RulerMark, SceneBlock, TimelineLayout};
pub use listeners::{GestureKind, ListenerHandle, ListenerRegistry};
pub use media::{classify, DroppedFile, MediaKind};
pub use playhead::{FocusTracker, PlayheadController, SeekGesture};
pub use resize::{ResizeController, ResizeIntent, ResizeState};
pub use scene::{AudioTrack, Boundary, EnvironmentId, Scene, SceneId, SceneStatus, TrackId};
pub use time_axis::{extended_duration, format_timecode, TimeAxis};
pub use timeline::{IntentQueue, StoryboardTimeline, TimelineCallbacks, TimelineIntent, TimelineProps};
pub use transition::{
    apply_mutations, apply_transition, apply_transition_to_all, pairing_violations, remove_transition,
    repair_pairings, Mutation, TransitionError, TransitionKind,
};
pub use viewport::{ScrollBehavior, ScrollRequest, Viewport};
