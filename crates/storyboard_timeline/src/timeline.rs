// SPDX-License-Identifier: MIT OR Apache-2.0
//! The storyboard timeline component.
//!
//! [`StoryboardTimeline`] owns the viewport, the gesture controllers and the
//! listener registry. The host feeds it props and pointer events; committed
//! edits come back through the optional callbacks. A missing callback turns
//! the matching capability off.

use crate::auto_scroll::AutoScrollController;
use crate::config::TimelineConfig;
use crate::drag::{DragPhase, DragReorderController, DropOutcome, ReorderIntent};
use crate::layout::{environment_relation, ruler, SceneBlock, TimelineLayout};
use crate::listeners::{GestureKind, ListenerRegistry};
use crate::media::{first_media, shows_drop_indicator, DroppedFile, MediaKind};
use crate::playhead::{FocusTracker, PlayheadController};
use crate::resize::{ResizeController, ResizeIntent};
use crate::scene::{sorted_by_start, AudioTrack, Boundary, Scene, SceneId, TrackId};
use crate::time_axis::TimeAxis;
use crate::transition::{self, Mutation, TransitionKind};
use crate::viewport::{ScrollRequest, Viewport};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Inputs owned by the host
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineProps {
    /// Scenes on the video track
    pub scenes: Vec<Scene>,
    /// Audio tracks, used for the timeline length
    pub audio_tracks: Vec<AudioTrack>,
    /// Nominal project length (s)
    pub total_duration: f64,
    /// Playback position (s)
    pub current_time: f64,
    /// Zoom level, 0 fits the container
    pub zoom_level: f64,
    /// Scene highlighted by the host
    pub focused_scene_id: Option<SceneId>,
    /// Whether playback is running
    pub is_playing: bool,
}

/// Edit proposed by the timeline, for hosts that queue edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TimelineIntent {
    /// Move a scene next to another one
    Reorder {
        /// Dragged scene
        scene_id: SceneId,
        /// Original index in start order
        from_index: usize,
        /// Target index in start order
        to_index: usize,
        /// Side of the target
        boundary: Boundary,
    },
    /// Trim a scene
    Resize {
        /// Trimmed scene
        scene_id: SceneId,
        /// New start (s)
        start: f64,
        /// New end (s)
        end: f64,
    },
    /// Move the playhead
    Seek {
        /// Target time (s)
        time: f64,
    },
    /// Set a transition on a scene edge
    SetTransition {
        /// Scene
        scene_id: SceneId,
        /// Transition to apply
        kind: TransitionKind,
        /// Edge
        boundary: Boundary,
    },
    /// Clear a transition from a scene edge
    RemoveTransition {
        /// Scene
        scene_id: SceneId,
        /// Edge
        boundary: Boundary,
    },
    /// Attach dropped media to a scene
    MediaDrop {
        /// Target scene
        scene_id: SceneId,
        /// Dropped file
        file: DroppedFile,
        /// Media classification
        kind: MediaKind,
    },
    /// Focus a scene
    SceneClick {
        /// Clicked scene
        scene_id: SceneId,
    },
    /// Append a scene
    AddScene,
    /// Delete an audio track
    DeleteTrack {
        /// Track to delete
        track_id: TrackId,
    },
}

impl From<ReorderIntent> for TimelineIntent {
    fn from(intent: ReorderIntent) -> Self {
        Self::Reorder {
            scene_id: intent.scene_id,
            from_index: intent.from_index,
            to_index: intent.to_index,
            boundary: intent.boundary,
        }
    }
}

/// Shared queue collecting intents from [`TimelineCallbacks::queued`]
pub type IntentQueue = Rc<RefCell<Vec<TimelineIntent>>>;

/// Optional host callbacks
#[derive(Default)]
pub struct TimelineCallbacks {
    /// A drop proposes a reorder
    pub on_scene_reorder: Option<Box<dyn FnMut(&ReorderIntent)>>,
    /// A resize was committed
    pub on_scene_resize: Option<Box<dyn FnMut(&SceneId, f64, f64)>>,
    /// The user moved the playhead
    pub on_time_change: Option<Box<dyn FnMut(f64)>>,
    /// A scene block was clicked
    pub on_scene_click: Option<Box<dyn FnMut(&SceneId)>>,
    /// A scene edge takes a new transition, once per changed edge
    pub on_transition_set: Option<Box<dyn FnMut(&SceneId, TransitionKind, Boundary)>>,
    /// A scene edge loses its transition, once per cleared edge
    pub on_transition_remove: Option<Box<dyn FnMut(&SceneId, Boundary)>>,
    /// Media was dropped onto a scene
    pub on_scene_media_drop: Option<Box<dyn FnMut(&SceneId, &DroppedFile, MediaKind)>>,
    /// The add-scene button was pressed
    pub on_add_scene: Option<Box<dyn FnMut()>>,
    /// An audio track delete was requested
    pub on_track_delete: Option<Box<dyn FnMut(&TrackId)>>,
}

impl TimelineCallbacks {
    /// No callbacks: a read-only timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Every callback pushes a [`TimelineIntent`] onto `queue`
    pub fn queued(queue: &IntentQueue) -> Self {
        let q = Rc::clone(queue);
        let reorder = move |intent: &ReorderIntent| q.borrow_mut().push(intent.clone().into());
        let q = Rc::clone(queue);
        let resize = move |scene_id: &SceneId, start, end| {
            q.borrow_mut().push(TimelineIntent::Resize { scene_id: scene_id.clone(), start, end });
        };
        let q = Rc::clone(queue);
        let click = move |scene_id: &SceneId| {
            q.borrow_mut().push(TimelineIntent::SceneClick { scene_id: scene_id.clone() });
        };
        let q = Rc::clone(queue);
        let seek = move |time| q.borrow_mut().push(TimelineIntent::Seek { time });
        let q = Rc::clone(queue);
        let set = move |scene_id: &SceneId, kind, boundary| {
            q.borrow_mut().push(TimelineIntent::SetTransition { scene_id: scene_id.clone(), kind, boundary });
        };
        let q = Rc::clone(queue);
        let remove = move |scene_id: &SceneId, boundary| {
            q.borrow_mut().push(TimelineIntent::RemoveTransition { scene_id: scene_id.clone(), boundary });
        };
        let q = Rc::clone(queue);
        let media = move |scene_id: &SceneId, file: &DroppedFile, kind| {
            q.borrow_mut().push(TimelineIntent::MediaDrop {
                scene_id: scene_id.clone(),
                file: file.clone(),
                kind,
            });
        };
        let q = Rc::clone(queue);
        let add = move || q.borrow_mut().push(TimelineIntent::AddScene);
        let q = Rc::clone(queue);
        let delete = move |track_id: &TrackId| {
            q.borrow_mut().push(TimelineIntent::DeleteTrack { track_id: track_id.clone() });
        };

        Self::new()
            .with_scene_reorder(reorder)
            .with_scene_resize(resize)
            .with_scene_click(click)
            .with_time_change(seek)
            .with_transition_set(set)
            .with_transition_remove(remove)
            .with_scene_media_drop(media)
            .with_add_scene(add)
            .with_track_delete(delete)
    }

    /// Enable reordering
    pub fn with_scene_reorder(mut self, f: impl FnMut(&ReorderIntent) + 'static) -> Self {
        self.on_scene_reorder = Some(Box::new(f));
        self
    }

    /// Enable trimming
    pub fn with_scene_resize(mut self, f: impl FnMut(&SceneId, f64, f64) + 'static) -> Self {
        self.on_scene_resize = Some(Box::new(f));
        self
    }

    /// Enable scene focus by click
    pub fn with_scene_click(mut self, f: impl FnMut(&SceneId) + 'static) -> Self {
        self.on_scene_click = Some(Box::new(f));
        self
    }

    /// Enable seeking
    pub fn with_time_change(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_time_change = Some(Box::new(f));
        self
    }

    /// Enable setting transitions
    pub fn with_transition_set(mut self, f: impl FnMut(&SceneId, TransitionKind, Boundary) + 'static) -> Self {
        self.on_transition_set = Some(Box::new(f));
        self
    }

    /// Enable clearing transitions
    pub fn with_transition_remove(mut self, f: impl FnMut(&SceneId, Boundary) + 'static) -> Self {
        self.on_transition_remove = Some(Box::new(f));
        self
    }

    /// Enable media drops
    pub fn with_scene_media_drop(mut self, f: impl FnMut(&SceneId, &DroppedFile, MediaKind) + 'static) -> Self {
        self.on_scene_media_drop = Some(Box::new(f));
        self
    }

    /// Enable the add-scene button
    pub fn with_add_scene(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_add_scene = Some(Box::new(f));
        self
    }

    /// Enable audio track deletion
    pub fn with_track_delete(mut self, f: impl FnMut(&TrackId) + 'static) -> Self {
        self.on_track_delete = Some(Box::new(f));
        self
    }

    /// Report planned transition writes one edge at a time
    ///
    /// Cleared edges go to `on_transition_remove` when it is set, otherwise to
    /// `on_transition_set` with [`TransitionKind::None`].
    fn emit_transition_writes(&mut self, mutations: &[Mutation]) {
        for mutation in mutations {
            if mutation.value == TransitionKind::None {
                if let Some(on_transition_remove) = &mut self.on_transition_remove {
                    on_transition_remove(&mutation.scene_id, mutation.boundary);
                    continue;
                }
            }
            if let Some(on_transition_set) = &mut self.on_transition_set {
                on_transition_set(&mutation.scene_id, mutation.value, mutation.boundary);
            }
        }
    }
}

impl fmt::Debug for TimelineCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineCallbacks")
            .field("on_scene_reorder", &self.on_scene_reorder.is_some())
            .field("on_scene_resize", &self.on_scene_resize.is_some())
            .field("on_scene_click", &self.on_scene_click.is_some())
            .field("on_time_change", &self.on_time_change.is_some())
            .field("on_transition_set", &self.on_transition_set.is_some())
            .field("on_transition_remove", &self.on_transition_remove.is_some())
            .field("on_scene_media_drop", &self.on_scene_media_drop.is_some())
            .field("on_add_scene", &self.on_add_scene.is_some())
            .field("on_track_delete", &self.on_track_delete.is_some())
            .finish()
    }
}

/// Storyboard timeline state
#[derive(Debug)]
pub struct StoryboardTimeline {
    config: TimelineConfig,
    props: TimelineProps,
    callbacks: TimelineCallbacks,
    viewport: Viewport,
    drag: DragReorderController,
    resize: ResizeController,
    playhead: PlayheadController,
    focus: FocusTracker,
    auto_scroll: AutoScrollController,
    listeners: ListenerRegistry,
    dragging_files: bool,
}

impl StoryboardTimeline {
    /// Mount a timeline in a container `container_width` pixels wide
    pub fn new(
        config: TimelineConfig,
        props: TimelineProps,
        callbacks: TimelineCallbacks,
        container_width: f64,
    ) -> Self {
        let mut timeline = Self {
            viewport: Viewport::new(container_width, props.zoom_level),
            drag: DragReorderController::new(&config),
            resize: ResizeController::new(&config),
            playhead: PlayheadController::new(&config),
            focus: FocusTracker::new(&config),
            auto_scroll: AutoScrollController::new(&config),
            listeners: ListenerRegistry::new(),
            dragging_files: false,
            config,
            props: TimelineProps::default(),
            callbacks,
        };
        timeline.set_props(props);
        timeline
    }

    /// Settings in use
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Current props
    pub fn props(&self) -> &TimelineProps {
        &self.props
    }

    /// Viewport state
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Drag controller state
    pub fn drag_phase(&self) -> &DragPhase {
        self.drag.phase()
    }

    /// Registered listener pairs
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Time axis for the current props and viewport
    pub fn axis(&self) -> TimeAxis {
        TimeAxis::for_content(
            &self.config,
            &self.props.scenes,
            &self.props.audio_tracks,
            self.props.total_duration,
            self.viewport.zoom_level,
            self.viewport.container_width,
        )
    }

    fn max_scroll(&self) -> f64 {
        self.viewport.max_scroll(&self.config, &self.axis())
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        self.viewport.scroll_to(self.viewport.scroll_offset, max);
    }

    fn apply_scroll(&mut self, request: Option<ScrollRequest>) -> Option<ScrollRequest> {
        let request = request?;
        let max = self.max_scroll();
        self.viewport.apply(request, max);
        Some(request)
    }

    fn emit_time(&mut self, time: f64) {
        if let Some(on_time_change) = &mut self.callbacks.on_time_change {
            on_time_change(time);
        }
    }

    /// Replace the props after the host applied an edit or playback moved
    ///
    /// Returns the scroll request issued to keep the playhead visible, if any.
    pub fn set_props(&mut self, props: TimelineProps) -> Option<ScrollRequest> {
        self.props = props;
        self.viewport.zoom_level = self.props.zoom_level;
        self.clamp_scroll();
        self.focus.observe(self.props.focused_scene_id.as_ref(), self.viewport.zoom_level);

        let axis = self.axis();
        let request = self.playhead.follow(
            self.props.current_time,
            self.props.is_playing,
            &self.viewport,
            &axis,
            &self.config,
        );
        self.apply_scroll(request)
    }

    /// The container was resized
    pub fn set_container_width(&mut self, width: f64) {
        self.viewport.container_width = width;
        self.clamp_scroll();
    }

    /// Mouse wheel over the timeline
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64) -> Option<ScrollRequest> {
        let max = self.max_scroll();
        self.viewport.wheel(delta_x, delta_y, max)
    }

    /// Step the zoom in
    pub fn zoom_in(&mut self) -> f64 {
        let axis = self.axis();
        self.props.zoom_level = self.viewport.zoom_in(&self.config, &axis);
        self.focus.observe(self.props.focused_scene_id.as_ref(), self.props.zoom_level);
        self.clamp_scroll();
        self.props.zoom_level
    }

    /// Step the zoom out
    pub fn zoom_out(&mut self) -> f64 {
        let axis = self.axis();
        self.props.zoom_level = self.viewport.zoom_out(&self.config, &axis);
        self.focus.observe(self.props.focused_scene_id.as_ref(), self.props.zoom_level);
        self.clamp_scroll();
        self.props.zoom_level
    }

    /// Fit the timeline to the container
    pub fn zoom_to_fit(&mut self) {
        self.viewport.zoom_to_fit();
        self.props.zoom_level = 0.0;
        self.focus.observe(self.props.focused_scene_id.as_ref(), 0.0);
        self.clamp_scroll();
    }

    /// Click on a scene block
    pub fn scene_click(&mut self, scene_id: &SceneId) -> bool {
        if self.drag.is_dragging() || !self.props.scenes.iter().any(|s| &s.id == scene_id) {
            return false;
        }
        let Some(on_scene_click) = &mut self.callbacks.on_scene_click else {
            return false;
        };
        on_scene_click(scene_id);
        true
    }

    // Scene drag

    /// Start dragging a scene block at container x `pointer_x`
    pub fn scene_drag_start(&mut self, scene_id: &SceneId, pointer_x: f64) -> bool {
        let axis = self.axis();
        let track_x = self.viewport.track_x(&self.config, pointer_x);
        let sorted = sorted_by_start(&self.props.scenes);
        let Some((index, scene)) = sorted.iter().enumerate().find(|(_, s)| &s.id == scene_id) else {
            tracing::debug!("Drag start on unknown scene {scene_id}");
            return false;
        };
        let grab_offset = track_x - axis.time_to_pixel(scene.start);
        if !self.drag.begin(scene_id.clone(), index, grab_offset) {
            return false;
        }
        self.listeners.register(GestureKind::SceneDrag);
        true
    }

    /// Pointer moved during a scene drag
    pub fn scene_drag_over(&mut self, pointer_x: f64) {
        if !self.drag.is_dragging() {
            return;
        }
        let axis = self.axis();
        let track_x = self.viewport.track_x(&self.config, pointer_x);
        let sorted = sorted_by_start(&self.props.scenes);
        self.drag.update(track_x, &sorted, &axis);
        self.auto_scroll.on_pointer(pointer_x, self.viewport.container_width);
    }

    /// Scene dropped on the timeline
    pub fn scene_drop(&mut self) -> DropOutcome {
        self.auto_scroll.cancel();
        let outcome = match &mut self.callbacks.on_scene_reorder {
            Some(on_scene_reorder) => {
                let outcome = self.drag.commit();
                if let DropOutcome::Reorder(intent) = &outcome {
                    on_scene_reorder(intent);
                }
                outcome
            }
            None => self.drag.end(),
        };
        self.listeners.release_gesture(GestureKind::SceneDrag);
        outcome
    }

    /// Scene drag finished outside a drop target
    pub fn scene_drag_end(&mut self) -> DropOutcome {
        self.auto_scroll.cancel();
        let outcome = self.drag.end();
        self.listeners.release_gesture(GestureKind::SceneDrag);
        outcome
    }

    // Resize

    /// Grab a trim handle
    pub fn resize_start(&mut self, scene_id: &SceneId, handle: Boundary, pointer_x: f64) -> bool {
        if self.callbacks.on_scene_resize.is_none() {
            return false;
        }
        let Some(scene) = self.props.scenes.iter().find(|s| &s.id == scene_id) else {
            tracing::debug!("Resize start on unknown scene {scene_id}");
            return false;
        };
        if !self.resize.begin(scene, handle, pointer_x) {
            return false;
        }
        self.listeners.register(GestureKind::Resize);
        true
    }

    /// Move the held trim handle
    pub fn resize_move(&mut self, pointer_x: f64) -> Option<f64> {
        let axis = self.axis();
        let sorted = sorted_by_start(&self.props.scenes);
        self.resize.update(pointer_x, &sorted, &axis)
    }

    /// Release the trim handle
    pub fn resize_end(&mut self) -> Option<ResizeIntent> {
        let intent = self.resize.commit();
        self.listeners.release_gesture(GestureKind::Resize);
        let intent = intent?;
        if let Some(on_scene_resize) = &mut self.callbacks.on_scene_resize {
            on_scene_resize(&intent.scene_id, intent.start, intent.end);
        }
        Some(intent)
    }

    // Playhead

    /// Click on the ruler without holding the button
    pub fn ruler_click(&mut self, pointer_x: f64, pointer_y: f64, ruler_height: f64) -> Option<f64> {
        self.callbacks.on_time_change.as_ref()?;
        let axis = self.axis();
        let time = self.playhead.ruler_click(
            pointer_x,
            pointer_y,
            ruler_height,
            &self.viewport,
            &axis,
            &self.config,
            self.props.total_duration,
        )?;
        self.emit_time(time);
        Some(time)
    }

    /// Press on the ruler; seeks and starts scrubbing
    pub fn ruler_press(&mut self, pointer_x: f64, pointer_y: f64, ruler_height: f64) -> Option<f64> {
        self.callbacks.on_time_change.as_ref()?;
        let axis = self.axis();
        let time = self.playhead.begin_scrub(
            pointer_x,
            pointer_y,
            ruler_height,
            &self.viewport,
            &axis,
            &self.config,
            self.props.total_duration,
        )?;
        self.listeners.register(GestureKind::RulerScrub);
        self.emit_time(time);
        Some(time)
    }

    /// Press on the playhead marker
    pub fn playhead_press(&mut self) -> bool {
        if self.callbacks.on_time_change.is_none() || !self.playhead.begin_marker_drag() {
            return false;
        }
        self.listeners.register(GestureKind::PlayheadDrag);
        true
    }

    /// Pointer moved while the playhead or ruler is held
    pub fn playhead_move(&mut self, pointer_x: f64) -> Option<f64> {
        let axis = self.axis();
        let time = self.playhead.drag_to(
            pointer_x,
            &self.viewport,
            &axis,
            &self.config,
            self.props.total_duration,
        )?;
        self.emit_time(time);
        Some(time)
    }

    /// Release the playhead or ruler
    pub fn playhead_release(&mut self) {
        self.playhead.end_drag();
        self.listeners.release_gesture(GestureKind::PlayheadDrag);
        self.listeners.release_gesture(GestureKind::RulerScrub);
    }

    // Transitions

    /// Pick a transition for a scene edge; rejected picks fire nothing
    ///
    /// Every edge the pick changes is reported, so a crossfade reaches both
    /// halves of the boundary and fade-to-black arrives as its fade halves.
    pub fn set_transition(&mut self, scene_id: &SceneId, kind: TransitionKind, boundary: Boundary) -> bool {
        if self.callbacks.on_transition_set.is_none() {
            return false;
        }
        match transition::apply_transition(&self.props.scenes, scene_id, kind, boundary) {
            Ok(mutations) => {
                self.callbacks.emit_transition_writes(&mutations);
                true
            }
            Err(err) => {
                tracing::debug!("Transition rejected: {err}");
                false
            }
        }
    }

    /// Clear a transition from a scene edge, and its partner half when paired
    pub fn remove_transition(&mut self, scene_id: &SceneId, boundary: Boundary) -> bool {
        if self.callbacks.on_transition_remove.is_none() {
            return false;
        }
        match transition::remove_transition(&self.props.scenes, scene_id, boundary) {
            Ok(mutations) => {
                self.callbacks.emit_transition_writes(&mutations);
                true
            }
            Err(err) => {
                tracing::debug!("Transition removal rejected: {err}");
                false
            }
        }
    }

    /// Put one transition kind on every scene
    pub fn set_transition_to_all(&mut self, kind: TransitionKind) -> bool {
        if self.callbacks.on_transition_set.is_none() {
            return false;
        }
        match transition::apply_transition_to_all(&self.props.scenes, kind) {
            Ok(mutations) => {
                tracing::debug!(?kind, count = mutations.len(), "Transition set on all scenes");
                self.callbacks.emit_transition_writes(&mutations);
                true
            }
            Err(err) => {
                tracing::debug!("Transition for all scenes rejected: {err}");
                false
            }
        }
    }

    // Media, scenes and tracks

    /// OS files entered or left the timeline
    pub fn set_dragging_files(&mut self, dragging: bool) {
        self.dragging_files = dragging;
    }

    /// Files dropped onto a scene block
    pub fn media_drop(&mut self, scene_id: &SceneId, files: &[DroppedFile]) -> Option<MediaKind> {
        self.dragging_files = false;
        let on_scene_media_drop = self.callbacks.on_scene_media_drop.as_mut()?;
        if !self.props.scenes.iter().any(|s| &s.id == scene_id) {
            return None;
        }
        let (file, kind) = first_media(files)?;
        on_scene_media_drop(scene_id, file, kind);
        Some(kind)
    }

    /// Add-scene button
    pub fn add_scene(&mut self) -> bool {
        let Some(on_add_scene) = &mut self.callbacks.on_add_scene else {
            return false;
        };
        on_add_scene();
        true
    }

    /// Delete button on an audio track
    pub fn delete_track(&mut self, track_id: &TrackId) -> bool {
        if !self.props.audio_tracks.iter().any(|t| &t.id == track_id) {
            return false;
        }
        let Some(on_track_delete) = &mut self.callbacks.on_track_delete else {
            return false;
        };
        on_track_delete(track_id);
        true
    }

    // Frame loop

    /// Advance animations by one frame
    ///
    /// Runs the snap-back animation, the auto-scroll task and the focus
    /// debounce. Returns a scroll request when the focused scene was centered.
    pub fn tick(&mut self, elapsed: Duration) -> Option<ScrollRequest> {
        self.drag.tick(elapsed);

        let max = self.max_scroll();
        self.auto_scroll.tick(self.drag.is_dragging(), &mut self.viewport, max);

        let axis = self.axis();
        let request = self
            .focus
            .tick(elapsed, &self.props.scenes, &self.viewport, &axis, &self.config);
        self.apply_scroll(request)
    }

    /// Tear down; returns how many listener pairs were still registered
    pub fn unmount(&mut self) -> usize {
        self.drag.cancel();
        self.resize.cancel();
        self.playhead.end_drag();
        self.auto_scroll.cancel();
        self.listeners.release_all()
    }

    /// Geometry for the current frame
    pub fn layout(&self) -> TimelineLayout {
        let axis = self.axis();
        let sorted = sorted_by_start(&self.props.scenes);
        let focused = self
            .props
            .focused_scene_id
            .as_ref()
            .and_then(|id| sorted.iter().copied().find(|s| &s.id == id));

        let drag_state = self.drag.state();
        let snapping_id = match self.drag.phase() {
            DragPhase::SnappingBack { scene_id, .. } => Some(scene_id),
            _ => None,
        };
        let drop_indicator = shows_drop_indicator(self.dragging_files, self.drag.is_dragging());

        let blocks = sorted
            .iter()
            .enumerate()
            .map(|(index, scene)| {
                let (start, end) = self.resize.preview_for(&scene.id).unwrap_or((scene.start, scene.end));
                let (shares_environment, is_dimmed) = environment_relation(scene, focused);
                SceneBlock {
                    scene_id: scene.id.clone(),
                    index,
                    left: axis.time_to_pixel(start),
                    width: axis.seconds_to_pixels(end - start),
                    is_dragging: drag_state.is_some_and(|d| d.dragged_scene_id == scene.id),
                    is_snapping_back: snapping_id == Some(&scene.id),
                    is_hover_target: drag_state.is_some_and(|d| d.hover_target_index == Some(index)),
                    is_adjacent: drag_state.is_some_and(|d| d.adjacent_indices.contains(&Some(index))),
                    is_focused: focused.is_some_and(|f| f.id == scene.id),
                    shares_environment,
                    is_dimmed,
                    show_drop_indicator: drop_indicator,
                    transition_in_label: scene.transition_in.label(),
                    transition_out_label: scene.transition_out.label(),
                }
            })
            .collect();

        let insertion_line = drag_state.and_then(|d| {
            let target = sorted.get(d.hover_target_index?)?;
            Some(axis.time_to_pixel(target.edge(d.hover_boundary?)))
        });

        TimelineLayout {
            timeline_width: axis.timeline_width(),
            content_width: self.viewport.content_width(&self.config, &axis),
            scroll_offset: self.viewport.scroll_offset,
            blocks,
            insertion_line,
            playhead_x: axis.time_to_pixel(self.props.current_time),
            ruler: ruler(&axis),
        }
    }
}

impl Drop for StoryboardTimeline {
    fn drop(&mut self) {
        let leaked = self.unmount();
        if leaked > 0 {
            tracing::debug!(leaked, "Timeline dropped with gestures in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::apply_reorder;
    use crate::transition::pairing_violations;

    fn abc() -> Vec<Scene> {
        vec![
            Scene::new("A", 1, 0.0, 5.0),
            Scene::new("B", 2, 5.0, 10.0),
            Scene::new("C", 3, 10.0, 15.0),
        ]
    }

    fn props(scenes: Vec<Scene>) -> TimelineProps {
        TimelineProps {
            scenes,
            total_duration: 15.0,
            zoom_level: 10.0,
            ..TimelineProps::default()
        }
    }

    fn mount(scenes: Vec<Scene>) -> (StoryboardTimeline, IntentQueue) {
        let queue = IntentQueue::default();
        let timeline = StoryboardTimeline::new(
            TimelineConfig::default(),
            props(scenes),
            TimelineCallbacks::queued(&queue),
            800.0,
        );
        (timeline, queue)
    }

    /// Write queued transition edits into a scene list the way a host would
    fn replay(scenes: &mut [Scene], queue: &IntentQueue) {
        for intent in queue.borrow_mut().drain(..) {
            let (scene_id, boundary, kind) = match intent {
                TimelineIntent::SetTransition { scene_id, kind, boundary } => (scene_id, boundary, kind),
                TimelineIntent::RemoveTransition { scene_id, boundary } => (scene_id, boundary, TransitionKind::None),
                _ => continue,
            };
            if let Some(scene) = scenes.iter_mut().find(|s| s.id == scene_id) {
                *scene.transition_mut(boundary) = kind;
            }
        }
    }

    #[test]
    fn test_drag_reorder_and_transition_scenario() {
        let (mut timeline, queue) = mount(abc());

        // Grab A, hover near B's end (10 s => 1000 px, +80 label)
        assert!(timeline.scene_drag_start(&SceneId::from("A"), 300.0));
        timeline.scene_drag_over(1070.0);
        let layout = timeline.layout();
        assert_eq!(layout.insertion_line, Some(1000.0));
        assert!(layout.blocks[0].is_dragging);
        assert!(layout.blocks[1].is_hover_target);

        let outcome = timeline.scene_drop();
        let DropOutcome::Reorder(intent) = outcome.clone() else {
            panic!("expected reorder, got {outcome:?}");
        };
        assert_eq!((intent.from_index, intent.to_index, intent.boundary), (0, 1, Boundary::End));
        assert_eq!(timeline.listeners().active_count(), 0);

        let mut scenes = abc();
        assert!(apply_reorder(&mut scenes, &intent));
        let order: Vec<&str> = sorted_by_start(&scenes).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["B", "A", "C"]);

        // Back to the A, B, C list for the transition half
        let mut scenes = abc();
        timeline.set_props(props(scenes.clone()));
        queue.borrow_mut().clear();
        assert!(timeline.set_transition(&SceneId::from("A"), TransitionKind::Crossfade, Boundary::End));
        replay(&mut scenes, &queue);
        assert_eq!(scenes[0].transition_out, TransitionKind::Crossfade);
        assert_eq!(scenes[1].transition_in, TransitionKind::Crossfade);
        timeline.set_props(props(scenes.clone()));
        assert_eq!(timeline.layout().blocks[0].transition_out_label, "XF");

        queue.borrow_mut().clear();
        assert!(!timeline.set_transition(&SceneId::from("C"), TransitionKind::Crossfade, Boundary::End));
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn test_transition_callbacks_report_every_edge() {
        let (mut timeline, queue) = mount(abc());
        let mut scenes = abc();

        assert!(timeline.set_transition(&SceneId::from("A"), TransitionKind::Crossfade, Boundary::End));
        assert_eq!(
            *queue.borrow(),
            vec![
                TimelineIntent::SetTransition {
                    scene_id: SceneId::from("A"),
                    kind: TransitionKind::Crossfade,
                    boundary: Boundary::End,
                },
                TimelineIntent::SetTransition {
                    scene_id: SceneId::from("B"),
                    kind: TransitionKind::Crossfade,
                    boundary: Boundary::Start,
                },
            ]
        );
        replay(&mut scenes, &queue);
        assert!(pairing_violations(&scenes).is_empty());
        timeline.set_props(props(scenes.clone()));

        // Fade to black replaces the pair with its two fade halves
        assert!(timeline.set_transition(&SceneId::from("B"), TransitionKind::FadeToBlack, Boundary::Start));
        assert!(queue.borrow().iter().all(|i| !matches!(
            i,
            TimelineIntent::SetTransition { kind: TransitionKind::FadeToBlack, .. }
        )));
        replay(&mut scenes, &queue);
        assert_eq!(scenes[0].transition_out, TransitionKind::FadeOut);
        assert_eq!(scenes[1].transition_in, TransitionKind::FadeIn);
        assert!(pairing_violations(&scenes).is_empty());
        timeline.set_props(props(scenes.clone()));

        // Removing one half of a pair clears both
        assert!(timeline.set_transition(&SceneId::from("C"), TransitionKind::ContinuousShot, Boundary::Start));
        replay(&mut scenes, &queue);
        timeline.set_props(props(scenes.clone()));
        assert!(timeline.remove_transition(&SceneId::from("B"), Boundary::End));
        assert_eq!(queue.borrow().len(), 2);
        replay(&mut scenes, &queue);
        assert_eq!(scenes[1].transition_out, TransitionKind::None);
        assert_eq!(scenes[2].transition_in, TransitionKind::None);
        assert!(pairing_violations(&scenes).is_empty());
    }

    #[test]
    fn test_cleared_edges_fall_back_to_set_callback() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&writes);
        let callbacks = TimelineCallbacks::new().with_transition_set(move |id: &SceneId, kind, boundary| {
            sink.borrow_mut().push((id.clone(), kind, boundary));
        });
        let mut scenes = abc();
        scenes[0].transition_out = TransitionKind::Crossfade;
        scenes[1].transition_in = TransitionKind::Crossfade;
        let mut timeline = StoryboardTimeline::new(TimelineConfig::default(), props(scenes), callbacks, 800.0);

        assert!(timeline.set_transition(&SceneId::from("B"), TransitionKind::FadeIn, Boundary::Start));
        assert_eq!(
            *writes.borrow(),
            vec![
                (SceneId::from("B"), TransitionKind::FadeIn, Boundary::Start),
                (SceneId::from("A"), TransitionKind::None, Boundary::End),
            ]
        );
        assert!(!timeline.remove_transition(&SceneId::from("B"), Boundary::Start));
    }

    #[test]
    fn test_transition_to_all_keeps_pairs() {
        let (mut timeline, queue) = mount(abc());
        let mut scenes = abc();
        assert!(timeline.set_transition_to_all(TransitionKind::ContinuousShot));
        assert_eq!(queue.borrow().len(), 4);
        replay(&mut scenes, &queue);
        assert!(pairing_violations(&scenes).is_empty());
        assert_eq!(scenes[0].transition_in, TransitionKind::None);
        assert_eq!(scenes[1].transition_in, TransitionKind::ContinuousShot);
        assert_eq!(scenes[2].transition_out, TransitionKind::None);

        timeline.set_props(props(scenes.clone()));
        assert!(timeline.set_transition_to_all(TransitionKind::None));
        replay(&mut scenes, &queue);
        assert_eq!(scenes, abc());
    }

    #[test]
    fn test_scene_click_focuses() {
        let (mut timeline, queue) = mount(abc());
        assert!(timeline.scene_click(&SceneId::from("B")));
        assert!(!timeline.scene_click(&SceneId::from("missing")));
        assert_eq!(*queue.borrow(), vec![TimelineIntent::SceneClick { scene_id: SceneId::from("B") }]);

        assert!(timeline.scene_drag_start(&SceneId::from("A"), 300.0));
        assert!(!timeline.scene_click(&SceneId::from("A")));
        assert_eq!(queue.borrow().len(), 1);
    }

    #[test]
    fn test_zoom_in_clamps_scroll() {
        let (mut timeline, _queue) = mount(abc());
        // 45 s at 100 px/s: 4580 px content in an 800 px container
        timeline.wheel(0.0, 10_000.0);
        assert_eq!(timeline.viewport().scroll_offset, 3780.0);

        // Zoom 10 sits above the 5x cap, so stepping in lands on 5
        assert_eq!(timeline.zoom_in(), 5.0);
        assert_eq!(timeline.viewport().scroll_offset, 2330.0 - 800.0);
    }

    #[test]
    fn test_end_handle_resize_scenario() {
        let (mut timeline, queue) = mount(abc());
        // Extended duration 45 s, 100 px/s
        assert!(timeline.resize_start(&SceneId::from("A"), Boundary::End, 580.0));
        assert_eq!(timeline.resize_move(880.0), Some(8.0));
        let layout = timeline.layout();
        assert_eq!(layout.blocks[0].width, 800.0);

        let preview = timeline.resize_move(100_000.0).unwrap();
        assert!(preview <= timeline.axis().extended_duration());
        let intent = timeline.resize_end().unwrap();
        assert_eq!(intent.end, 45.0);
        assert_eq!(
            queue.borrow().last(),
            Some(&TimelineIntent::Resize { scene_id: SceneId::from("A"), start: 0.0, end: 45.0 })
        );
        assert_eq!(timeline.listeners().active_count(), 0);
    }

    #[test]
    fn test_missing_callbacks_disable_capabilities() {
        let mut timeline =
            StoryboardTimeline::new(TimelineConfig::default(), props(abc()), TimelineCallbacks::new(), 800.0);

        assert!(timeline.scene_drag_start(&SceneId::from("A"), 300.0));
        timeline.scene_drag_over(1070.0);
        assert_eq!(timeline.scene_drop(), DropOutcome::SnapBack);

        assert!(!timeline.resize_start(&SceneId::from("A"), Boundary::End, 580.0));
        assert!(!timeline.playhead_press());
        assert_eq!(timeline.ruler_click(300.0, 5.0, 40.0), None);
        assert!(!timeline.set_transition(&SceneId::from("A"), TransitionKind::FadeIn, Boundary::Start));
        assert!(!timeline.add_scene());
        assert!(!timeline.scene_click(&SceneId::from("B")));
        assert!(!timeline.set_transition_to_all(TransitionKind::Crossfade));
        assert_eq!(timeline.listeners().active_count(), 0);
    }

    #[test]
    fn test_seek_times_stay_in_range() {
        let (mut timeline, queue) = mount(abc());
        assert!(timeline.playhead_press());
        for x in [-500.0, 0.0, 80.0, 400.0, 1580.0, 9000.0] {
            timeline.playhead_move(x);
        }
        timeline.playhead_release();
        timeline.ruler_press(5000.0, 5.0, 40.0);
        timeline.playhead_move(-20.0);
        timeline.playhead_release();

        let times: Vec<f64> = queue
            .borrow()
            .iter()
            .filter_map(|i| match i {
                TimelineIntent::Seek { time } => Some(*time),
                _ => None,
            })
            .collect();
        assert_eq!(times.len(), 8);
        assert!(times.iter().all(|t| (0.0..=15.0).contains(t)));
        assert_eq!(timeline.listeners().active_count(), 0);
    }

    #[test]
    fn test_playback_follow_skips_while_dragging() {
        let (mut timeline, _queue) = mount(vec![Scene::new("A", 1, 0.0, 60.0)]);
        let mut moved = timeline.props().clone();
        moved.total_duration = 60.0;
        moved.current_time = 40.0;
        moved.is_playing = true;

        timeline.playhead_press();
        assert_eq!(timeline.set_props(moved.clone()), None);
        timeline.playhead_release();

        moved.current_time = 41.0;
        let request = timeline.set_props(moved).unwrap();
        assert_eq!(timeline.viewport().scroll_offset, request.target);
        assert!(request.target > 0.0);
    }

    #[test]
    fn test_focus_centers_after_debounce() {
        let (mut timeline, _queue) = mount(vec![Scene::new("A", 1, 0.0, 5.0), Scene::new("B", 2, 30.0, 40.0)]);
        let mut focused = timeline.props().clone();
        focused.focused_scene_id = Some(SceneId::from("B"));
        timeline.set_props(focused);

        assert_eq!(timeline.tick(Duration::from_millis(16)), None);
        let request = timeline.tick(Duration::from_millis(40)).unwrap();
        assert_eq!(request.target, 80.0 + 3500.0 - 400.0);
        assert_eq!(timeline.viewport().scroll_offset, request.target);
    }

    #[test]
    fn test_auto_scroll_during_drag() {
        let (mut timeline, _queue) = mount(abc());
        timeline.scene_drag_start(&SceneId::from("C"), 1100.0);
        timeline.scene_drag_over(775.0);
        timeline.tick(Duration::from_millis(16));
        assert_eq!(timeline.viewport().scroll_offset, 7.5);

        timeline.scene_drag_end();
        timeline.tick(Duration::from_millis(16));
        assert_eq!(timeline.viewport().scroll_offset, 7.5);
    }

    #[test]
    fn test_second_drag_refused_and_unmount_releases() {
        let (mut timeline, _queue) = mount(abc());
        assert!(timeline.scene_drag_start(&SceneId::from("A"), 100.0));
        assert!(!timeline.scene_drag_start(&SceneId::from("B"), 600.0));
        assert!(timeline.resize_start(&SceneId::from("C"), Boundary::Start, 1080.0));
        assert_eq!(timeline.listeners().active_count(), 2);
        assert_eq!(timeline.unmount(), 2);
        assert_eq!(timeline.unmount(), 0);
    }

    #[test]
    fn test_media_drop_uses_first_file() {
        let (mut timeline, queue) = mount(abc());
        timeline.set_dragging_files(true);
        assert!(timeline.layout().blocks.iter().all(|b| b.show_drop_indicator));

        let files = vec![DroppedFile::new("shot.webm", ""), DroppedFile::new("x.png", "image/png")];
        assert_eq!(timeline.media_drop(&SceneId::from("B"), &files), Some(MediaKind::Video));
        assert!(!timeline.layout().blocks[0].show_drop_indicator);
        assert_eq!(timeline.media_drop(&SceneId::from("B"), &files[..0]), None);
        assert_eq!(queue.borrow().len(), 1);
    }

    #[test]
    fn test_track_delete_and_add_scene() {
        let queue = IntentQueue::default();
        let mut props = props(abc());
        props.audio_tracks = vec![AudioTrack::new("music", "Music", 0.0, 50.0)];
        let mut timeline =
            StoryboardTimeline::new(TimelineConfig::default(), props, TimelineCallbacks::queued(&queue), 800.0);

        assert!(timeline.delete_track(&TrackId::from("music")));
        assert!(!timeline.delete_track(&TrackId::from("missing")));
        assert!(timeline.add_scene());
        assert_eq!(
            *queue.borrow(),
            vec![
                TimelineIntent::DeleteTrack { track_id: TrackId::from("music") },
                TimelineIntent::AddScene,
            ]
        );
        // Audio extends the timeline: 50 s + padding
        assert_eq!(timeline.layout().timeline_width, 8000.0);
    }

    #[test]
    fn test_intent_json_shape() {
        let intent = TimelineIntent::SetTransition {
            scene_id: SceneId::from("A"),
            kind: TransitionKind::FadeToBlack,
            boundary: Boundary::Start,
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"type\":\"set-transition\""));
        assert!(json.contains("\"kind\":\"fade-to-black\""));
    }
}
