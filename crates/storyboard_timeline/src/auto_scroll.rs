// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge auto-scroll while a scene is dragged.

use crate::config::TimelineConfig;
use crate::viewport::Viewport;

/// Scroll direction of a running task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Towards the timeline start
    Left,
    /// Towards the timeline end
    Right,
}

/// Per-frame scroll task
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTask {
    /// Direction of travel
    pub direction: ScrollDirection,
    /// Set when the task must not run again
    pub cancelled: bool,
}

/// Schedules and drives edge auto-scroll
#[derive(Debug, Clone)]
pub struct AutoScrollController {
    task: Option<ScrollTask>,
    pointer_x: f64,
    container_width: f64,
    edge: f64,
    max_speed: f64,
}

impl AutoScrollController {
    /// Create a controller from timeline settings
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            task: None,
            pointer_x: 0.0,
            container_width: 0.0,
            edge: config.auto_scroll_edge,
            max_speed: config.auto_scroll_max_speed,
        }
    }

    /// Running task, if any
    pub fn task(&self) -> Option<&ScrollTask> {
        self.task.as_ref()
    }

    /// Whether a task is scheduled
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.cancelled)
    }

    /// Record the pointer (container-relative) during a drag
    ///
    /// Schedules a task when the pointer enters an edge zone. Returns whether
    /// a task is running afterwards.
    pub fn on_pointer(&mut self, pointer_x: f64, container_width: f64) -> bool {
        self.pointer_x = pointer_x;
        self.container_width = container_width;

        match self.zone() {
            Some((direction, _)) => {
                match &mut self.task {
                    Some(task) if !task.cancelled => task.direction = direction,
                    _ => {
                        tracing::trace!(?direction, "Auto-scroll scheduled");
                        self.task = Some(ScrollTask {
                            direction,
                            cancelled: false,
                        });
                    }
                }
                true
            }
            None => {
                self.cancel();
                false
            }
        }
    }

    /// Run one frame; returns the distance scrolled
    ///
    /// The task ends itself as soon as dragging stops or the pointer has left
    /// the edge zone.
    pub fn tick(&mut self, still_dragging: bool, viewport: &mut Viewport, max_scroll: f64) -> Option<f64> {
        if !self.is_active() {
            self.task = None;
            return None;
        }
        let zone = self.zone().filter(|_| still_dragging);
        let Some((direction, distance)) = zone else {
            self.cancel();
            self.task = None;
            return None;
        };

        let speed = self.max_speed * (1.0 - distance / self.edge);
        let delta = match direction {
            ScrollDirection::Left => -speed,
            ScrollDirection::Right => speed,
        };
        Some(viewport.scroll_by(delta, max_scroll))
    }

    /// Stop scrolling
    pub fn cancel(&mut self) {
        if let Some(task) = &mut self.task {
            task.cancelled = true;
        }
    }

    /// Edge zone under the pointer with its distance from that edge
    fn zone(&self) -> Option<(ScrollDirection, f64)> {
        let from_left = self.pointer_x;
        let from_right = self.container_width - self.pointer_x;
        if from_left > 0.0 && from_left < self.edge {
            Some((ScrollDirection::Left, from_left))
        } else if from_right > 0.0 && from_right < self.edge {
            Some((ScrollDirection::Right, from_right))
        } else {
            None
        }
    }
}
