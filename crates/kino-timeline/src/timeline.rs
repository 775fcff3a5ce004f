use kino_types::{MarkerKind, PlaybackPosition, SceneMarkers};
use tokio::sync::mpsc;
use tracing::debug;

use crate::editor::Edge;
use crate::layout::{hit_test, layout_markers};
use crate::mapper::{TimelineRect, position_to_time, time_to_position};
use crate::pointer::{ListenerGuard, PointerEvent, PointerHub};
use crate::timecode::format_timecode;

/// What a drag is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Playhead,
    Handle { kind: MarkerKind, edge: Edge },
}

/// Requests the timeline hands back to its host (player, editor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineAction {
    Seek(f64),
    JumpToMarker { kind: MarkerKind, time: f64 },
    MoveHandle { kind: MarkerKind, edge: Edge, time: f64 },
    DragEnded(DragTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverPreview {
    pub time: f64,
    pub label: String,
}

/// A live drag owns its window-level listener; ending or dropping the session
/// detaches it.
struct DragSession {
    target: DragTarget,
    events: mpsc::UnboundedReceiver<PointerEvent>,
    _listener: ListenerGuard,
}

/// Interaction state of one rendered timeline strip.
pub struct Timeline {
    hub: PointerHub,
    rect: TimelineRect,
    playback: PlaybackPosition,
    drag: Option<DragSession>,
}

impl Timeline {
    pub fn new(hub: PointerHub, rect: TimelineRect) -> Self {
        Self {
            hub,
            rect,
            playback: PlaybackPosition::default(),
            drag: None,
        }
    }

    pub fn set_rect(&mut self, rect: TimelineRect) {
        self.rect = rect;
    }

    pub fn set_playback(&mut self, playback: PlaybackPosition) {
        self.playback = playback;
    }

    pub fn duration(&self) -> f64 {
        self.playback.duration
    }

    /// Playhead location in percent of the width.
    pub fn playhead_position(&self) -> f64 {
        time_to_position(self.playback.current_time, self.playback.duration)
    }

    pub fn time_at(&self, pixel_x: f64) -> f64 {
        position_to_time(pixel_x, self.rect, self.playback.duration)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_target(&self) -> Option<DragTarget> {
        self.drag.as_ref().map(|drag| drag.target)
    }

    /// Pointer-down on the playhead or a marker handle. Only one drag runs at a
    /// time; a second request while one is active is ignored.
    pub fn begin_drag(&mut self, target: DragTarget) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let (listener, events) = self.hub.subscribe();
        debug!(?target, "drag started");
        self.drag = Some(DragSession {
            target,
            events,
            _listener: listener,
        });
        true
    }

    /// Drain window-level pointer events delivered since the last call.
    pub fn pump(&mut self) -> Vec<TimelineAction> {
        let mut actions = Vec::new();
        let Some(drag) = self.drag.as_mut() else {
            return actions;
        };
        let target = drag.target;

        let mut ended = false;
        while let Ok(event) = drag.events.try_recv() {
            match event {
                PointerEvent::Move { x } => {
                    let time = position_to_time(x, self.rect, self.playback.duration);
                    actions.push(match target {
                        DragTarget::Playhead => TimelineAction::Seek(time),
                        DragTarget::Handle { kind, edge } => {
                            TimelineAction::MoveHandle { kind, edge, time }
                        }
                    });
                }
                PointerEvent::Up { .. } => {
                    ended = true;
                    break;
                }
            }
        }

        if ended {
            self.drag = None;
            debug!(?target, "drag ended");
            actions.push(TimelineAction::DragEnded(target));
        }
        actions
    }

    /// Abandon a drag without a pointer-up, e.g. when the editor closes.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Click on the strip. A click inside a rendered marker jumps to that
    /// marker's start and nothing else; elsewhere it seeks to the pointer.
    pub fn click(&self, pixel_x: f64, markers: &SceneMarkers) -> TimelineAction {
        let duration = self.playback.duration;
        let spans = layout_markers(markers, duration);
        let percent = if self.rect.width > 0.0 {
            (pixel_x - self.rect.left) / self.rect.width * 100.0
        } else {
            f64::NAN
        };
        match hit_test(&spans, percent) {
            Some(span) => TimelineAction::JumpToMarker {
                kind: span.kind,
                time: span.range.start(),
            },
            None => TimelineAction::Seek(position_to_time(pixel_x, self.rect, duration)),
        }
    }

    /// Time under the cursor for the hover tooltip; hidden during a drag.
    pub fn hover(&self, pixel_x: f64) -> Option<HoverPreview> {
        if self.is_dragging() {
            return None;
        }
        let time = self.time_at(pixel_x);
        Some(HoverPreview {
            time,
            label: format_timecode(time),
        })
    }
}
