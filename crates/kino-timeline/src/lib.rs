//! Scene-marker timeline model: time/pixel mapping, marker layout, drag and
//! click handling, and the marker editing session.

pub mod batch;
pub mod editor;
pub mod layout;
pub mod mapper;
pub mod pointer;
pub mod timecode;
pub mod timeline;

pub use editor::{Edge, MarkerEditor};
pub use mapper::{TimelineRect, position_to_time, time_to_position};
pub use pointer::{ListenerGuard, PointerEvent, PointerHub};
pub use timeline::{DragTarget, HoverPreview, Timeline, TimelineAction};
