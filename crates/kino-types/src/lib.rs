pub mod api;
pub mod markers;
pub mod models;

pub use markers::{MarkerError, MarkerKind, MarkerRange, PlaybackPosition, SceneMarkers};
pub use models::{DeviceRow, SessionRow, Title, TitleKind, WatchProgress};
