use std::future::Future;

use kino_types::{MarkerError, MarkerKind, MarkerRange, SceneMarkers};
use tracing::debug;

/// Shortest range a handle drag can produce, in seconds.
pub const MIN_SPAN: f64 = 0.1;

/// Which end of a marker range a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Start,
    End,
}

/// In-memory editing session for one media asset's scene markers.
///
/// Edits stay local until [`MarkerEditor::save_with`] succeeds; `revert`
/// returns to the last loaded or saved state.
#[derive(Debug, Clone, Default)]
pub struct MarkerEditor {
    markers: SceneMarkers,
    saved: SceneMarkers,
    duration: f64,
    dirty: bool,
}

impl MarkerEditor {
    pub fn load(markers: SceneMarkers, duration: f64) -> Self {
        Self {
            saved: markers.clone(),
            markers,
            duration,
            dirty: false,
        }
    }

    pub fn markers(&self) -> &SceneMarkers {
        &self.markers
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Media metadata can arrive after the markers did.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_range(&mut self, kind: MarkerKind, start: f64, end: f64) -> Result<(), MarkerError> {
        let range = self.checked(start, end)?;
        self.put(kind, Some(range));
        Ok(())
    }

    /// Numeric entry of a start time. An absent marker starts out running to
    /// the end of the media.
    pub fn set_start(&mut self, kind: MarkerKind, start: f64) -> Result<(), MarkerError> {
        let end = self.markers.get(kind).map_or(self.duration, |range| range.end());
        self.set_range(kind, start, end)
    }

    /// Numeric entry of an end time. An absent marker starts out at zero.
    pub fn set_end(&mut self, kind: MarkerKind, end: f64) -> Result<(), MarkerError> {
        let start = self.markers.get(kind).map_or(0.0, |range| range.start());
        self.set_range(kind, start, end)
    }

    /// Move one edge to a dragged time, clamped so the range keeps at least
    /// [`MIN_SPAN`] and stays inside the media. Returns whether anything changed.
    pub fn drag_edge(&mut self, kind: MarkerKind, edge: Edge, time: f64) -> bool {
        let Some(range) = self.markers.get(kind) else {
            return false;
        };
        if self.duration < MIN_SPAN || !time.is_finite() {
            return false;
        }
        let time = time.clamp(0.0, self.duration);
        let (start, end) = match edge {
            Edge::Start => (time.min(range.end() - MIN_SPAN).max(0.0), range.end()),
            Edge::End => (
                range.start(),
                time.max(range.start() + MIN_SPAN).min(self.duration),
            ),
        };
        let Ok(updated) = MarkerRange::new(start, end) else {
            return false;
        };
        if updated == range {
            return false;
        }
        self.put(kind, Some(updated));
        true
    }

    /// Remove a marker entirely. Absent, not zero-length.
    pub fn clear(&mut self, kind: MarkerKind) {
        if self.markers.get(kind).is_some() {
            self.put(kind, None);
        }
    }

    pub fn revert(&mut self) {
        self.markers = self.saved.clone();
        self.dirty = false;
    }

    /// Take every kind auto-detection found; kinds it did not find are kept.
    pub fn apply_detected(&mut self, detected: &SceneMarkers) {
        for (kind, range) in detected.iter() {
            self.put(kind, Some(range));
        }
    }

    /// Run a save. The markers the store hands back become the new baseline.
    /// On failure the session keeps its edits and stays dirty.
    pub async fn save_with<F, Fut, E>(&mut self, save: F) -> Result<(), E>
    where
        F: FnOnce(SceneMarkers) -> Fut,
        Fut: Future<Output = Result<SceneMarkers, E>>,
    {
        let stored = save(self.markers.clone()).await?;
        debug!(populated = stored.iter().count(), "scene markers saved");
        self.markers = stored.clone();
        self.saved = stored;
        self.dirty = false;
        Ok(())
    }

    fn checked(&self, start: f64, end: f64) -> Result<MarkerRange, MarkerError> {
        if self.duration > 0.0 {
            MarkerRange::within(start, end, self.duration)
        } else {
            MarkerRange::new(start, end)
        }
    }

    fn put(&mut self, kind: MarkerKind, range: Option<MarkerRange>) {
        self.markers.set(kind, range);
        self.dirty = true;
    }
}
