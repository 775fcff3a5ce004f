use kino_types::{MarkerKind, MarkerRange, SceneMarkers};

use crate::mapper::time_to_position;

/// One rendered marker layer, in percent of the timeline width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpan {
    pub kind: MarkerKind,
    pub range: MarkerRange,
    pub left: f64,
    pub width: f64,
}

impl MarkerSpan {
    pub fn contains(&self, percent: f64) -> bool {
        percent >= self.left && percent <= self.left + self.width
    }
}

/// Spans for every populated kind, bottom layer first. Overlaps are allowed.
pub fn layout_markers(markers: &SceneMarkers, duration: f64) -> Vec<MarkerSpan> {
    markers
        .iter()
        .map(|(kind, range)| {
            let left = time_to_position(range.start(), duration);
            let right = time_to_position(range.end(), duration);
            MarkerSpan {
                kind,
                range,
                left,
                width: right - left,
            }
        })
        .collect()
}

/// Topmost span under the pointer.
pub fn hit_test(spans: &[MarkerSpan], percent: f64) -> Option<&MarkerSpan> {
    spans
        .iter()
        .rev()
        .find(|span| span.width > 0.0 && span.contains(percent))
}

/// Legend entries: only kinds that currently have a range.
pub fn legend(markers: &SceneMarkers) -> Vec<(MarkerKind, &'static str, MarkerRange)> {
    markers
        .iter()
        .map(|(kind, range)| (kind, kind.label(), range))
        .collect()
}

/// Text rendering of the layers at `columns` characters wide, one row per
/// populated kind. Used for terminal output.
pub fn render_ascii(markers: &SceneMarkers, duration: f64, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    layout_markers(markers, duration)
        .into_iter()
        .map(|span| {
            let first = column_of(span.left, columns);
            let last = column_of(span.left + span.width, columns).max(first);
            let bar: String = (0..columns)
                .map(|col| if col >= first && col <= last { '#' } else { '.' })
                .collect();
            format!("{:<8} |{}|", span.kind.as_str(), bar)
        })
        .collect()
}

fn column_of(percent: f64, columns: usize) -> usize {
    let col = (percent.clamp(0.0, 100.0) / 100.0 * columns as f64).floor() as usize;
    col.min(columns - 1)
}
