use serde::{Deserialize, Serialize};
use thiserror::Error;

// -- Marker kinds --

/// The fixed set of labelled intervals an editor can place on a title's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Intro,
    Recap,
    Opening,
    Ending,
    Preview,
    Credits,
}

/// Display data associated with each marker kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerConfig {
    pub label: &'static str,
    /// Hex colour used for the timeline layer and legend swatch.
    pub color: &'static str,
}

const CONFIGS: [MarkerConfig; 6] = [
    MarkerConfig { label: "Intro", color: "#3b82f6" },
    MarkerConfig { label: "Recap", color: "#a855f7" },
    MarkerConfig { label: "Opening Theme", color: "#22c55e" },
    MarkerConfig { label: "Ending Theme", color: "#f97316" },
    MarkerConfig { label: "Preview", color: "#eab308" },
    MarkerConfig { label: "Credits", color: "#ef4444" },
];

impl MarkerKind {
    /// All kinds in render order. Later entries draw on top of earlier ones.
    pub const ALL: [MarkerKind; 6] = [
        MarkerKind::Intro,
        MarkerKind::Recap,
        MarkerKind::Opening,
        MarkerKind::Ending,
        MarkerKind::Preview,
        MarkerKind::Credits,
    ];

    pub fn config(self) -> &'static MarkerConfig {
        &CONFIGS[self.index()]
    }

    pub fn label(self) -> &'static str {
        self.config().label
    }

    /// Wire name, as used in JSON keys and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Recap => "recap",
            Self::Opening => "opening",
            Self::Ending => "ending",
            Self::Preview => "preview",
            Self::Credits => "credits",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Intro => 0,
            Self::Recap => 1,
            Self::Opening => 2,
            Self::Ending => 3,
            Self::Preview => 4,
            Self::Credits => 5,
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MarkerKind {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarkerError::UnknownKind(s.to_string()))
    }
}

// -- Ranges --

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkerError {
    #[error("marker times must be finite")]
    NotFinite,
    #[error("marker start {0} is negative")]
    NegativeStart(f64),
    #[error("marker start {start} must be before end {end}")]
    Inverted { start: f64, end: f64 },
    #[error("marker end {end} is past the media duration {duration}")]
    PastDuration { end: f64, duration: f64 },
    #[error("unknown marker kind: {0}")]
    UnknownKind(String),
}

/// A `[start, end]` interval in seconds with `0 <= start < end`. Only
/// [`MarkerRange::new`] builds one, including when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct MarkerRange {
    start: f64,
    end: f64,
}

#[derive(Deserialize)]
struct RawRange {
    start: f64,
    end: f64,
}

impl TryFrom<RawRange> for MarkerRange {
    type Error = MarkerError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        MarkerRange::new(raw.start, raw.end)
    }
}

impl MarkerRange {
    pub fn new(start: f64, end: f64) -> Result<Self, MarkerError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(MarkerError::NotFinite);
        }
        if start < 0.0 {
            return Err(MarkerError::NegativeStart(start));
        }
        if start >= end {
            return Err(MarkerError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Like [`MarkerRange::new`], additionally requiring `end <= duration`.
    pub fn within(start: f64, end: f64, duration: f64) -> Result<Self, MarkerError> {
        let range = Self::new(start, end)?;
        if end > duration {
            return Err(MarkerError::PastDuration { end, duration });
        }
        Ok(range)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

// -- Scene markers --

/// At most one range per marker kind for a single media asset.
/// Absent kinds serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMarkers {
    pub intro: Option<MarkerRange>,
    pub recap: Option<MarkerRange>,
    pub opening: Option<MarkerRange>,
    pub ending: Option<MarkerRange>,
    pub preview: Option<MarkerRange>,
    pub credits: Option<MarkerRange>,
}

impl SceneMarkers {
    pub fn get(&self, kind: MarkerKind) -> Option<MarkerRange> {
        *self.slot(kind)
    }

    pub fn set(&mut self, kind: MarkerKind, range: Option<MarkerRange>) {
        *self.slot_mut(kind) = range;
    }

    pub fn clear(&mut self, kind: MarkerKind) {
        self.set(kind, None);
    }

    /// Populated kinds, in render order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerKind, MarkerRange)> + '_ {
        MarkerKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|range| (kind, range)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn slot(&self, kind: MarkerKind) -> &Option<MarkerRange> {
        match kind {
            MarkerKind::Intro => &self.intro,
            MarkerKind::Recap => &self.recap,
            MarkerKind::Opening => &self.opening,
            MarkerKind::Ending => &self.ending,
            MarkerKind::Preview => &self.preview,
            MarkerKind::Credits => &self.credits,
        }
    }

    fn slot_mut(&mut self, kind: MarkerKind) -> &mut Option<MarkerRange> {
        match kind {
            MarkerKind::Intro => &mut self.intro,
            MarkerKind::Recap => &mut self.recap,
            MarkerKind::Opening => &mut self.opening,
            MarkerKind::Ending => &mut self.ending,
            MarkerKind::Preview => &mut self.preview,
            MarkerKind::Credits => &mut self.credits,
        }
    }
}

// -- Playback --

/// Position reported by the media element. `duration` is 0 until metadata loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPosition {
    pub current_time: f64,
    pub duration: f64,
}
