use std::collections::BTreeSet;

use kino_types::SceneMarkers;
use kino_types::api::BatchMarkersRequest;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("no target episodes selected")]
    NoTargets,
}

/// Episodes a marker set should be copied onto.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSelection {
    pub apply_all: bool,
    pub episodes: BTreeSet<u32>,
}

impl BatchSelection {
    pub fn all() -> Self {
        Self {
            apply_all: true,
            episodes: BTreeSet::new(),
        }
    }

    pub fn episodes(episodes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            apply_all: false,
            episodes: episodes.into_iter().collect(),
        }
    }

    pub fn toggle(&mut self, episode: u32) {
        if !self.episodes.remove(&episode) {
            self.episodes.insert(episode);
        }
    }

    /// Episode ids in ascending order. Numbers outside `1..=total_episodes`
    /// are dropped.
    pub fn episode_ids(&self, total_episodes: u32) -> Vec<String> {
        if self.apply_all {
            return (1..=total_episodes).map(|n| n.to_string()).collect();
        }
        self.episodes
            .iter()
            .filter(|&&n| n >= 1 && n <= total_episodes)
            .map(|n| n.to_string())
            .collect()
    }

    /// One request carrying every target. The server replaces each target's
    /// markers with `markers` wholesale.
    pub fn build_request(
        &self,
        markers: &SceneMarkers,
        total_episodes: u32,
    ) -> Result<BatchMarkersRequest, BatchError> {
        let episode_ids = self.episode_ids(total_episodes);
        if episode_ids.is_empty() {
            return Err(BatchError::NoTargets);
        }
        Ok(BatchMarkersRequest {
            episode_ids,
            markers: markers.clone(),
        })
    }
}
