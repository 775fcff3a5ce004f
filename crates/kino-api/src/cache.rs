use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

/// Fetched query results keyed by query. Mutations call [`QueryCache::invalidate`]
/// and the next read goes back to the server; entries are never patched locally.
pub struct QueryCache<K, V> {
    name: &'static str,
    state: Mutex<CacheState<K, V>>,
}

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    /// Bumped by every invalidation. A fetch that straddles one is not stored.
    generation: u64,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.state().entries.get(key).cloned()
    }

    /// Cached value, or the result of `fetch`. The lock is not held across the
    /// fetch; its result is stored only if nothing was invalidated meanwhile.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let started = {
            let state = self.state();
            if let Some(hit) = state.entries.get(&key) {
                trace!(cache = self.name, ?key, "cache hit");
                return Ok(hit.clone());
            }
            state.generation
        };

        let value = fetch().await?;

        let mut state = self.state();
        if state.generation == started {
            state.entries.insert(key, value.clone());
        } else {
            trace!(cache = self.name, ?key, "stale fetch discarded");
        }
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        let mut state = self.state();
        state.generation += 1;
        if state.entries.remove(key).is_some() {
            trace!(cache = self.name, ?key, "invalidated");
        }
    }

    pub fn invalidate_all(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.entries.clear();
        trace!(cache = self.name, "invalidated all");
    }

    fn state(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
