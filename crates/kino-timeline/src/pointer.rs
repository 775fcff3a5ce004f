use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::trace;

/// Pointer activity seen at window level, outside any one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { x: f64 },
    Up { x: f64 },
}

/// Window-level pointer listeners. Drags subscribe here so they keep tracking
/// after the pointer leaves the timeline strip.
#[derive(Clone, Default)]
pub struct PointerHub {
    inner: Arc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<PointerEvent>>>,
}

impl HubInner {
    fn listeners(&self) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<PointerEvent>>> {
        // The map stays consistent even if a holder panicked.
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener. It stays attached exactly as long as the guard lives.
    pub fn subscribe(&self) -> (ListenerGuard, mpsc::UnboundedReceiver<PointerEvent>) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.listeners().insert(id, tx);
        trace!(listener = id, "pointer listener attached");
        (
            ListenerGuard {
                id,
                hub: Arc::clone(&self.inner),
            },
            rx,
        )
    }

    /// Deliver an event to every attached listener.
    pub fn dispatch(&self, event: PointerEvent) {
        self.inner
            .listeners()
            .retain(|_, tx| tx.send(event).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }
}

/// Detaches its listener from the hub on drop.
pub struct ListenerGuard {
    id: u64,
    hub: Arc<HubInner>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.hub.listeners().remove(&self.id);
        trace!(listener = self.id, "pointer listener detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_scopes_the_listener() {
        let hub = PointerHub::new();
        let (guard, mut rx) = hub.subscribe();
        assert_eq!(hub.listener_count(), 1);

        hub.dispatch(PointerEvent::Move { x: 12.0 });
        assert_eq!(rx.try_recv().unwrap(), PointerEvent::Move { x: 12.0 });

        drop(guard);
        assert_eq!(hub.listener_count(), 0);
        hub.dispatch(PointerEvent::Up { x: 0.0 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let hub = PointerHub::new();
        let (_guard, rx) = hub.subscribe();
        drop(rx);
        hub.dispatch(PointerEvent::Move { x: 1.0 });
        assert_eq!(hub.listener_count(), 0);
    }
}
