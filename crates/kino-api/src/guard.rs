use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One-at-a-time flag for a group of mutations (e.g. all device revokes).
/// While a guard is held the triggering control should be disabled.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or `None` if a mutation is already running.
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the flag when dropped, whatever the request's outcome.
#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let flag = InFlight::new();
        let guard = flag.try_begin().unwrap();
        assert!(flag.is_busy());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_begin().is_some());
    }
}
