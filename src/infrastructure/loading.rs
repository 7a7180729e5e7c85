use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts refresh passes currently in flight.
///
/// A counter rather than a flag: overlapping passes are allowed, and the
/// view must stay "loading" until the last of them completes. Entries hand
/// out a guard so the exit happens exactly once even on error paths.
#[derive(Debug, Default)]
pub struct LoadingGauge {
    in_flight: AtomicU64,
}

impl LoadingGauge {
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicU64::new(0),
        }
    }

    pub fn enter(self: &Arc<Self>) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            gauge: Arc::clone(self),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

pub struct LoadingGuard {
    gauge: Arc<LoadingGauge>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_by_default() {
        let gauge = Arc::new(LoadingGauge::new());
        assert!(!gauge.is_loading());
    }

    #[test]
    fn loading_until_every_guard_drops() {
        let gauge = Arc::new(LoadingGauge::new());
        let first = gauge.enter();
        let second = gauge.enter();
        assert!(gauge.is_loading());
        drop(first);
        assert!(gauge.is_loading());
        drop(second);
        assert!(!gauge.is_loading());
    }
}
