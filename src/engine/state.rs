use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared per-context flags: the install-once guard and the
/// redirect-in-flight latch that keeps overlapping checkpoints from
/// issuing duplicate navigations.
#[derive(Debug, Clone)]
pub struct EngineState {
    inner: Arc<StateInner>,
}

#[derive(Debug)]
struct StateInner {
    initialized: AtomicBool,
    redirect_in_flight: AtomicBool,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StateInner {
                initialized: AtomicBool::new(false),
                redirect_in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// First caller wins; repeated initialization attempts are refused.
    pub fn try_init(&self) -> bool {
        !self.inner.initialized.swap(true, Ordering::SeqCst)
    }

    /// Claims the single redirect slot for this page context.
    /// Returns false if a redirect is already in flight.
    pub fn begin_redirect(&self) -> bool {
        !self.inner.redirect_in_flight.swap(true, Ordering::SeqCst)
    }

    pub fn redirect_in_flight(&self) -> bool {
        self.inner.redirect_in_flight.load(Ordering::SeqCst)
    }

    /// A new page context started; the previous navigation is done.
    pub fn reset_navigation(&self) {
        self.inner.redirect_in_flight.store(false, Ordering::SeqCst);
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_guard_is_once() {
        let state = EngineState::new();
        assert!(state.try_init());
        assert!(!state.try_init());
        assert!(!state.clone().try_init());
    }

    #[test]
    fn test_redirect_latch() {
        let state = EngineState::new();
        assert!(!state.redirect_in_flight());
        assert!(state.begin_redirect());
        assert!(!state.begin_redirect());
        assert!(state.redirect_in_flight());

        state.reset_navigation();
        assert!(state.begin_redirect());
    }
}
