//! Activity probe
//!
//! Tells the scheduler whether the consumer of a poller is currently
//! active (visible, foregrounded). Reads are not issued while inactive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Predicate consulted before every read
pub trait ActivityProbe: Send + Sync {
    fn is_active(&self) -> bool;
}

/// Probe for environments that cannot detect foreground state
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl ActivityProbe for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }
}

impl<F> ActivityProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_active(&self) -> bool {
        self()
    }
}

/// Shared on/off switch, e.g. flipped by a view when it is hidden or shown
#[derive(Debug, Clone)]
pub struct ActivityFlag {
    active: Arc<AtomicBool>,
}

impl ActivityFlag {
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(active)),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

impl Default for ActivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ActivityProbe for ActivityFlag {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_toggles() {
        let flag = ActivityFlag::default();
        let shared = flag.clone();
        assert!(flag.is_active());

        shared.set_active(false);
        assert!(!flag.is_active());
    }

    #[test]
    fn test_closure_probe() {
        let probe = || false;
        assert!(!probe.is_active());
        assert!(AlwaysActive.is_active());
    }
}
