use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::core::error::DispatchError;

/// Growth in tracked identities between two sweeps for expired windows.
const PRUNE_STEP: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Proof of one taken slot; hand it back to [`RateLimiter::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    started: Instant,
}

#[derive(Debug)]
struct Slots {
    windows: HashMap<String, Window>,
    next_prune: usize,
}

/// Fixed-window limiter keyed by caller identity.
///
/// Check and increment happen under one lock, so concurrent callers with the
/// same identity can never both take the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_per_window: u32,
    prune_step: usize,
    slots: Mutex<Slots>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_per_window: u32) -> Self {
        Self::with_prune_step(window, max_per_window, PRUNE_STEP)
    }

    fn with_prune_step(window: Duration, max_per_window: u32, prune_step: usize) -> Self {
        Self {
            window,
            max_per_window: max_per_window.max(1),
            prune_step: prune_step.max(1),
            slots: Mutex::new(Slots { windows: HashMap::new(), next_prune: prune_step.max(1) }),
        }
    }

    pub fn try_acquire(&self, identity: &str) -> Result<Slot, DispatchError> {
        self.try_acquire_at(identity, Instant::now())
    }

    pub fn try_acquire_at(&self, identity: &str, now: Instant) -> Result<Slot, DispatchError> {
        let mut slots = self.lock();
        if slots.windows.len() >= slots.next_prune {
            let window = self.window;
            slots
                .windows
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            slots.next_prune = slots.windows.len() + self.prune_step;
        }

        let entry = slots
            .windows
            .entry(identity.to_owned())
            .or_insert(Window { started: now, count: 0 });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window { started: now, count: 0 };
        }
        if entry.count >= self.max_per_window {
            let remaining = self.window.saturating_sub(now.saturating_duration_since(entry.started));
            return Err(DispatchError::RateLimited {
                retry_after_secs: remaining.as_secs_f64().ceil() as u64,
            });
        }
        entry.count += 1;
        Ok(Slot { started: entry.started })
    }

    /// Give back a slot taken by a submission that did not go through.
    /// A slot from a window that has since rolled over is ignored.
    pub fn release(&self, identity: &str, slot: Slot) {
        let mut slots = self.lock();
        if let Some(entry) = slots.windows.get_mut(identity) {
            if entry.started == slot.started {
                entry.count = entry.count.saturating_sub(1);
            }
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.lock().windows.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        // A poisoned map only ever holds counters; keep using it.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Duration::from_secs(60), 1)
    }

    #[test]
    fn second_submission_inside_window_is_rejected() {
        let rl = limiter();
        let t0 = Instant::now();
        assert!(rl.try_acquire_at("1.2.3.4", t0).is_ok());
        let err = rl.try_acquire_at("1.2.3.4", t0 + Duration::from_secs(30)).unwrap_err();
        assert_eq!(err, DispatchError::RateLimited { retry_after_secs: 30 });
    }

    #[test]
    fn submission_after_window_succeeds() {
        let rl = limiter();
        let t0 = Instant::now();
        rl.try_acquire_at("1.2.3.4", t0).unwrap();
        assert!(rl.try_acquire_at("1.2.3.4", t0 + Duration::from_secs(59)).is_err());
        assert!(rl.try_acquire_at("1.2.3.4", t0 + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn identities_are_independent() {
        let rl = limiter();
        let t0 = Instant::now();
        rl.try_acquire_at("a", t0).unwrap();
        assert!(rl.try_acquire_at("b", t0).is_ok());
    }

    #[test]
    fn release_returns_the_slot() {
        let rl = limiter();
        let t0 = Instant::now();
        let slot = rl.try_acquire_at("a", t0).unwrap();
        rl.release("a", slot);
        assert!(rl.try_acquire_at("a", t0 + Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn stale_release_keeps_the_next_window_intact() {
        let rl = RateLimiter::new(Duration::from_secs(5), 1);
        let t0 = Instant::now();
        let in_flight = rl.try_acquire_at("a", t0).unwrap();

        // The window rolls over and a later submission takes the new slot.
        let t1 = t0 + Duration::from_secs(6);
        rl.try_acquire_at("a", t1).unwrap();

        // The first attempt fails only now; its slot belonged to the old window.
        rl.release("a", in_flight);
        assert!(rl.try_acquire_at("a", t1 + Duration::from_secs(1)).is_err());
    }

    #[test]
    fn expired_windows_are_swept_only_after_growth() {
        let rl = RateLimiter::with_prune_step(Duration::from_secs(60), 1, 4);
        let t0 = Instant::now();
        for id in ["a", "b", "c", "d", "e"] {
            rl.try_acquire_at(id, t0).unwrap();
        }
        // Sweep ran at five identities and found nothing expired.
        assert_eq!(rl.tracked(), 5);

        let t1 = t0 + Duration::from_secs(61);
        for id in ["f", "g", "h"] {
            rl.try_acquire_at(id, t1).unwrap();
        }
        // Expired a..e linger until the map has grown by another step.
        assert_eq!(rl.tracked(), 8);

        rl.try_acquire_at("i", t1).unwrap();
        rl.try_acquire_at("j", t1).unwrap();
        assert_eq!(rl.tracked(), 5);
    }

    #[test]
    fn larger_budget_allows_that_many() {
        let rl = RateLimiter::new(Duration::from_secs(10), 3);
        let t0 = Instant::now();
        for _ in 0..3 {
            rl.try_acquire_at("a", t0).unwrap();
        }
        assert!(rl.try_acquire_at("a", t0).is_err());
    }

    #[test]
    fn concurrent_acquires_admit_exactly_one() {
        use std::sync::Arc;
        let rl = Arc::new(limiter());
        let t0 = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rl = rl.clone();
                std::thread::spawn(move || rl.try_acquire_at("same", t0).is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
    }
}
