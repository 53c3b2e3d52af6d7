//! Cancelable one-shot trigger scheduled on the cooperative frame loop.
//!
//! There is no preemption in the single-threaded model: a "timer" is armed
//! with a deadline and polled from the per-frame tick. Cancellation
//! invalidates the armed generation, so a poll after cancel (or after a
//! re-arm) can never observe a stale firing. Callers still re-validate their
//! own state at fire time; the handle only rules out scheduling races.

/// Handle identifying one arming of a [`OneShotTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerHandle {
    generation: u64,
}

/// A cancelable one-shot deadline polled from the frame loop.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    deadline: Option<f64>,
    generation: u64,
}

impl OneShotTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` seconds after `now`, replacing any
    /// previously armed deadline. Returns a handle tied to this arming.
    pub fn arm(&mut self, now: f64, delay: f64) -> TriggerHandle {
        self.generation += 1;
        self.deadline = Some(now + delay);
        TriggerHandle {
            generation: self.generation,
        }
    }

    /// Cancel the armed deadline, if any. Handles from earlier armings
    /// become invalid.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.deadline = None;
    }

    /// True if `handle` refers to the currently armed deadline.
    #[must_use]
    pub fn is_live(&self, handle: TriggerHandle) -> bool {
        self.deadline.is_some() && handle.generation == self.generation
    }

    /// Poll the timer. Returns true exactly once, on the first poll at or
    /// after the deadline; the timer disarms itself when it fires.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// True while a deadline is armed and has not fired.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_at_deadline() {
        let mut timer = OneShotTimer::new();
        timer.arm(0.0, 3.0);
        assert!(!timer.poll(2.9));
        assert!(timer.poll(3.0));
        assert!(!timer.poll(3.1));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut timer = OneShotTimer::new();
        timer.arm(0.0, 3.0);
        timer.cancel();
        assert!(!timer.poll(10.0));
    }

    #[test]
    fn test_rearm_invalidates_old_handle() {
        let mut timer = OneShotTimer::new();
        let first = timer.arm(0.0, 3.0);
        let second = timer.arm(1.0, 3.0);
        assert!(!timer.is_live(first));
        assert!(timer.is_live(second));
        // New deadline applies
        assert!(!timer.poll(3.5));
        assert!(timer.poll(4.0));
    }

    #[test]
    fn test_unarmed_never_fires() {
        let mut timer = OneShotTimer::new();
        assert!(!timer.poll(100.0));
        assert!(!timer.is_armed());
    }
}
