//! Single-slot execution guard.
//!
//! At most one evaluation cycle may run at a time. Acquisition is an atomic
//! compare-and-swap, so two triggers racing on different worker threads
//! cannot both win. The returned [`GuardPermit`] clears the flag when it is
//! dropped: normal return, `?` early exit and unwinding all release it.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ExecutionGuard {
    running: AtomicBool,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to move from idle to running. `None` means a cycle is in flight.
    pub fn try_acquire(&self) -> Option<GuardPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GuardPermit { guard: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof of exclusive access to the evaluation slot.
#[derive(Debug)]
pub struct GuardPermit<'a> {
    guard: &'a ExecutionGuard,
}

impl Drop for GuardPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn second_acquire_fails_while_first_is_held() {
        let guard = ExecutionGuard::new();
        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.is_running());
        assert!(guard.try_acquire().is_none());
    }

    #[test]
    fn dropping_permit_returns_to_idle() {
        let guard = ExecutionGuard::new();
        drop(guard.try_acquire());
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn permit_is_released_on_panic() {
        let guard = Arc::new(ExecutionGuard::new());
        let inner = Arc::clone(&guard);

        let result = thread::spawn(move || {
            let _permit = inner.try_acquire().expect("guard should be idle");
            panic!("cycle failed");
        })
        .join();

        assert!(result.is_err());
        assert!(!guard.is_running());
    }

    #[test]
    fn only_one_of_many_racing_threads_wins() {
        let guard = Arc::new(ExecutionGuard::new());
        let barrier = Arc::new(Barrier::new(8));
        let holders = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                let holders = Arc::clone(&holders);
                thread::spawn(move || {
                    barrier.wait();
                    let permit = guard.try_acquire();
                    let won = permit.is_some();
                    // Hold the permit until every thread has tried.
                    holders.wait();
                    won
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
