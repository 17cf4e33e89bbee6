//! Single-drain guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// Ensures at most one drain runs at a time.
#[derive(Debug, Default)]
pub struct DrainLock {
    held: AtomicBool,
}

impl DrainLock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Take the lock if nobody holds it.
    ///
    /// The returned guard releases the lock when dropped.
    #[must_use]
    pub fn try_acquire(&self) -> Option<DrainGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| DrainGuard { lock: self })
    }

    /// Whether a drain is currently running.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Held for the duration of one drain.
#[derive(Debug)]
pub struct DrainGuard<'a> {
    lock: &'a DrainLock,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let lock = DrainLock::new();

        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.is_held());
        assert!(lock.try_acquire().is_none());

        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn bail(lock: &DrainLock) -> Result<(), String> {
            let _guard = lock.try_acquire().ok_or("held")?;
            Err("storage failed".to_string())
        }

        let lock = DrainLock::new();
        assert!(bail(&lock).is_err());
        assert!(!lock.is_held());
    }

    #[test]
    fn test_only_one_thread_wins() {
        let lock = Arc::new(DrainLock::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let guard = lock.try_acquire();
                    let won = guard.is_some();
                    // Hold until everyone has tried.
                    barrier.wait();
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
        assert!(!lock.is_held());
    }
}
