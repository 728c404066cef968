use std::sync::{Condvar, Mutex, PoisonError};

/// Single-use latch: any number of threads block in [`wait`](Self::wait) until one call to
/// [`release`](Self::release) lets all of them through.
///
/// Once released the latch stays released; later waits return immediately and later releases
/// do nothing. There is no reset, cancellation or timeout. A latch that is never released
/// blocks its waiters forever.
#[derive(Debug, Default)]
pub struct BinaryLatch {
    released: Mutex<bool>,
    cond: Condvar,
}

impl BinaryLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the latch is released.
    pub fn wait(&self) {
        let guard = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        let _released = self
            .cond
            .wait_while(guard, |released| !*released)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Releases every current and future waiter. Returns `true` only for the call that
    /// actually opened the latch.
    pub fn release(&self) -> bool {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        if *released {
            return false;
        }
        *released = true;
        self.cond.notify_all();
        true
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn all_waiters_wake_after_single_release() {
        let latch = Arc::new(BinaryLatch::new());
        let woken = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let latch = latch.clone();
                let woken = woken.clone();
                thread::spawn(move || {
                    latch.wait();
                    woken.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(woken.load(Ordering::SeqCst), 0);

        assert!(latch.release());
        for waiter in waiters {
            waiter.join().unwrap();
        }
        assert_eq!(woken.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn second_release_is_noop() {
        let latch = BinaryLatch::new();
        assert!(!latch.is_released());
        assert!(latch.release());
        assert!(!latch.release());
        assert!(latch.is_released());
    }

    #[test]
    fn wait_after_release_returns_immediately() {
        let latch = BinaryLatch::new();
        latch.release();
        latch.wait();
        latch.wait();
    }
}
