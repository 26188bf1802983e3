//! Cooperative cancellation and wall-clock deadlines.
//!
//! Long waits (such as polling for a lock marker) never block on their own;
//! they ask an [`AbortSignal`] whether to keep going and sleep through it so a
//! raised flag cuts the wait short.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// External "should I stop waiting" signal.
pub trait AbortSignal: Send + Sync {
    fn abort_requested(&self) -> bool;

    /// Waits up to `timeout`, returning early if an abort is raised.
    ///
    /// Returns whether an abort was requested by the end of the wait.
    fn wait_for_abort(&self, timeout: Duration) -> bool {
        std::thread::sleep(timeout);
        self.abort_requested()
    }
}

/// A signal that is never raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn abort_requested(&self) -> bool {
        false
    }
}

/// Shareable abort flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag and wakes every waiter.
    pub fn raise(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }
}

impl AbortSignal for AbortFlag {
    fn abort_requested(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_for_abort(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (raised, _) = cvar
            .wait_timeout_while(guard, timeout, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        *raised
    }
}

/// Expiry computed once from a timeout.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
