//! Fixed-window attempt counter keyed by an arbitrary identifier.
//!
//! State lives in this process only. Stale windows are replaced on the next
//! call for the same key and are never swept, so the map grows with the
//! number of distinct keys seen. A deployment with several instances needs a
//! shared store with atomic increment-and-expire instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Attempts allowed per window when not configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Window length in milliseconds when not configured.
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Source of the current time for windowed counters.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy)]
struct AttemptWindow {
    count: u32,
    reset_time: DateTime<Utc>,
}

#[derive(Debug)]
/// Fixed-window limiter: at most `max_attempts` per key per window.
pub struct RateLimiter<C = SystemClock> {
    max_attempts: u32,
    window: Duration,
    clock: C,
    windows: Mutex<HashMap<String, AttemptWindow>>,
}

impl RateLimiter {
    /// Limiter on the wall clock.
    #[must_use]
    pub fn new(max_attempts: u32, window_ms: u64) -> Self {
        Self::with_clock(max_attempts, window_ms, SystemClock)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Limiter on a caller-supplied clock.
    #[must_use]
    pub fn with_clock(max_attempts: u32, window_ms: u64, clock: C) -> Self {
        let window_ms = i64::try_from(window_ms).unwrap_or(i64::MAX);
        Self {
            max_attempts,
            window: Duration::try_milliseconds(window_ms).unwrap_or(Duration::MAX),
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `key` and report whether it is admitted.
    ///
    /// A denied attempt leaves the window untouched.
    pub fn is_allowed(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        match windows.get_mut(key) {
            Some(window) if now <= window.reset_time => {
                if window.count >= self.max_attempts {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                let reset_time = now
                    .checked_add_signed(self.window)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                windows.insert(
                    key.to_owned(),
                    AttemptWindow {
                        count: 1,
                        reset_time,
                    },
                );
                true
            }
        }
    }

    /// Drop the window for `key`, admitting the next attempt immediately.
    pub fn reset(&self, key: &str) {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Number of keys currently holding a window, stale ones included.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
