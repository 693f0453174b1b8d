//! Rate limiting for notifications.
//!
//! A conversion emits one progress event per source line; a 200 000-line
//! novel produces 200 000 events in a few hundred milliseconds. Observers
//! that log or redraw on every event can wrap themselves in
//! [`ThrottledProgress`] to see each milestone once and the per-line
//! `Analyzing` stream at most once per cooldown.
//!
//! [`NotificationThrottle`] holds no global state. Each instance owns its
//! own map and is dropped with whatever owns it.

use crate::output::ConversionResult;
use crate::progress::{ConversionProgressCallback, ProgressEvent};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-identifier bookkeeping.
#[derive(Debug, Clone, Copy)]
struct Entry {
    last_emitted: Instant,
    suppressed: u32,
}

/// Lets a notification through at most once per `cooldown` for each id.
///
/// The first notification for an id always passes.
///
/// ```rust
/// use std::time::Duration;
/// use txt2md::NotificationThrottle;
///
/// let throttle = NotificationThrottle::new(Duration::from_secs(10));
/// assert!(throttle.should_emit("disk-full"));
/// assert!(!throttle.should_emit("disk-full"));
/// assert!(throttle.should_emit("other-warning"));
/// assert_eq!(throttle.suppressed("disk-full"), 1);
/// ```
#[derive(Debug)]
pub struct NotificationThrottle {
    cooldown: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl NotificationThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Record an attempt for `id` and report whether it should be shown.
    pub fn should_emit(&self, id: &str) -> bool {
        self.should_emit_at(id, Instant::now())
    }

    fn should_emit_at(&self, id: &str, now: Instant) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match entries.get_mut(id) {
            None => {
                entries.insert(
                    id.to_string(),
                    Entry {
                        last_emitted: now,
                        suppressed: 0,
                    },
                );
                true
            }
            Some(entry) if now.saturating_duration_since(entry.last_emitted) >= self.cooldown => {
                entry.last_emitted = now;
                entry.suppressed = 0;
                true
            }
            Some(entry) => {
                entry.suppressed = entry.suppressed.saturating_add(1);
                false
            }
        }
    }

    /// Attempts for `id` swallowed since it last passed.
    pub fn suppressed(&self, id: &str) -> u32 {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(id).map(|e| e.suppressed).unwrap_or(0)
    }

    /// Forget every id.
    pub fn reset(&self) {
        match self.entries.lock() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

/// Wraps an observer and throttles its progress events by phase.
///
/// Each phase id is throttled independently, so `Starting`, `Reading`,
/// `Saving`, `Done` and `Failed` (each emitted once per run) always reach
/// the inner observer, while repeated `Analyzing` events are thinned out.
/// Completion is never throttled.
pub struct ThrottledProgress<C> {
    inner: C,
    throttle: NotificationThrottle,
}

impl<C: ConversionProgressCallback> ThrottledProgress<C> {
    pub fn new(inner: C, cooldown: Duration) -> Self {
        Self {
            inner,
            throttle: NotificationThrottle::new(cooldown),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: ConversionProgressCallback> ConversionProgressCallback for ThrottledProgress<C> {
    fn on_progress(&self, event: &ProgressEvent) {
        if self.throttle.should_emit(event.phase.as_str()) {
            self.inner.on_progress(event);
        }
    }

    fn on_complete(&self, result: &ConversionResult) {
        self.throttle.reset();
        self.inner.on_complete(result);
    }
}
