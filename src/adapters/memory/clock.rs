//! Manually driven clock for deterministic tests.

use std::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Clock that only moves when told to.
///
/// # Example
///
/// ```ignore
/// let clock = ManualClock::at_unix(1_704_067_200);
/// clock.advance_secs(3600);
/// ```
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts at the given Unix time, or the epoch if out of range.
    pub fn at_unix(secs: i64) -> Self {
        Self::new(Timestamp::from_unix_secs(secs).unwrap_or_else(|| {
            Timestamp::from_datetime(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
        }))
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.plus_secs(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
