//! Clock port.
//!
//! Every time-dependent decision (session expiry, signature tolerance,
//! record timestamps) reads the time through this port so behaviour is
//! deterministic under test.

use crate::domain::foundation::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
