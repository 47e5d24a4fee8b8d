//! Time source abstraction.
//!
//! OTP and reset-token expiry are pure functions of "now", so the clock is
//! an injected dependency rather than a direct `Utc::now()` call. Tests pin
//! or advance time through a manual implementation.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
