//! Injectable time source.
//!
//! The stats cache and scanner registry both evict on age. Taking the clock
//! as a trait object keeps their tests free of wall-clock sleeps.

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.now.write().expect("ManualClock lock poisoned");
        *guard += duration;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.now.write().expect("ManualClock lock poisoned");
        *guard = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("ManualClock lock poisoned")
    }
}
