//! Clock capability used to stamp timestamp columns

use crate::Value;
use chrono::{DateTime, Utc};

/// Source of "current time" for a flush.
///
/// The insert engine calls `now` at most once per flush, so every row in one
/// statement shares the same timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> Value;
}

/// Wall-clock time in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Value {
        Value::DateTimeUtc(Utc::now())
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> Value {
        Value::DateTimeUtc(self.0)
    }
}
