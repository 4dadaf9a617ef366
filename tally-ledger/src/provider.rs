//! Injected clock and identifier generation
//!
//! The engine never calls `Utc::now()` or generates ids itself; both come in
//! through these traits so tests can pin time and ids deterministically.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of timestamps
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Source of globally-unique identifiers
pub trait IdProvider: Send + Sync {
    /// Fresh unique identifier
    fn new_id(&self) -> String;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// UUIDv7 identifiers (time-ordered)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdProvider for UuidIds {
    fn new_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}
