//! Injected environment dependencies.
//!
//! Time is the only ambient input the registry reads: it names uploaded files
//! and stamps new records. Abstracting it keeps both deterministic in tests.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use registry_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let before = chrono::Utc::now();
/// assert!(clock.now() >= before);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
