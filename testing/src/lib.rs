//! # Registry Testing
//!
//! Test doubles for the attendee registry.
//!
//! This crate provides:
//! - [`FixedClock`] / [`test_clock`]: deterministic time
//! - [`InMemoryRecordStore`]: a [`RecordStore`](registry_core::RecordStore) over a `Vec`
//! - [`MockMailer`]: records sent mail, optionally failing first
//! - [`StaticRenderer`]: returns fixed document bytes
//!
//! ## Example
//!
//! ```
//! use registry_testing::{InMemoryRecordStore, test_clock};
//! use registry_core::{Clock, NewRegistration, RecordStore};
//! use registry_core::sequence::next_participation_number;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryRecordStore::new();
//! let number = next_participation_number(&store).await?;
//! let record = store
//!     .insert(number, NewRegistration::default(), test_clock().now())
//!     .await?;
//! assert_eq!(record.participation_number.to_string(), "0001");
//! # Ok(())
//! # }
//! ```

pub mod mail;
pub mod store;

use chrono::{DateTime, Utc};
use registry_core::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use registry_testing::mocks::FixedClock;
    /// use registry_core::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC,
    /// `1735689600000` in epoch milliseconds)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mail::{MockMailer, StaticRenderer};
pub use mocks::{FixedClock, test_clock};
pub use store::InMemoryRecordStore;
