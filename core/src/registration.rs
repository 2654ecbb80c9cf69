//! The registration record and its value types.

use crate::error::{RegistryError, Result};
use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default value of [`Registration::status`].
pub const DEFAULT_STATUS: &str = "pending";

/// Human-facing registration sequence number.
///
/// Always in `1..=9000`, rendered as four zero-padded digits. Because the
/// rendering is fixed-width, lexicographic order of the rendered strings equals
/// numeric order, which is what the store relies on to find the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipationNumber(u16);

impl ParticipationNumber {
    /// Highest number that can ever be handed out.
    pub const MAX: u16 = 9000;

    /// The number given to the very first registration.
    pub const FIRST: Self = Self(1);

    /// Creates a participation number, rejecting values outside `1..=9000`.
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value >= 1 && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// The number that follows this one, or `None` once the range is exhausted.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        if self.0 >= Self::MAX {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    /// Number to allocate given the highest one already stored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapacityExceeded`] when `last` is already `9000`.
    pub fn after(last: Option<Self>) -> Result<Self> {
        match last {
            None => Ok(Self::FIRST),
            Some(last) => last.successor().ok_or(RegistryError::CapacityExceeded {
                max: Self::MAX,
            }),
        }
    }
}

impl fmt::Display for ParticipationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for ParticipationNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidParticipationNumber(s.to_string());

        if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        s.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(invalid)
    }
}

impl Serialize for ParticipationNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParticipationNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Check-in flag, persisted as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegisterStatus {
    /// Registered online but not yet checked in.
    #[default]
    #[serde(rename = "No Register")]
    NotRegistered,
    /// Checked in by staff.
    #[serde(rename = "REGISTER")]
    Registered,
}

impl RegisterStatus {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRegistered => "No Register",
            Self::Registered => "REGISTER",
        }
    }
}

impl fmt::Display for RegisterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegisterStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "No Register" => Ok(Self::NotRegistered),
            "REGISTER" => Ok(Self::Registered),
            other => Err(format!("unknown register status: {other}")),
        }
    }
}

/// Validated attendee fields, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRegistration {
    /// Attendee full name.
    pub full_name: String,
    /// Attendee email address.
    pub email_address: String,
    /// Attendee phone number.
    pub phone_number: String,
    /// Attendee category (press, photographer, ...).
    pub kind: String,
    /// Event day.
    pub day: String,
    /// Event time slot.
    pub time: String,
    /// Instagram handle.
    pub instagram_username: String,
    /// Relative path of the stored profile picture, if one was uploaded.
    pub profile_picture: Option<String>,
}

/// A persisted registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Unique sequence number.
    pub participation_number: ParticipationNumber,
    /// Attendee full name.
    pub full_name: String,
    /// Attendee email address.
    pub email_address: String,
    /// Attendee phone number.
    pub phone_number: String,
    /// Attendee category.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event day.
    pub day: String,
    /// Event time slot.
    pub time: String,
    /// Instagram handle.
    pub instagram_username: String,
    /// Free-form status, `"pending"` on creation.
    pub status: String,
    /// Check-in flag.
    pub register_status: RegisterStatus,
    /// Relative path of the stored profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Builds a fresh record with the creation-time defaults applied.
    #[must_use]
    pub fn create(
        id: Uuid,
        participation_number: ParticipationNumber,
        new: NewRegistration,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            participation_number,
            full_name: new.full_name,
            email_address: new.email_address,
            phone_number: new.phone_number,
            kind: new.kind,
            day: new.day,
            time: new.time,
            instagram_username: new.instagram_username,
            status: DEFAULT_STATUS.to_string(),
            register_status: RegisterStatus::NotRegistered,
            profile_picture: new.profile_picture,
            created_at,
        }
    }

    /// Whether staff already checked this attendee in.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.register_status == RegisterStatus::Registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_number_is_0001() {
        let first = ParticipationNumber::after(None).unwrap();
        assert_eq!(first, ParticipationNumber::FIRST);
        assert_eq!(first.to_string(), "0001");
    }

    #[test]
    fn test_capacity_exceeded_at_9000() {
        let last = ParticipationNumber::new(9000).unwrap();
        let err = ParticipationNumber::after(Some(last)).unwrap_err();
        assert!(matches!(err, RegistryError::CapacityExceeded { max: 9000 }));
    }

    #[test]
    fn test_8999_allocates_9000() {
        let last = ParticipationNumber::new(8999).unwrap();
        assert_eq!(ParticipationNumber::after(Some(last)).unwrap().to_string(), "9000");
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        for raw in ["", "0", "0000", "9001", "12345", "12a4", "-1", " 12"] {
            assert!(raw.parse::<ParticipationNumber>().is_err(), "{raw:?} should be rejected");
        }
        assert_eq!("42".parse::<ParticipationNumber>().unwrap().value(), 42);
        assert_eq!("0042".parse::<ParticipationNumber>().unwrap().value(), 42);
    }

    #[test]
    fn test_serializes_as_padded_string() {
        let n = ParticipationNumber::new(7).unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"0007\"");
        let back: ParticipationNumber = serde_json::from_str("\"0007\"").unwrap();
        assert_eq!(back, n);
    }

    #[test]
    fn test_register_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&RegisterStatus::NotRegistered).unwrap(),
            "\"No Register\""
        );
        assert_eq!(serde_json::to_string(&RegisterStatus::Registered).unwrap(), "\"REGISTER\"");
        assert_eq!("REGISTER".parse::<RegisterStatus>(), Ok(RegisterStatus::Registered));
        assert!("registered".parse::<RegisterStatus>().is_err());
    }

    #[test]
    fn test_create_applies_defaults_and_camel_case() {
        let record = Registration::create(
            Uuid::nil(),
            ParticipationNumber::FIRST,
            NewRegistration {
                full_name: "Jane Doe".to_string(),
                email_address: "j@example.com".to_string(),
                kind: "Press".to_string(),
                ..NewRegistration::default()
            },
            DateTime::<Utc>::UNIX_EPOCH,
        );

        assert_eq!(record.status, "pending");
        assert!(!record.is_registered());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["participationNumber"], "0001");
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["type"], "Press");
        assert_eq!(json["registerStatus"], "No Register");
        assert!(json.get("profilePicture").is_none());
        assert!(json.get("__v").is_none());
    }

    proptest! {
        #[test]
        fn prop_display_is_four_digits_and_round_trips(value in 1u16..=9000) {
            let n = ParticipationNumber::new(value).unwrap();
            let rendered = n.to_string();
            prop_assert_eq!(rendered.len(), 4);
            prop_assert_eq!(rendered.parse::<ParticipationNumber>().unwrap(), n);
        }

        #[test]
        fn prop_successor_increments_and_orders_lexicographically(value in 1u16..9000) {
            let n = ParticipationNumber::new(value).unwrap();
            let next = n.successor().unwrap();
            prop_assert_eq!(next.value(), value + 1);
            prop_assert!(next.to_string() > n.to_string());
        }
    }
}
