//! Check-in domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::farmer::FarmerResponse;
use super::guest_pass::GuestPassResponse;

/// Event touchpoint that may be recorded once per attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInType {
    Entry,
    Lunch,
    Dinner,
    Session,
}

impl CheckInType {
    pub const ALL: [CheckInType; 4] = [
        CheckInType::Entry,
        CheckInType::Lunch,
        CheckInType::Dinner,
        CheckInType::Session,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInType::Entry => "entry",
            CheckInType::Lunch => "lunch",
            CheckInType::Dinner => "dinner",
            CheckInType::Session => "session",
        }
    }

    /// Capitalized form used in human-readable messages.
    pub fn label(&self) -> &'static str {
        match self {
            CheckInType::Entry => "Entry",
            CheckInType::Lunch => "Lunch",
            CheckInType::Dinner => "Dinner",
            CheckInType::Session => "Session",
        }
    }
}

impl std::fmt::Display for CheckInType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a check-in kind outside the fixed set is requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid check-in type '{0}'. Must be one of: entry, lunch, dinner, session")]
pub struct InvalidCheckInType(pub String);

impl FromStr for CheckInType {
    type Err = InvalidCheckInType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(CheckInType::Entry),
            "lunch" => Ok(CheckInType::Lunch),
            "dinner" => Ok(CheckInType::Dinner),
            "session" => Ok(CheckInType::Session),
            _ => Err(InvalidCheckInType(s.to_string())),
        }
    }
}

/// Denormalized "has checked in" flags carried on every attendee row.
///
/// Each flag is true exactly when a check-in record of that kind exists for
/// the attendee. Flags only ever move from false to true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInFlags {
    pub has_entry_check_in: bool,
    pub has_lunch_check_in: bool,
    pub has_dinner_check_in: bool,
    pub has_session_check_in: bool,
}

impl CheckInFlags {
    pub fn is_checked_in(&self, check_in_type: CheckInType) -> bool {
        match check_in_type {
            CheckInType::Entry => self.has_entry_check_in,
            CheckInType::Lunch => self.has_lunch_check_in,
            CheckInType::Dinner => self.has_dinner_check_in,
            CheckInType::Session => self.has_session_check_in,
        }
    }

    pub fn mark(&mut self, check_in_type: CheckInType) {
        match check_in_type {
            CheckInType::Entry => self.has_entry_check_in = true,
            CheckInType::Lunch => self.has_lunch_check_in = true,
            CheckInType::Dinner => self.has_dinner_check_in = true,
            CheckInType::Session => self.has_session_check_in = true,
        }
    }

    /// Number of kinds already recorded.
    pub fn count(&self) -> usize {
        CheckInType::ALL
            .iter()
            .filter(|t| self.is_checked_in(**t))
            .count()
    }
}

/// Which pool an attendee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeKind {
    Farmer,
    Guest,
}

impl AttendeeKind {
    /// Lower-case wire value (`type` field).
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendeeKind::Farmer => "farmer",
            AttendeeKind::Guest => "guest",
        }
    }

    /// Upper-case wire value (`attendeeType` field).
    pub fn attendee_type(&self) -> &'static str {
        match self {
            AttendeeKind::Farmer => "FARMER",
            AttendeeKind::Guest => "GUEST",
        }
    }
}

/// An append-only check-in log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub attendee_kind: AttendeeKind,
    #[serde(rename = "type")]
    pub check_in_type: CheckInType,
    pub scanned_by: Option<String>,
    pub was_delegate: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for a check-in about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckIn {
    pub check_in_type: CheckInType,
    pub scanned_by: Option<String>,
    pub was_delegate: bool,
}

impl NewCheckIn {
    pub fn new(check_in_type: CheckInType, scanned_by: Option<&str>, was_delegate: bool) -> Self {
        let scanned_by = scanned_by
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            check_in_type,
            scanned_by,
            was_delegate,
        }
    }
}

/// Request body for the universal check-in endpoint.
///
/// `type` is kept as a raw string so an unknown kind is reported as a
/// validation error rather than a body deserialization failure.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UniversalCheckInRequest {
    #[serde(rename = "type")]
    pub check_in_type: String,

    #[validate(length(max = 100, message = "scannedBy must be at most 100 characters"))]
    pub scanned_by: Option<String>,

    #[serde(default)]
    pub was_behalf: bool,
}

/// Request body for the farmer-only check-in endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmerCheckInRequest {
    #[serde(rename = "type")]
    pub check_in_type: String,

    #[validate(length(max = 100, message = "scannedBy must be at most 100 characters"))]
    pub scanned_by: Option<String>,

    #[serde(default)]
    pub was_delegate: bool,
}

/// Request body for the anonymous guest pass check-in.
#[derive(Debug, Clone, Deserialize)]
pub struct FastCheckInRequest {
    #[serde(rename = "type")]
    pub check_in_type: String,
}

/// Attendee snapshot returned by the universal check-in.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AttendeeSnapshot {
    Farmer(FarmerResponse),
    Guest(GuestPassResponse),
}

/// Response for the universal check-in endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalCheckInResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attendee_type: &'static str,
    pub attendee: AttendeeSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_checked_in: Option<bool>,
}

/// Response for the farmer-only check-in endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerCheckInResponse {
    pub success: bool,
    pub message: String,
    pub farmer: FarmerResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_checked_in: Option<bool>,
}

/// Check-in history response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInHistoryResponse {
    pub attendee_id: Uuid,
    pub check_ins: Vec<CheckIn>,
}

/// Message shown when a kind was already recorded.
pub fn already_checked_in_message(check_in_type: CheckInType) -> String {
    format!("Already checked in for {}", check_in_type)
}

/// Message shown when a kind was recorded now.
pub fn checked_in_message(check_in_type: CheckInType, display_name: &str) -> String {
    format!("{} check-in successful for {}", check_in_type.label(), display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_type_parse() {
        assert_eq!("entry".parse::<CheckInType>().unwrap(), CheckInType::Entry);
        assert_eq!("Lunch".parse::<CheckInType>().unwrap(), CheckInType::Lunch);
        assert_eq!(" dinner ".parse::<CheckInType>().unwrap(), CheckInType::Dinner);
        assert_eq!("SESSION".parse::<CheckInType>().unwrap(), CheckInType::Session);
    }

    #[test]
    fn test_check_in_type_parse_rejects_unknown() {
        let err = "breakfast".parse::<CheckInType>().unwrap_err();
        assert_eq!(err, InvalidCheckInType("breakfast".to_string()));
        assert!(err.to_string().contains("breakfast"));
        assert!(err.to_string().contains("entry, lunch, dinner, session"));
        assert!("".parse::<CheckInType>().is_err());
    }

    #[test]
    fn test_check_in_type_display_round_trips() {
        for t in CheckInType::ALL {
            assert_eq!(t.to_string().parse::<CheckInType>().unwrap(), t);
        }
    }

    #[test]
    fn test_flags_mark_only_touches_one_kind() {
        for t in CheckInType::ALL {
            let mut flags = CheckInFlags::default();
            flags.mark(t);
            assert!(flags.is_checked_in(t));
            assert_eq!(flags.count(), 1);
        }
    }

    #[test]
    fn test_flags_mark_is_idempotent() {
        let mut flags = CheckInFlags::default();
        flags.mark(CheckInType::Lunch);
        flags.mark(CheckInType::Lunch);
        assert_eq!(flags.count(), 1);
    }

    #[test]
    fn test_flags_serialize_camel_case() {
        let mut flags = CheckInFlags::default();
        flags.mark(CheckInType::Entry);
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["hasEntryCheckIn"], true);
        assert_eq!(json["hasLunchCheckIn"], false);
        assert_eq!(json["hasDinnerCheckIn"], false);
        assert_eq!(json["hasSessionCheckIn"], false);
    }

    #[test]
    fn test_attendee_kind_wire_values() {
        assert_eq!(AttendeeKind::Farmer.as_str(), "farmer");
        assert_eq!(AttendeeKind::Farmer.attendee_type(), "FARMER");
        assert_eq!(AttendeeKind::Guest.as_str(), "guest");
        assert_eq!(AttendeeKind::Guest.attendee_type(), "GUEST");
    }

    #[test]
    fn test_new_check_in_normalizes_scanner() {
        let check_in = NewCheckIn::new(CheckInType::Entry, Some("  Volunteer-1 "), false);
        assert_eq!(check_in.scanned_by.as_deref(), Some("Volunteer-1"));

        let check_in = NewCheckIn::new(CheckInType::Entry, Some("   "), false);
        assert_eq!(check_in.scanned_by, None);
    }

    #[test]
    fn test_universal_request_deserialization() {
        let json = r#"{"type": "entry", "scannedBy": "Volunteer-1"}"#;
        let request: UniversalCheckInRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.check_in_type, "entry");
        assert_eq!(request.scanned_by.as_deref(), Some("Volunteer-1"));
        assert!(!request.was_behalf);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            already_checked_in_message(CheckInType::Entry),
            "Already checked in for entry"
        );
        assert_eq!(
            checked_in_message(CheckInType::Lunch, "DELEGATE Guest"),
            "Lunch check-in successful for DELEGATE Guest"
        );
    }
}
