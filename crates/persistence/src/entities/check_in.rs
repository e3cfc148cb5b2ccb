//! Check-in entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AttendeeKind, CheckIn, CheckInType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for check_in_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "check_in_type", rename_all = "lowercase")]
pub enum CheckInTypeDb {
    Entry,
    Lunch,
    Dinner,
    Session,
}

impl From<CheckInTypeDb> for CheckInType {
    fn from(db: CheckInTypeDb) -> Self {
        match db {
            CheckInTypeDb::Entry => CheckInType::Entry,
            CheckInTypeDb::Lunch => CheckInType::Lunch,
            CheckInTypeDb::Dinner => CheckInType::Dinner,
            CheckInTypeDb::Session => CheckInType::Session,
        }
    }
}

impl From<CheckInType> for CheckInTypeDb {
    fn from(t: CheckInType) -> Self {
        match t {
            CheckInType::Entry => CheckInTypeDb::Entry,
            CheckInType::Lunch => CheckInTypeDb::Lunch,
            CheckInType::Dinner => CheckInTypeDb::Dinner,
            CheckInType::Session => CheckInTypeDb::Session,
        }
    }
}

/// Row of farmer_check_ins or guest_check_ins, with the owner column
/// aliased to `attendee_id`.
#[derive(Debug, Clone, FromRow)]
pub struct CheckInEntity {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub check_in_type: CheckInTypeDb,
    pub scanned_by: Option<String>,
    pub was_delegate: bool,
    pub created_at: DateTime<Utc>,
}

impl CheckInEntity {
    pub fn into_domain(self, attendee_kind: AttendeeKind) -> CheckIn {
        CheckIn {
            id: self.id,
            attendee_id: self.attendee_id,
            attendee_kind,
            check_in_type: self.check_in_type.into(),
            scanned_by: self.scanned_by,
            was_delegate: self.was_delegate,
            created_at: self.created_at,
        }
    }
}

/// Flattened check-in row used by the CSV export.
#[derive(Debug, Clone, FromRow)]
pub struct CheckInExportEntity {
    pub attendee_type: String,
    pub qr_code: String,
    pub attendee_name: Option<String>,
    pub check_in_type: CheckInTypeDb,
    pub scanned_by: Option<String>,
    pub was_delegate: bool,
    pub created_at: DateTime<Utc>,
}

/// Count of check-ins per kind.
#[derive(Debug, Clone, FromRow)]
pub struct CheckInCountEntity {
    pub check_in_type: CheckInTypeDb,
    pub count: i64,
}
