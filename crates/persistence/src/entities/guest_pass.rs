//! Guest pass entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CheckInFlags, GuestCategory, GuestPass};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for guest_category that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "guest_category", rename_all = "UPPERCASE")]
pub enum GuestCategoryDb {
    Delegate,
    Vip,
    Media,
    Speaker,
    Organizer,
}

impl From<GuestCategoryDb> for GuestCategory {
    fn from(db: GuestCategoryDb) -> Self {
        match db {
            GuestCategoryDb::Delegate => GuestCategory::Delegate,
            GuestCategoryDb::Vip => GuestCategory::Vip,
            GuestCategoryDb::Media => GuestCategory::Media,
            GuestCategoryDb::Speaker => GuestCategory::Speaker,
            GuestCategoryDb::Organizer => GuestCategory::Organizer,
        }
    }
}

impl From<GuestCategory> for GuestCategoryDb {
    fn from(category: GuestCategory) -> Self {
        match category {
            GuestCategory::Delegate => GuestCategoryDb::Delegate,
            GuestCategory::Vip => GuestCategoryDb::Vip,
            GuestCategory::Media => GuestCategoryDb::Media,
            GuestCategory::Speaker => GuestCategoryDb::Speaker,
            GuestCategory::Organizer => GuestCategoryDb::Organizer,
        }
    }
}

/// Database row mapping for the guest_passes table.
#[derive(Debug, Clone, FromRow)]
pub struct GuestPassEntity {
    pub id: Uuid,
    pub category: GuestCategoryDb,
    pub sequence_number: i32,
    pub qr_code: String,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub is_assigned: bool,
    pub has_entry_check_in: bool,
    pub has_lunch_check_in: bool,
    pub has_dinner_check_in: bool,
    pub has_session_check_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GuestPassEntity> for GuestPass {
    fn from(entity: GuestPassEntity) -> Self {
        Self {
            id: entity.id,
            category: entity.category.into(),
            sequence_number: entity.sequence_number,
            qr_code: entity.qr_code,
            name: entity.name,
            mobile: entity.mobile,
            designation: entity.designation,
            is_assigned: entity.is_assigned,
            check_ins: CheckInFlags {
                has_entry_check_in: entity.has_entry_check_in,
                has_lunch_check_in: entity.has_lunch_check_in,
                has_dinner_check_in: entity.has_dinner_check_in,
                has_session_check_in: entity.has_session_check_in,
            },
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
