//! Farmer entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CheckInFlags, Farmer};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the farmers table.
#[derive(Debug, Clone, FromRow)]
pub struct FarmerEntity {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub government_id: String,
    pub village: Option<String>,
    pub district: Option<String>,
    pub delegate_name: Option<String>,
    pub delegate_mobile: Option<String>,
    pub is_delegate_attending: bool,
    pub qr_code: String,
    pub has_entry_check_in: bool,
    pub has_lunch_check_in: bool,
    pub has_dinner_check_in: bool,
    pub has_session_check_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FarmerEntity> for Farmer {
    fn from(entity: FarmerEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            mobile: entity.mobile,
            government_id: entity.government_id,
            village: entity.village,
            district: entity.district,
            delegate_name: entity.delegate_name,
            delegate_mobile: entity.delegate_mobile,
            is_delegate_attending: entity.is_delegate_attending,
            qr_code: entity.qr_code,
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
