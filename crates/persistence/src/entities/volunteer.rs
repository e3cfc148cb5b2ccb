//! Volunteer entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Volunteer, VolunteerRole, VolunteerStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for volunteer_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "volunteer_status", rename_all = "lowercase")]
pub enum VolunteerStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<VolunteerStatusDb> for VolunteerStatus {
    fn from(db: VolunteerStatusDb) -> Self {
        match db {
            VolunteerStatusDb::Pending => VolunteerStatus::Pending,
            VolunteerStatusDb::Approved => VolunteerStatus::Approved,
            VolunteerStatusDb::Rejected => VolunteerStatus::Rejected,
        }
    }
}

impl From<VolunteerStatus> for VolunteerStatusDb {
    fn from(status: VolunteerStatus) -> Self {
        match status {
            VolunteerStatus::Pending => VolunteerStatusDb::Pending,
            VolunteerStatus::Approved => VolunteerStatusDb::Approved,
            VolunteerStatus::Rejected => VolunteerStatusDb::Rejected,
        }
    }
}

/// Database enum for volunteer_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "volunteer_role", rename_all = "lowercase")]
pub enum VolunteerRoleDb {
    Volunteer,
    Admin,
}

impl From<VolunteerRoleDb> for VolunteerRole {
    fn from(db: VolunteerRoleDb) -> Self {
        match db {
            VolunteerRoleDb::Volunteer => VolunteerRole::Volunteer,
            VolunteerRoleDb::Admin => VolunteerRole::Admin,
        }
    }
}

impl From<VolunteerRole> for VolunteerRoleDb {
    fn from(role: VolunteerRole) -> Self {
        match role {
            VolunteerRole::Volunteer => VolunteerRoleDb::Volunteer,
            VolunteerRole::Admin => VolunteerRoleDb::Admin,
        }
    }
}

/// Database row mapping for the volunteers table.
#[derive(Debug, Clone, FromRow)]
pub struct VolunteerEntity {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub password_hash: String,
    pub role: VolunteerRoleDb,
    pub status: VolunteerStatusDb,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VolunteerEntity> for Volunteer {
    fn from(entity: VolunteerEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            mobile: entity.mobile,
            password_hash: entity.password_hash,
            role: entity.role.into(),
            status: entity.status.into(),
            approved_by: entity.approved_by,
            approved_at: entity.approved_at,
            last_login_at: entity.last_login_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Count of volunteers per status.
#[derive(Debug, Clone, FromRow)]
pub struct VolunteerStatusCountEntity {
    pub status: VolunteerStatusDb,
    pub count: i64,
}
