//! Volunteer domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use shared::jwt::Role as VolunteerRole;

/// Approval state of a volunteer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolunteerStatus {
    Pending,
    Approved,
    Rejected,
}

impl VolunteerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolunteerStatus::Pending => "pending",
            VolunteerStatus::Approved => "approved",
            VolunteerStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gate volunteer or administrator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: VolunteerRole,
    pub status: VolunteerStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Volunteer {
    pub fn is_approved(&self) -> bool {
        self.status == VolunteerStatus::Approved
    }
}

/// Request payload for volunteer self-registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVolunteerRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_mobile"))]
    pub mobile: String,

    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
}

/// Request payload for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "mobile is required"))]
    pub mobile: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Query parameters for listing volunteers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVolunteersQuery {
    pub status: Option<VolunteerStatus>,
}

/// Public view of a volunteer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerResponse {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub role: VolunteerRole,
    pub status: VolunteerStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Volunteer> for VolunteerResponse {
    fn from(v: Volunteer) -> Self {
        Self {
            id: v.id,
            name: v.name,
            mobile: v.mobile,
            role: v.role,
            status: v.status,
            approved_at: v.approved_at,
            last_login_at: v.last_login_at,
            created_at: v.created_at,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub volunteer: VolunteerResponse,
}

/// List of volunteers.
#[derive(Debug, Clone, Serialize)]
pub struct ListVolunteersResponse {
    pub data: Vec<VolunteerResponse>,
}
