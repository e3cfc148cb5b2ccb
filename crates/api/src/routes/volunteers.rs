//! Volunteer registration, login and approval routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::volunteer::{
    ListVolunteersQuery, ListVolunteersResponse, LoginRequest, LoginResponse,
    RegisterVolunteerRequest, VolunteerResponse,
};
use domain::models::{Volunteer, VolunteerStatus};
use persistence::entities::{VolunteerRoleDb, VolunteerStatusDb};
use persistence::repositories::VolunteerRepository;
use shared::jwt::Role;
use shared::password::{hash_password, verify_password};
use shared::validation::normalize_mobile;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentVolunteer;

const INVALID_CREDENTIALS: &str = "Invalid mobile number or password";

/// Login is refused for accounts that are not approved.
fn login_gate(volunteer: &Volunteer) -> Result<(), ApiError> {
    match volunteer.status {
        VolunteerStatus::Approved => Ok(()),
        VolunteerStatus::Pending => Err(ApiError::Forbidden(
            "Volunteer account is pending approval".to_string(),
        )),
        VolunteerStatus::Rejected => Err(ApiError::Forbidden(
            "Volunteer account has been rejected".to_string(),
        )),
    }
}

/// Self-registration. New accounts wait for admin approval.
///
/// POST /api/v1/volunteers/register
pub async fn register_volunteer(
    State(state): State<AppState>,
    Json(request): Json<RegisterVolunteerRequest>,
) -> Result<(StatusCode, Json<VolunteerResponse>), ApiError> {
    request.validate()?;

    let mobile = normalize_mobile(&request.mobile);
    let password_hash = hash_password(&request.password)?;

    let repo = VolunteerRepository::new(state.pool.clone());
    let entity = repo
        .create(
            request.name.trim(),
            &mobile,
            &password_hash,
            VolunteerRoleDb::from(Role::Volunteer),
            VolunteerStatusDb::from(VolunteerStatus::Pending),
        )
        .await?;

    info!(volunteer_id = %entity.id, "Volunteer registered, awaiting approval");

    Ok((StatusCode::CREATED, Json(Volunteer::from(entity).into())))
}

/// Exchange mobile and password for an access token.
///
/// POST /api/v1/volunteers/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let repo = VolunteerRepository::new(state.pool.clone());
    let mobile = normalize_mobile(&request.mobile);

    let volunteer: Volunteer = repo
        .find_by_mobile(&mobile)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?
        .into();

    if !verify_password(&request.password, &volunteer.password_hash)? {
        warn!(volunteer_id = %volunteer.id, "Login failed: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    login_gate(&volunteer)?;

    let (access_token, _jti) = state
        .jwt
        .generate_access_token(volunteer.id, &volunteer.name, volunteer.role)
        .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))?;

    repo.touch_last_login(volunteer.id).await?;

    info!(volunteer_id = %volunteer.id, role = %volunteer.role, "Volunteer logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt.access_token_expiry_secs,
        volunteer: volunteer.into(),
    }))
}

/// List volunteers, optionally by status.
///
/// GET /api/v1/volunteers?status
///
/// Requires admin role.
pub async fn list_volunteers(
    State(state): State<AppState>,
    Query(query): Query<ListVolunteersQuery>,
) -> Result<Json<ListVolunteersResponse>, ApiError> {
    let repo = VolunteerRepository::new(state.pool.clone());
    let volunteers = repo.list(query.status.map(VolunteerStatusDb::from)).await?;

    Ok(Json(ListVolunteersResponse {
        data: volunteers
            .into_iter()
            .map(|v| Volunteer::from(v).into())
            .collect(),
    }))
}

async fn decide(
    state: &AppState,
    admin_id: Uuid,
    volunteer_id: Uuid,
    status: VolunteerStatus,
) -> Result<Json<VolunteerResponse>, ApiError> {
    let repo = VolunteerRepository::new(state.pool.clone());
    let entity = repo
        .update_status(volunteer_id, status.into(), admin_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Volunteer not found".to_string()))?;

    info!(
        volunteer_id = %volunteer_id,
        admin_id = %admin_id,
        status = %status,
        "Volunteer status changed"
    );

    Ok(Json(Volunteer::from(entity).into()))
}

/// Approve a volunteer.
///
/// POST /api/v1/volunteers/:id/approve
pub async fn approve_volunteer(
    State(state): State<AppState>,
    CurrentVolunteer(admin): CurrentVolunteer,
    Path(volunteer_id): Path<Uuid>,
) -> Result<Json<VolunteerResponse>, ApiError> {
    decide(&state, admin.volunteer_id, volunteer_id, VolunteerStatus::Approved).await
}

/// Reject a volunteer.
///
/// POST /api/v1/volunteers/:id/reject
pub async fn reject_volunteer(
    State(state): State<AppState>,
    CurrentVolunteer(admin): CurrentVolunteer,
    Path(volunteer_id): Path<Uuid>,
) -> Result<Json<VolunteerResponse>, ApiError> {
    if volunteer_id == admin.volunteer_id {
        return Err(ApiError::Validation(
            "Administrators cannot reject their own account".to_string(),
        ));
    }
    decide(&state, admin.volunteer_id, volunteer_id, VolunteerStatus::Rejected).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn volunteer(status: VolunteerStatus) -> Volunteer {
        let now = Utc::now();
        Volunteer {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            mobile: "9876543210".to_string(),
            password_hash: String::new(),
            role: Role::Volunteer,
            status,
            approved_by: None,
            approved_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_login_gate() {
        assert!(login_gate(&volunteer(VolunteerStatus::Approved)).is_ok());

        match login_gate(&volunteer(VolunteerStatus::Pending)) {
            Err(ApiError::Forbidden(msg)) => assert!(msg.contains("pending")),
            other => panic!("unexpected {:?}", other),
        }
        match login_gate(&volunteer(VolunteerStatus::Rejected)) {
            Err(ApiError::Forbidden(msg)) => assert!(msg.contains("rejected")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
