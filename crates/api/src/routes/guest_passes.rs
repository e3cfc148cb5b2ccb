//! Guest pass routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::check_in::{
    already_checked_in_message, checked_in_message, AttendeeKind, CheckInHistoryResponse,
    FastCheckInRequest,
};
use domain::models::guest_pass::{
    AssignGuestPassRequest, FastCheckInResponse, GenerateGuestPassesRequest,
    GenerateGuestPassesResponse, GuestPassResponse, ListGuestPassesQuery, ListGuestPassesResponse,
};
use domain::models::GuestPass;
use persistence::repositories::GuestPassRepository;
use shared::pagination::{PageInfo, PageWindow};
use shared::validation::normalize_mobile;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentVolunteer;
use crate::middleware::metrics::record_check_in;
use crate::routes::check_in::{parse_check_in_type, scanned_code};

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Generate a batch of passes for a category.
///
/// POST /api/v1/guest-passes/generate
///
/// Requires admin role.
pub async fn generate_guest_passes(
    State(state): State<AppState>,
    CurrentVolunteer(admin): CurrentVolunteer,
    Json(request): Json<GenerateGuestPassesRequest>,
) -> Result<(StatusCode, Json<GenerateGuestPassesResponse>), ApiError> {
    request.validate()?;

    let repo = GuestPassRepository::new(state.pool.clone());
    let passes: Vec<GuestPassResponse> = repo
        .generate(request.category, request.count)
        .await?
        .into_iter()
        .map(|p| GuestPass::from(p).into())
        .collect();

    info!(
        category = %request.category,
        generated = passes.len(),
        admin_id = %admin.volunteer_id,
        "Guest passes generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateGuestPassesResponse {
            category: request.category,
            generated: passes.len(),
            passes,
        }),
    ))
}

/// List guest passes.
///
/// GET /api/v1/guest-passes?category&assigned&page&perPage
pub async fn list_guest_passes(
    State(state): State<AppState>,
    Query(query): Query<ListGuestPassesQuery>,
) -> Result<Json<ListGuestPassesResponse>, ApiError> {
    let repo = GuestPassRepository::new(state.pool.clone());
    let window = PageWindow::new(query.page, query.per_page);

    let passes = repo
        .list(query.category, query.assigned, window.limit(), window.offset())
        .await?;
    let total = repo.count(query.category, query.assigned).await?;

    Ok(Json(ListGuestPassesResponse {
        data: passes
            .into_iter()
            .map(|p| GuestPass::from(p).into())
            .collect(),
        pagination: PageInfo::new(window, total),
    }))
}

/// Get a guest pass by QR code.
///
/// GET /api/v1/guest-passes/qr/:qr_code
pub async fn get_guest_pass_by_qr(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
) -> Result<Json<GuestPassResponse>, ApiError> {
    let repo = GuestPassRepository::new(state.pool.clone());
    let entity = repo.find_by_qr_code(qr_code.trim()).await?.ok_or_else(|| {
        ApiError::NotFound(format!("Guest pass not found for QR code {}", qr_code))
    })?;
    Ok(Json(GuestPass::from(entity).into()))
}

/// Assign a pass to a named person.
///
/// PUT /api/v1/guest-passes/:id/assign
pub async fn assign_guest_pass(
    State(state): State<AppState>,
    CurrentVolunteer(volunteer): CurrentVolunteer,
    Path(pass_id): Path<Uuid>,
    Json(request): Json<AssignGuestPassRequest>,
) -> Result<Json<GuestPassResponse>, ApiError> {
    request.validate()?;

    let mobile = trimmed(request.mobile.as_deref()).map(normalize_mobile);

    let repo = GuestPassRepository::new(state.pool.clone());
    let entity = repo
        .assign(
            pass_id,
            request.name.trim(),
            mobile.as_deref(),
            trimmed(request.designation.as_deref()),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Guest pass not found".to_string()))?;

    info!(
        guest_pass_id = %entity.id,
        qr_code = %entity.qr_code,
        volunteer_id = %volunteer.volunteer_id,
        "Guest pass assigned"
    );

    Ok(Json(GuestPass::from(entity).into()))
}

/// Anonymous check-in for guest passes.
///
/// POST /api/v1/guest-passes/fast-checkin/:qr_code
///
/// No token is required; the route is rate limited per client instead.
/// Farmer QR codes are not resolved here.
pub async fn fast_check_in(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
    Json(request): Json<FastCheckInRequest>,
) -> Result<Json<FastCheckInResponse>, ApiError> {
    let check_in_type = parse_check_in_type(&request.check_in_type)?;
    let code = scanned_code(&qr_code)?;

    let outcome = state
        .check_ins
        .guest_check_in(code, check_in_type.as_str())
        .await?;
    record_check_in("guest", check_in_type.as_str(), outcome.label());

    let recorded = outcome.is_recorded();
    let pass = outcome.into_attendee();
    let message = if recorded {
        checked_in_message(check_in_type, &pass.display_name())
    } else {
        already_checked_in_message(check_in_type)
    };

    info!(
        qr_code = %pass.qr_code,
        check_in_type = %check_in_type,
        recorded,
        "Fast check-in"
    );

    Ok(Json(FastCheckInResponse {
        success: recorded,
        message,
        pass: Some(pass.into()),
    }))
}

/// Check-in history of a guest pass.
///
/// GET /api/v1/guest-passes/:id/check-ins
pub async fn list_guest_pass_check_ins(
    State(state): State<AppState>,
    Path(pass_id): Path<Uuid>,
) -> Result<Json<CheckInHistoryResponse>, ApiError> {
    let repo = GuestPassRepository::new(state.pool.clone());
    if repo.find_by_id(pass_id).await?.is_none() {
        return Err(ApiError::NotFound("Guest pass not found".to_string()));
    }

    let check_ins = repo
        .list_check_ins(pass_id)
        .await?
        .into_iter()
        .map(|c| c.into_domain(AttendeeKind::Guest))
        .collect();

    Ok(Json(CheckInHistoryResponse {
        attendee_id: pass_id,
        check_ins,
    }))
}
