//! Farmer (registered attendee) routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::check_in::{
    already_checked_in_message, checked_in_message, AttendeeKind, CheckInHistoryResponse,
    FarmerCheckInRequest, FarmerCheckInResponse,
};
use domain::models::farmer::{
    generate_farmer_qr_code, FarmerResponse, ListFarmersQuery, ListFarmersResponse,
    RegisterFarmerRequest, UpdateDelegateRequest,
};
use domain::models::Farmer;
use persistence::repositories::{FarmerRepository, NewFarmer};
use shared::pagination::{PageInfo, PageWindow};
use shared::validation::normalize_mobile;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentVolunteer;
use crate::middleware::metrics::record_check_in;
use crate::routes::check_in::{parse_check_in_type, scanned_code, scanner_name};

/// Attempts at drawing an unused QR code before giving up.
const QR_CODE_ATTEMPTS: usize = 5;

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn unused_qr_code(repo: &FarmerRepository) -> Result<String, ApiError> {
    for _ in 0..QR_CODE_ATTEMPTS {
        let candidate = generate_farmer_qr_code();
        if !repo.qr_code_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(ApiError::Internal(
        "Could not allocate a unique farmer QR code".to_string(),
    ))
}

/// Register a farmer.
///
/// POST /api/v1/farmers
pub async fn register_farmer(
    State(state): State<AppState>,
    CurrentVolunteer(volunteer): CurrentVolunteer,
    Json(request): Json<RegisterFarmerRequest>,
) -> Result<(StatusCode, Json<FarmerResponse>), ApiError> {
    request.validate()?;

    let repo = FarmerRepository::new(state.pool.clone());
    let qr_code = unused_qr_code(&repo).await?;

    let mobile = normalize_mobile(&request.mobile);
    let delegate_mobile = trimmed(request.delegate_mobile.as_deref()).map(normalize_mobile);

    let entity = repo
        .create(&NewFarmer {
            name: request.name.trim(),
            mobile: &mobile,
            government_id: request.government_id.trim(),
            village: trimmed(request.village.as_deref()),
            district: trimmed(request.district.as_deref()),
            delegate_name: trimmed(request.delegate_name.as_deref()),
            delegate_mobile: delegate_mobile.as_deref(),
            qr_code: &qr_code,
        })
        .await?;

    info!(
        farmer_id = %entity.id,
        qr_code = %entity.qr_code,
        volunteer_id = %volunteer.volunteer_id,
        "Farmer registered"
    );

    Ok((StatusCode::CREATED, Json(Farmer::from(entity).into())))
}

/// List farmers.
///
/// GET /api/v1/farmers?page&perPage&search
pub async fn list_farmers(
    State(state): State<AppState>,
    Query(query): Query<ListFarmersQuery>,
) -> Result<Json<ListFarmersResponse>, ApiError> {
    let repo = FarmerRepository::new(state.pool.clone());
    let window = PageWindow::new(query.page, query.per_page);
    let search = trimmed(query.search.as_deref());

    let farmers = repo.list(search, window.limit(), window.offset()).await?;
    let total = repo.count(search).await?;

    Ok(Json(ListFarmersResponse {
        data: farmers
            .into_iter()
            .map(|f| Farmer::from(f).into())
            .collect(),
        pagination: PageInfo::new(window, total),
    }))
}

/// Get a farmer by ID.
///
/// GET /api/v1/farmers/:id
pub async fn get_farmer(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let repo = FarmerRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(farmer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farmer not found".to_string()))?;
    Ok(Json(Farmer::from(entity).into()))
}

/// Get a farmer by QR code.
///
/// GET /api/v1/farmers/qr/:qr_code
pub async fn get_farmer_by_qr(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let repo = FarmerRepository::new(state.pool.clone());
    let entity = repo
        .find_by_qr_code(qr_code.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Farmer not found for QR code {}", qr_code)))?;
    Ok(Json(Farmer::from(entity).into()))
}

/// Update delegate details.
///
/// PATCH /api/v1/farmers/:id/delegate
///
/// The cached snapshot for the farmer's QR code is replaced with the updated row.
pub async fn update_delegate(
    State(state): State<AppState>,
    CurrentVolunteer(volunteer): CurrentVolunteer,
    Path(farmer_id): Path<Uuid>,
    Json(request): Json<UpdateDelegateRequest>,
) -> Result<Json<FarmerResponse>, ApiError> {
    request.validate()?;

    let delegate_name = trimmed(request.delegate_name.as_deref());
    if request.is_delegate_attending && delegate_name.is_none() {
        return Err(ApiError::Validation(
            "delegateName is required when the delegate is attending".to_string(),
        ));
    }
    let delegate_mobile = trimmed(request.delegate_mobile.as_deref()).map(normalize_mobile);

    let repo = FarmerRepository::new(state.pool.clone());
    let entity = repo
        .update_delegate(
            farmer_id,
            delegate_name,
            delegate_mobile.as_deref(),
            request.is_delegate_attending,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Farmer not found".to_string()))?;

    let farmer = Farmer::from(entity);
    state.check_ins.registered().refresh(&farmer).await;

    info!(
        farmer_id = %farmer.id,
        is_delegate_attending = farmer.is_delegate_attending,
        volunteer_id = %volunteer.volunteer_id,
        "Farmer delegate updated"
    );

    Ok(Json(farmer.into()))
}

/// Farmer-only check-in.
///
/// POST /api/v1/farmers/checkin/:qr_code
pub async fn check_in_farmer(
    State(state): State<AppState>,
    CurrentVolunteer(volunteer): CurrentVolunteer,
    Path(qr_code): Path<String>,
    Json(request): Json<FarmerCheckInRequest>,
) -> Result<Json<FarmerCheckInResponse>, ApiError> {
    request.validate()?;
    let check_in_type = parse_check_in_type(&request.check_in_type)?;
    let code = scanned_code(&qr_code)?;
    let scanned_by = scanner_name(request.scanned_by.as_deref(), &volunteer.name);

    let outcome = state
        .check_ins
        .registered_check_in(
            code,
            check_in_type.as_str(),
            Some(scanned_by),
            request.was_delegate,
        )
        .await?;
    record_check_in("farmer", check_in_type.as_str(), outcome.label());

    let recorded = outcome.is_recorded();
    let farmer = outcome.into_attendee();
    let message = if recorded {
        checked_in_message(check_in_type, farmer.attending_person())
    } else {
        already_checked_in_message(check_in_type)
    };

    Ok(Json(FarmerCheckInResponse {
        success: recorded,
        message,
        farmer: farmer.into(),
        already_checked_in: (!recorded).then_some(true),
    }))
}

/// Check-in history of a farmer.
///
/// GET /api/v1/farmers/:id/check-ins
pub async fn list_farmer_check_ins(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> Result<Json<CheckInHistoryResponse>, ApiError> {
    let repo = FarmerRepository::new(state.pool.clone());
    if repo.find_by_id(farmer_id).await?.is_none() {
        return Err(ApiError::NotFound("Farmer not found".to_string()));
    }

    let check_ins = repo
        .list_check_ins(farmer_id)
        .await?
        .into_iter()
        .map(|c| c.into_domain(AttendeeKind::Farmer))
        .collect();

    Ok(Json(CheckInHistoryResponse {
        attendee_id: farmer_id,
        check_ins,
    }))
}
