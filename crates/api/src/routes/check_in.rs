//! Universal QR check-in route.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::check_in::{
    already_checked_in_message, checked_in_message, AttendeeSnapshot, UniversalCheckInRequest,
    UniversalCheckInResponse,
};
use domain::models::{AttendeeKind, CheckInType, Farmer, GuestPass};
use domain::services::{CheckInOutcome, Resolved};
use tracing::info;
use shared::validation::is_valid_qr_code;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentVolunteer;
use crate::middleware::metrics::record_check_in;

/// Parses a check-in type from a request body.
pub(crate) fn parse_check_in_type(raw: &str) -> Result<CheckInType, ApiError> {
    raw.parse()
        .map_err(|e: domain::models::check_in::InvalidCheckInType| ApiError::Validation(e.to_string()))
}

/// Trims a scanned code and rejects strings no issued QR code can match.
pub(crate) fn scanned_code(raw: &str) -> Result<&str, ApiError> {
    let code = raw.trim();
    if is_valid_qr_code(code) {
        Ok(code)
    } else {
        Err(ApiError::NotFound(format!("No attendee found for QR code {}", code)))
    }
}

/// Scanner recorded on the row: the body value, else the volunteer's name.
pub(crate) fn scanner_name<'a>(requested: Option<&'a str>, volunteer: &'a str) -> &'a str {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => volunteer,
    }
}

fn outcome_message(outcome_recorded: bool, check_in_type: CheckInType, display_name: &str) -> String {
    if outcome_recorded {
        checked_in_message(check_in_type, display_name)
    } else {
        already_checked_in_message(check_in_type)
    }
}

/// Builds the wire response for a resolved universal check-in.
pub(crate) fn universal_response(
    resolved: Resolved<CheckInOutcome<Farmer>, CheckInOutcome<GuestPass>>,
    check_in_type: CheckInType,
) -> UniversalCheckInResponse {
    let (kind, recorded, display_name, attendee) = match resolved {
        Resolved::Registered(outcome) => {
            let recorded = outcome.is_recorded();
            let farmer = outcome.into_attendee();
            let name = farmer.attending_person().to_string();
            (
                AttendeeKind::Farmer,
                recorded,
                name,
                AttendeeSnapshot::Farmer(farmer.into()),
            )
        }
        Resolved::Guest(outcome) => {
            let recorded = outcome.is_recorded();
            let pass = outcome.into_attendee();
            let name = pass.display_name();
            (
                AttendeeKind::Guest,
                recorded,
                name,
                AttendeeSnapshot::Guest(pass.into()),
            )
        }
    };

    UniversalCheckInResponse {
        success: recorded,
        message: outcome_message(recorded, check_in_type, &display_name),
        kind: kind.as_str(),
        attendee_type: kind.attendee_type(),
        attendee,
        already_checked_in: (!recorded).then_some(true),
    }
}

/// Check in any attendee by QR code.
///
/// POST /api/v1/universal-checkin/:qr_code
///
/// Farmers are tried first, then guest passes. Repeating a check-in kind
/// is not an error: the response carries `alreadyCheckedIn: true`.
pub async fn universal_check_in(
    State(state): State<AppState>,
    CurrentVolunteer(volunteer): CurrentVolunteer,
    Path(qr_code): Path<String>,
    Json(request): Json<UniversalCheckInRequest>,
) -> Result<Json<UniversalCheckInResponse>, ApiError> {
    request.validate()?;
    let check_in_type = parse_check_in_type(&request.check_in_type)?;
    let code = scanned_code(&qr_code)?;
    let scanned_by = scanner_name(request.scanned_by.as_deref(), &volunteer.name);

    let resolved = state
        .check_ins
        .universal_check_in(
            code,
            check_in_type.as_str(),
            Some(scanned_by),
            request.was_behalf,
        )
        .await?;

    let (pool, outcome) = match &resolved {
        Resolved::Registered(o) => ("farmer", o.label()),
        Resolved::Guest(o) => ("guest", o.label()),
    };
    record_check_in(pool, check_in_type.as_str(), outcome);

    let response = universal_response(resolved, check_in_type);

    info!(
        qr_code = %code,
        check_in_type = %check_in_type,
        attendee_type = response.attendee_type,
        volunteer_id = %volunteer.volunteer_id,
        outcome,
        "Universal check-in"
    );

    Ok(Json(response))
}
