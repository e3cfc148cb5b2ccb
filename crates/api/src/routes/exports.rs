//! CSV export routes.
//!
//! Every export starts with a UTF-8 BOM so spreadsheet tools pick the right
//! encoding, and uses RFC 4180 quoting.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use domain::models::check_in::CheckInType;
use domain::models::{CheckInFlags, Farmer, GuestPass};
use persistence::entities::CheckInExportEntity;
use persistence::repositories::{FarmerRepository, GuestPassRepository, StatsRepository};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentVolunteer;

/// Escape a CSV field value.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// Accumulates CSV rows behind a BOM and a header line.
struct CsvDocument {
    body: String,
    rows: usize,
}

impl CsvDocument {
    fn new(header: &[&str]) -> Self {
        let mut body = String::new();
        body.push('\u{FEFF}');
        body.push_str(&header.join(","));
        body.push('\n');
        Self { body, rows: 0 }
    }

    fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let line: Vec<String> = fields
            .into_iter()
            .map(|f| escape_csv(f.as_ref()))
            .collect();
        self.body.push_str(&line.join(","));
        self.body.push('\n');
        self.rows += 1;
    }

    fn into_response(self, filename: &str) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

fn flag_fields(flags: &CheckInFlags) -> [&'static str; 4] {
    [
        yes_no(flags.is_checked_in(CheckInType::Entry)),
        yes_no(flags.is_checked_in(CheckInType::Lunch)),
        yes_no(flags.is_checked_in(CheckInType::Dinner)),
        yes_no(flags.is_checked_in(CheckInType::Session)),
    ]
}

const FLAG_COLUMNS: [&str; 4] = ["Entry", "Lunch", "Dinner", "Session"];

fn farmers_csv(farmers: &[Farmer]) -> CsvDocument {
    let mut header = vec![
        "QR Code",
        "Name",
        "Mobile",
        "Village",
        "District",
        "Delegate Name",
        "Delegate Mobile",
        "Delegate Attending",
    ];
    header.extend(FLAG_COLUMNS);
    header.push("Registered At");

    let mut csv = CsvDocument::new(&header);
    for farmer in farmers {
        let mut row = vec![
            farmer.qr_code.clone(),
            farmer.name.clone(),
            farmer.mobile.clone(),
            farmer.village.clone().unwrap_or_default(),
            farmer.district.clone().unwrap_or_default(),
            farmer.delegate_name.clone().unwrap_or_default(),
            farmer.delegate_mobile.clone().unwrap_or_default(),
            yes_no(farmer.is_delegate_attending).to_string(),
        ];
        row.extend(flag_fields(&farmer.check_ins).map(str::to_string));
        row.push(timestamp(&farmer.created_at));
        csv.push_row(row);
    }
    csv
}

fn guest_passes_csv(passes: &[GuestPass]) -> CsvDocument {
    let mut header = vec![
        "QR Code",
        "Category",
        "Sequence",
        "Name",
        "Mobile",
        "Designation",
        "Assigned",
    ];
    header.extend(FLAG_COLUMNS);

    let mut csv = CsvDocument::new(&header);
    for pass in passes {
        let mut row = vec![
            pass.qr_code.clone(),
            pass.category.to_string(),
            pass.sequence_number.to_string(),
            pass.name.clone().unwrap_or_default(),
            pass.mobile.clone().unwrap_or_default(),
            pass.designation.clone().unwrap_or_default(),
            yes_no(pass.is_assigned).to_string(),
        ];
        row.extend(flag_fields(&pass.check_ins).map(str::to_string));
        csv.push_row(row);
    }
    csv
}

fn check_ins_csv(rows: &[CheckInExportEntity]) -> CsvDocument {
    let mut csv = CsvDocument::new(&[
        "Attendee Type",
        "QR Code",
        "Attendee Name",
        "Check-in Type",
        "Scanned By",
        "On Behalf",
        "Checked In At",
    ]);
    for row in rows {
        let check_in_type: CheckInType = row.check_in_type.into();
        csv.push_row([
            row.attendee_type.clone(),
            row.qr_code.clone(),
            row.attendee_name.clone().unwrap_or_default(),
            check_in_type.to_string(),
            row.scanned_by.clone().unwrap_or_default(),
            yes_no(row.was_delegate).to_string(),
            timestamp(&row.created_at),
        ]);
    }
    csv
}

/// Export all farmers.
///
/// GET /api/v1/exports/farmers
pub async fn export_farmers(
    State(state): State<AppState>,
    CurrentVolunteer(admin): CurrentVolunteer,
) -> Result<Response, ApiError> {
    let farmers: Vec<Farmer> = FarmerRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(Farmer::from)
        .collect();

    let csv = farmers_csv(&farmers);
    info!(rows = csv.rows, admin_id = %admin.volunteer_id, "Farmers exported");
    Ok(csv.into_response("farmers.csv"))
}

/// Export all guest passes.
///
/// GET /api/v1/exports/guest-passes
pub async fn export_guest_passes(
    State(state): State<AppState>,
    CurrentVolunteer(admin): CurrentVolunteer,
) -> Result<Response, ApiError> {
    let passes: Vec<GuestPass> = GuestPassRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(GuestPass::from)
        .collect();

    let csv = guest_passes_csv(&passes);
    info!(rows = csv.rows, admin_id = %admin.volunteer_id, "Guest passes exported");
    Ok(csv.into_response("guest-passes.csv"))
}

/// Export the check-in log of both pools.
///
/// GET /api/v1/exports/check-ins
pub async fn export_check_ins(
    State(state): State<AppState>,
    CurrentVolunteer(admin): CurrentVolunteer,
) -> Result<Response, ApiError> {
    let rows = StatsRepository::new(state.pool.clone())
        .all_check_ins()
        .await?;

    let csv = check_ins_csv(&rows);
    info!(rows = csv.rows, admin_id = %admin.volunteer_id, "Check-ins exported");
    Ok(csv.into_response("check-ins.csv"))
}
