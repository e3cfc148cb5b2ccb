//! Guest pass domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::check_in::CheckInFlags;

/// Largest batch accepted by a single generate request.
pub const MAX_GENERATE_COUNT: u32 = 500;

/// Category a guest pass is issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestCategory {
    Delegate,
    Vip,
    Media,
    Speaker,
    Organizer,
}

impl GuestCategory {
    pub const ALL: [GuestCategory; 5] = [
        GuestCategory::Delegate,
        GuestCategory::Vip,
        GuestCategory::Media,
        GuestCategory::Speaker,
        GuestCategory::Organizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuestCategory::Delegate => "DELEGATE",
            GuestCategory::Vip => "VIP",
            GuestCategory::Media => "MEDIA",
            GuestCategory::Speaker => "SPEAKER",
            GuestCategory::Organizer => "ORGANIZER",
        }
    }
}

impl std::fmt::Display for GuestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuestCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DELEGATE" => Ok(GuestCategory::Delegate),
            "VIP" => Ok(GuestCategory::Vip),
            "MEDIA" => Ok(GuestCategory::Media),
            "SPEAKER" => Ok(GuestCategory::Speaker),
            "ORGANIZER" => Ok(GuestCategory::Organizer),
            _ => Err(format!(
                "Invalid category '{}'. Must be one of: DELEGATE, VIP, MEDIA, SPEAKER, ORGANIZER",
                s
            )),
        }
    }
}

/// QR code for the n-th pass of a category, e.g. `DELEGATE-007`.
pub fn guest_qr_code(category: GuestCategory, sequence_number: i32) -> String {
    format!("{}-{:03}", category, sequence_number)
}

/// A pre-printed pass that may be assigned to a named person later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPass {
    pub id: Uuid,
    pub category: GuestCategory,
    pub sequence_number: i32,
    pub qr_code: String,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub is_assigned: bool,
    #[serde(flatten)]
    pub check_ins: CheckInFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuestPass {
    /// Holder name, or a category placeholder while unassigned.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} Guest", self.category),
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for generating a batch of passes.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateGuestPassesRequest {
    pub category: GuestCategory,

    #[validate(range(min = 1, max = 500, message = "count must be between 1 and 500"))]
    pub count: u32,
}

/// Request payload for assigning a pass to a person.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignGuestPassRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_mobile"))]
    pub mobile: Option<String>,

    #[validate(length(max = 100, message = "designation must be at most 100 characters"))]
    pub designation: Option<String>,
}

/// Query parameters for listing passes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGuestPassesQuery {
    pub category: Option<GuestCategory>,
    pub assigned: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Public view of a guest pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPassResponse {
    pub id: Uuid,
    pub category: GuestCategory,
    pub sequence_number: i32,
    pub qr_code: String,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub is_assigned: bool,
    pub display_name: String,
    #[serde(flatten)]
    pub check_ins: CheckInFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GuestPass> for GuestPassResponse {
    fn from(pass: GuestPass) -> Self {
        let display_name = pass.display_name();
        Self {
            id: pass.id,
            category: pass.category,
            sequence_number: pass.sequence_number,
            qr_code: pass.qr_code,
            name: pass.name,
            mobile: pass.mobile,
            designation: pass.designation,
            is_assigned: pass.is_assigned,
            display_name,
            check_ins: pass.check_ins,
            created_at: pass.created_at,
            updated_at: pass.updated_at,
        }
    }
}

/// Response after generating passes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateGuestPassesResponse {
    pub category: GuestCategory,
    pub generated: usize,
    pub passes: Vec<GuestPassResponse>,
}

/// Paginated pass list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGuestPassesResponse {
    pub data: Vec<GuestPassResponse>,
    pub pagination: shared::pagination::PageInfo,
}

/// Response for the anonymous fast check-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FastCheckInResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<GuestPassResponse>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn sample_pass(category: GuestCategory, sequence_number: i32) -> GuestPass {
        let now = Utc::now();
        GuestPass {
            id: Uuid::new_v4(),
            category,
            sequence_number,
            qr_code: guest_qr_code(category, sequence_number),
            name: None,
            mobile: None,
            designation: None,
            is_assigned: false,
            check_ins: CheckInFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_guest_qr_code_padding() {
        assert_eq!(guest_qr_code(GuestCategory::Delegate, 7), "DELEGATE-007");
        assert_eq!(guest_qr_code(GuestCategory::Vip, 42), "VIP-042");
        assert_eq!(guest_qr_code(GuestCategory::Media, 1234), "MEDIA-1234");
    }

    #[test]
    fn test_display_name_fallback() {
        let mut pass = sample_pass(GuestCategory::Delegate, 7);
        assert_eq!(pass.display_name(), "DELEGATE Guest");

        pass.name = Some("  ".to_string());
        assert_eq!(pass.display_name(), "DELEGATE Guest");

        pass.name = Some("Asha Rao".to_string());
        assert_eq!(pass.display_name(), "Asha Rao");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("vip".parse::<GuestCategory>().unwrap(), GuestCategory::Vip);
        assert_eq!(
            "ORGANIZER".parse::<GuestCategory>().unwrap(),
            GuestCategory::Organizer
        );
        assert!("STAFF".parse::<GuestCategory>().is_err());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&GuestCategory::Speaker).unwrap();
        assert_eq!(json, "\"SPEAKER\"");
        let category: GuestCategory = serde_json::from_str("\"MEDIA\"").unwrap();
        assert_eq!(category, GuestCategory::Media);
    }

    #[test]
    fn test_generate_request_count_bounds() {
        let ok = GenerateGuestPassesRequest {
            category: GuestCategory::Vip,
            count: MAX_GENERATE_COUNT,
        };
        assert!(ok.validate().is_ok());

        let zero = GenerateGuestPassesRequest {
            category: GuestCategory::Vip,
            count: 0,
        };
        assert!(zero.validate().is_err());

        let too_many = GenerateGuestPassesRequest {
            category: GuestCategory::Vip,
            count: MAX_GENERATE_COUNT + 1,
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_response_includes_display_name() {
        let response = GuestPassResponse::from(sample_pass(GuestCategory::Delegate, 7));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["displayName"], "DELEGATE Guest");
        assert_eq!(json["qrCode"], "DELEGATE-007");
        assert_eq!(json["category"], "DELEGATE");
        assert_eq!(json["hasLunchCheckIn"], false);
    }
}
