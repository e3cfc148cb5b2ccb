//! Registered attendee (farmer) domain models.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::check_in::CheckInFlags;

/// Prefix shared by every farmer QR code.
pub const FARMER_QR_PREFIX: &str = "EVENT";

/// Length of the random part of a farmer QR code.
pub const FARMER_QR_SUFFIX_LEN: usize = 6;

const QR_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A pre-registered attendee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
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
    #[serde(flatten)]
    pub check_ins: CheckInFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Farmer {
    /// Name of the person expected at the gate.
    pub fn attending_person(&self) -> &str {
        match (&self.delegate_name, self.is_delegate_attending) {
            (Some(delegate), true) => delegate,
            _ => &self.name,
        }
    }
}

/// Generates a new farmer QR code such as `EVENT-7KQ2MZ`.
pub fn generate_farmer_qr_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..FARMER_QR_SUFFIX_LEN)
        .map(|_| QR_ALPHABET[rng.gen_range(0..QR_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", FARMER_QR_PREFIX, suffix)
}

/// Masks all but the last four digits of a government ID.
pub fn mask_government_id(id: &str) -> String {
    let visible = id.len().saturating_sub(4);
    format!("{}{}", "X".repeat(visible), &id[visible..])
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for registering a farmer.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFarmerRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_mobile"))]
    pub mobile: String,

    #[validate(custom(function = "shared::validation::validate_government_id"))]
    pub government_id: String,

    #[validate(length(max = 100, message = "village must be at most 100 characters"))]
    pub village: Option<String>,

    #[validate(length(max = 100, message = "district must be at most 100 characters"))]
    pub district: Option<String>,

    #[validate(length(min = 1, max = 100, message = "delegateName must be 1-100 characters"))]
    pub delegate_name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_mobile"))]
    pub delegate_mobile: Option<String>,
}

/// Request payload for changing delegate details.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDelegateRequest {
    #[validate(length(min = 1, max = 100, message = "delegateName must be 1-100 characters"))]
    pub delegate_name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_mobile"))]
    pub delegate_mobile: Option<String>,

    pub is_delegate_attending: bool,
}

/// Query parameters for listing farmers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFarmersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Matches name, mobile, village or QR code.
    pub search: Option<String>,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Public view of a farmer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerResponse {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub government_id: String,
    pub village: Option<String>,
    pub district: Option<String>,
    pub delegate_name: Option<String>,
    pub delegate_mobile: Option<String>,
    pub is_delegate_attending: bool,
    pub attending_person: String,
    pub qr_code: String,
    #[serde(flatten)]
    pub check_ins: CheckInFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Farmer> for FarmerResponse {
    fn from(farmer: Farmer) -> Self {
        let attending_person = farmer.attending_person().to_string();
        Self {
            id: farmer.id,
            government_id: mask_government_id(&farmer.government_id),
            name: farmer.name,
            mobile: farmer.mobile,
            village: farmer.village,
            district: farmer.district,
            delegate_name: farmer.delegate_name,
            delegate_mobile: farmer.delegate_mobile,
            is_delegate_attending: farmer.is_delegate_attending,
            attending_person,
            qr_code: farmer.qr_code,
            check_ins: farmer.check_ins,
            created_at: farmer.created_at,
            updated_at: farmer.updated_at,
        }
    }
}

/// Paginated farmer list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFarmersResponse {
    pub data: Vec<FarmerResponse>,
    pub pagination: shared::pagination::PageInfo,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::Fake;

    pub fn sample_farmer(qr_code: &str) -> Farmer {
        let now = Utc::now();
        Farmer {
            id: Uuid::new_v4(),
            name: Name().fake(),
            mobile: "9876543210".to_string(),
            government_id: "123412341234".to_string(),
            village: Some("Rampur".to_string()),
            district: None,
            delegate_name: None,
            delegate_mobile: None,
            is_delegate_attending: false,
            qr_code: qr_code.to_string(),
            check_ins: CheckInFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_generate_farmer_qr_code_format() {
        for _ in 0..50 {
            let code = generate_farmer_qr_code();
            assert_eq!(code.len(), FARMER_QR_PREFIX.len() + 1 + FARMER_QR_SUFFIX_LEN);
            assert!(code.starts_with("EVENT-"));
            assert!(shared::validation::is_valid_qr_code(&code));
        }
    }

    #[test]
    fn test_mask_government_id() {
        assert_eq!(mask_government_id("123412345678"), "XXXXXXXX5678");
        assert_eq!(mask_government_id("123"), "123");
    }

    #[test]
    fn test_attending_person_prefers_attending_delegate() {
        let mut farmer = sample_farmer("EVENT-ABC123");
        farmer.name = "Ravi".to_string();
        assert_eq!(farmer.attending_person(), "Ravi");

        farmer.delegate_name = Some("Sita".to_string());
        assert_eq!(farmer.attending_person(), "Ravi");

        farmer.is_delegate_attending = true;
        assert_eq!(farmer.attending_person(), "Sita");
    }

    #[test]
    fn test_farmer_response_masks_id_and_flattens_flags() {
        let farmer = sample_farmer("EVENT-ABC123");
        let response = FarmerResponse::from(farmer);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["governmentId"], "XXXXXXXX1234");
        assert_eq!(json["qrCode"], "EVENT-ABC123");
        assert_eq!(json["hasEntryCheckIn"], false);
        assert!(json.get("checkIns").is_none());
    }

    #[test]
    fn test_farmer_serde_round_trip_keeps_flags() {
        let mut farmer = sample_farmer("EVENT-ABC123");
        farmer.check_ins.mark(crate::models::CheckInType::Dinner);
        let json = serde_json::to_string(&farmer).unwrap();
        let back: Farmer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, farmer);
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterFarmerRequest {
            name: "Ravi".to_string(),
            mobile: "9876543210".to_string(),
            government_id: "123412341234".to_string(),
            village: None,
            district: None,
            delegate_name: None,
            delegate_mobile: None,
        };
        assert!(request.validate().is_ok());

        let bad = RegisterFarmerRequest {
            mobile: "12345".to_string(),
            government_id: "1234".to_string(),
            ..request.clone()
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("mobile"));
        assert!(fields.contains_key("government_id"));
    }

    #[test]
    fn test_register_request_rejects_bad_delegate_mobile() {
        let request = RegisterFarmerRequest {
            name: "Ravi".to_string(),
            mobile: "9876543210".to_string(),
            government_id: "123412341234".to_string(),
            village: None,
            district: None,
            delegate_name: Some("Sita".to_string()),
            delegate_mobile: Some("000".to_string()),
        };
        assert!(request.validate().is_err());
    }
}
