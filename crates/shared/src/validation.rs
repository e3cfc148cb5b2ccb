//! Common validation utilities.

use regex::Regex;
use validator::ValidationError;

lazy_static::lazy_static! {
    /// Ten-digit mobile number, optionally prefixed with +91.
    pub static ref MOBILE_REGEX: Regex = Regex::new(r"^(\+91)?[6-9]\d{9}$").unwrap();

    /// Twelve-digit government identity number.
    pub static ref GOVERNMENT_ID_REGEX: Regex = Regex::new(r"^\d{12}$").unwrap();

    /// QR codes are upper-case alphanumeric segments joined by hyphens.
    pub static ref QR_CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9]+(-[A-Z0-9]+)+$").unwrap();
}

/// Strips the optional country prefix so mobiles compare equal regardless of input form.
pub fn normalize_mobile(mobile: &str) -> String {
    let trimmed = mobile.trim();
    trimmed.strip_prefix("+91").unwrap_or(trimmed).to_string()
}

/// Validates a mobile number.
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if MOBILE_REGEX.is_match(mobile.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("mobile_format");
        err.message = Some("Mobile number must be a valid 10-digit number".into());
        Err(err)
    }
}

/// Validates a government identity number.
pub fn validate_government_id(id: &str) -> Result<(), ValidationError> {
    if GOVERNMENT_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        let mut err = ValidationError::new("government_id_format");
        err.message = Some("Government ID must be exactly 12 digits".into());
        Err(err)
    }
}

/// Returns true when the string looks like a QR code issued by this service.
pub fn is_valid_qr_code(qr_code: &str) -> bool {
    qr_code.len() <= 64 && QR_CODE_REGEX.is_match(qr_code)
}
