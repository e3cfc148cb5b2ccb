//! Creates the first admin volunteer at startup.
//!
//! Runs only when `admin.bootstrap_mobile` and `admin.bootstrap_password` are
//! set and no admin exists yet, so it is safe on every boot.

use domain::models::{VolunteerRole, VolunteerStatus};
use persistence::entities::{VolunteerRoleDb, VolunteerStatusDb};
use persistence::repositories::VolunteerRepository;
use shared::password::{hash_password, PasswordError, MIN_PASSWORD_LENGTH};
use shared::validation::{normalize_mobile, validate_mobile};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Outcome of a bootstrap attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AdminExists,
    Created,
}

/// Checks the bootstrap settings without touching the database.
pub fn bootstrap_credentials(
    config: &AdminBootstrapConfig,
) -> Result<Option<(String, &str)>, BootstrapError> {
    if config.bootstrap_mobile.trim().is_empty() {
        return Ok(None);
    }
    if config.bootstrap_password.is_empty() {
        warn!("EC__ADMIN__BOOTSTRAP_MOBILE is set but EC__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap");
        return Ok(None);
    }

    validate_mobile(&config.bootstrap_mobile).map_err(|_| {
        BootstrapError::Config("admin.bootstrap_mobile must be a 10-digit mobile number".into())
    })?;
    let mobile = normalize_mobile(&config.bootstrap_mobile);
    if config.bootstrap_password.len() < MIN_PASSWORD_LENGTH {
        return Err(BootstrapError::Config(format!(
            "admin.bootstrap_password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    Ok(Some((mobile, config.bootstrap_password.as_str())))
}

/// Bootstraps the admin volunteer if configured and none exists.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    let Some((mobile, password)) = bootstrap_credentials(config)? else {
        return Ok(BootstrapOutcome::NotConfigured);
    };

    let repo = VolunteerRepository::new(pool.clone());
    if repo.admin_exists().await? {
        info!("Admin volunteer already exists - skipping bootstrap");
        return Ok(BootstrapOutcome::AdminExists);
    }

    let password_hash = hash_password(password)?;
    let admin = repo
        .create(
            config.bootstrap_name.trim(),
            &mobile,
            &password_hash,
            VolunteerRoleDb::from(VolunteerRole::Admin),
            VolunteerStatusDb::from(VolunteerStatus::Approved),
        )
        .await?;

    info!(volunteer_id = %admin.id, "Bootstrap admin volunteer created");
    warn!("Remove EC__ADMIN__BOOTSTRAP_PASSWORD from the environment now that the admin exists");

    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mobile: &str, password: &str) -> AdminBootstrapConfig {
        AdminBootstrapConfig {
            bootstrap_name: "Event Administrator".to_string(),
            bootstrap_mobile: mobile.to_string(),
            bootstrap_password: password.to_string(),
        }
    }

    #[test]
    fn test_not_configured() {
        assert!(bootstrap_credentials(&config("", "")).unwrap().is_none());
        assert!(bootstrap_credentials(&config("9876543210", ""))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_mobile_is_config_error() {
        let cfg = config("12ab", "long-enough-pass");
        let result = bootstrap_credentials(&cfg);
        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }

    #[test]
    fn test_short_password_is_config_error() {
        let cfg = config("9876543210", "short");
        let result = bootstrap_credentials(&cfg);
        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }

    #[test]
    fn test_valid_credentials() {
        let cfg = config("+919876543210", "long-enough-pass");
        let (mobile, password) = bootstrap_credentials(&cfg).unwrap().unwrap();
        assert_eq!(mobile, "9876543210");
        assert_eq!(password, "long-enough-pass");
    }
}
