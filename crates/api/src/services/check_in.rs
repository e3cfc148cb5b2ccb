//! PostgreSQL-backed attendee pools for the check-in service.

use async_trait::async_trait;
use domain::models::{Farmer, GuestPass, NewCheckIn};
use domain::services::{AttendeePool, CachedPool, CheckInError, CheckInService, CheckInSubject};
use persistence::repositories::{FarmerRepository, GuestPassRepository};

fn storage_error(err: sqlx::Error) -> CheckInError {
    CheckInError::Storage(err.to_string())
}

/// Registered attendees (farmers).
#[derive(Clone)]
pub struct FarmerStore {
    repo: FarmerRepository,
}

impl FarmerStore {
    pub fn new(repo: FarmerRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AttendeePool for FarmerStore {
    type Attendee = Farmer;

    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Farmer>, CheckInError> {
        let entity = self
            .repo
            .find_by_qr_code(qr_code)
            .await
            .map_err(storage_error)?;
        Ok(entity.map(Farmer::from))
    }

    async fn append_check_in(
        &self,
        farmer: &Farmer,
        check_in: &NewCheckIn,
    ) -> Result<Option<Farmer>, CheckInError> {
        let entity = self
            .repo
            .record_check_in(farmer.attendee_id(), check_in)
            .await
            .map_err(storage_error)?;
        Ok(entity.map(Farmer::from))
    }
}

/// Guest passes.
#[derive(Clone)]
pub struct GuestPassStore {
    repo: GuestPassRepository,
}

impl GuestPassStore {
    pub fn new(repo: GuestPassRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AttendeePool for GuestPassStore {
    type Attendee = GuestPass;

    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<GuestPass>, CheckInError> {
        let entity = self
            .repo
            .find_by_qr_code(qr_code)
            .await
            .map_err(storage_error)?;
        Ok(entity.map(GuestPass::from))
    }

    async fn append_check_in(
        &self,
        pass: &GuestPass,
        check_in: &NewCheckIn,
    ) -> Result<Option<GuestPass>, CheckInError> {
        let entity = self
            .repo
            .record_check_in(pass.attendee_id(), check_in)
            .await
            .map_err(storage_error)?;
        Ok(entity.map(GuestPass::from))
    }
}

/// Farmer pool with the optional cache mirror in front.
pub type CachedFarmerStore = CachedPool<FarmerStore>;

/// The check-in service as wired into the application.
pub type EventCheckIns = CheckInService<CachedFarmerStore, GuestPassStore>;

/// Cache namespace for farmer snapshots.
pub const FARMER_CACHE_NAMESPACE: &str = "farmer";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let err = storage_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, CheckInError::Storage(_)));
    }
}
