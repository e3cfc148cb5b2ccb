//! Universal check-in reconciliation.
//!
//! A QR code is resolved against the registered pool first and the guest
//! pool second. Recording a check-in is idempotent per (attendee, kind): the
//! denormalized flag short-circuits repeats, and the storage layer's unique
//! constraint settles concurrent attempts.

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::check_in::InvalidCheckInType;
use crate::models::{CheckInFlags, CheckInType, Farmer, GuestPass, NewCheckIn};

/// Errors raised by the check-in flow.
#[derive(Debug, Error)]
pub enum CheckInError {
    #[error(transparent)]
    InvalidType(#[from] InvalidCheckInType),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Read access every attendee variant offers to the recorder.
pub trait CheckInSubject {
    fn attendee_id(&self) -> Uuid;
    fn qr_code(&self) -> &str;
    fn check_ins(&self) -> &CheckInFlags;

    fn is_checked_in(&self, check_in_type: CheckInType) -> bool {
        self.check_ins().is_checked_in(check_in_type)
    }
}

impl CheckInSubject for Farmer {
    fn attendee_id(&self) -> Uuid {
        self.id
    }

    fn qr_code(&self) -> &str {
        &self.qr_code
    }

    fn check_ins(&self) -> &CheckInFlags {
        &self.check_ins
    }
}

impl CheckInSubject for GuestPass {
    fn attendee_id(&self) -> Uuid {
        self.id
    }

    fn qr_code(&self) -> &str {
        &self.qr_code
    }

    fn check_ins(&self) -> &CheckInFlags {
        &self.check_ins
    }
}

/// Storage capability for one attendee pool.
#[async_trait::async_trait]
pub trait AttendeePool: Send + Sync {
    type Attendee: CheckInSubject + Clone + Send + Sync;

    /// Looks up an attendee by QR code. A miss is `Ok(None)`.
    async fn find_by_qr_code(&self, qr_code: &str)
        -> Result<Option<Self::Attendee>, CheckInError>;

    /// Appends a check-in row and sets the matching flag atomically.
    ///
    /// Returns the updated attendee, or `None` when a row of this kind
    /// already existed for the attendee.
    async fn append_check_in(
        &self,
        attendee: &Self::Attendee,
        check_in: &NewCheckIn,
    ) -> Result<Option<Self::Attendee>, CheckInError>;
}

/// Result of a check-in attempt on a resolved attendee.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome<A> {
    /// A new check-in row was written; carries the updated snapshot.
    Recorded(A),
    /// The kind had already been recorded; carries the current snapshot.
    AlreadyCheckedIn(A),
}

impl<A> CheckInOutcome<A> {
    pub fn attendee(&self) -> &A {
        match self {
            CheckInOutcome::Recorded(a) | CheckInOutcome::AlreadyCheckedIn(a) => a,
        }
    }

    pub fn into_attendee(self) -> A {
        match self {
            CheckInOutcome::Recorded(a) | CheckInOutcome::AlreadyCheckedIn(a) => a,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, CheckInOutcome::Recorded(_))
    }

    /// Metric label for the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            CheckInOutcome::Recorded(_) => "recorded",
            CheckInOutcome::AlreadyCheckedIn(_) => "already_checked_in",
        }
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> CheckInOutcome<B> {
        match self {
            CheckInOutcome::Recorded(a) => CheckInOutcome::Recorded(f(a)),
            CheckInOutcome::AlreadyCheckedIn(a) => CheckInOutcome::AlreadyCheckedIn(f(a)),
        }
    }
}

/// Which pool a QR code resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<R, G> {
    Registered(R),
    Guest(G),
}

/// Records a check-in for an attendee that has already been looked up.
pub async fn check_in_attendee<P: AttendeePool + ?Sized>(
    pool: &P,
    attendee: P::Attendee,
    check_in: &NewCheckIn,
) -> Result<CheckInOutcome<P::Attendee>, CheckInError> {
    let check_in_type = check_in.check_in_type;

    if attendee.is_checked_in(check_in_type) {
        debug!(
            qr_code = %attendee.qr_code(),
            check_in_type = %check_in_type,
            "Attendee already checked in"
        );
        return Ok(CheckInOutcome::AlreadyCheckedIn(attendee));
    }

    match pool.append_check_in(&attendee, check_in).await? {
        Some(updated) => {
            info!(
                attendee_id = %updated.attendee_id(),
                qr_code = %updated.qr_code(),
                check_in_type = %check_in_type,
                scanned_by = ?check_in.scanned_by,
                "Check-in recorded"
            );
            Ok(CheckInOutcome::Recorded(updated))
        }
        None => {
            // Another request recorded the same kind between our read and write.
            debug!(
                qr_code = %attendee.qr_code(),
                check_in_type = %check_in_type,
                "Concurrent check-in detected"
            );
            let fresh = pool.find_by_qr_code(attendee.qr_code()).await?;
            Ok(CheckInOutcome::AlreadyCheckedIn(fresh.unwrap_or(attendee)))
        }
    }
}

/// Looks up an attendee by QR code in a single pool and records a check-in.
pub async fn record_check_in<P: AttendeePool + ?Sized>(
    pool: &P,
    qr_code: &str,
    check_in: &NewCheckIn,
    not_found_message: impl FnOnce() -> String,
) -> Result<CheckInOutcome<P::Attendee>, CheckInError> {
    let attendee = pool
        .find_by_qr_code(qr_code)
        .await?
        .ok_or_else(|| CheckInError::NotFound(not_found_message()))?;
    check_in_attendee(pool, attendee, check_in).await
}

/// Check-in service over a registered pool and a guest pool.
pub struct CheckInService<R, G> {
    registered: R,
    guests: G,
}

impl<R, G> CheckInService<R, G>
where
    R: AttendeePool,
    G: AttendeePool,
{
    pub fn new(registered: R, guests: G) -> Self {
        Self { registered, guests }
    }

    pub fn registered(&self) -> &R {
        &self.registered
    }

    pub fn guests(&self) -> &G {
        &self.guests
    }

    /// Resolves a QR code, trying the registered pool first.
    pub async fn resolve(
        &self,
        qr_code: &str,
    ) -> Result<Option<Resolved<R::Attendee, G::Attendee>>, CheckInError> {
        if let Some(attendee) = self.registered.find_by_qr_code(qr_code).await? {
            return Ok(Some(Resolved::Registered(attendee)));
        }
        Ok(self
            .guests
            .find_by_qr_code(qr_code)
            .await?
            .map(Resolved::Guest))
    }

    /// Records a check-in for whichever attendee the QR code identifies.
    pub async fn universal_check_in(
        &self,
        qr_code: &str,
        raw_type: &str,
        scanned_by: Option<&str>,
        was_behalf: bool,
    ) -> Result<Resolved<CheckInOutcome<R::Attendee>, CheckInOutcome<G::Attendee>>, CheckInError>
    {
        let check_in_type: CheckInType = raw_type.parse()?;
        let check_in = NewCheckIn::new(check_in_type, scanned_by, was_behalf);

        match self.resolve(qr_code).await? {
            Some(Resolved::Registered(farmer)) => Ok(Resolved::Registered(
                check_in_attendee(&self.registered, farmer, &check_in).await?,
            )),
            Some(Resolved::Guest(pass)) => Ok(Resolved::Guest(
                check_in_attendee(&self.guests, pass, &check_in).await?,
            )),
            None => Err(CheckInError::NotFound(format!(
                "No attendee found for QR code {}",
                qr_code
            ))),
        }
    }

    /// Records a check-in against the registered pool only.
    pub async fn registered_check_in(
        &self,
        qr_code: &str,
        raw_type: &str,
        scanned_by: Option<&str>,
        was_delegate: bool,
    ) -> Result<CheckInOutcome<R::Attendee>, CheckInError> {
        let check_in_type: CheckInType = raw_type.parse()?;
        let check_in = NewCheckIn::new(check_in_type, scanned_by, was_delegate);
        record_check_in(&self.registered, qr_code, &check_in, || {
            format!("Farmer not found for QR code {}", qr_code)
        })
        .await
    }

    /// Records an anonymous check-in against the guest pool only.
    pub async fn guest_check_in(
        &self,
        qr_code: &str,
        raw_type: &str,
    ) -> Result<CheckInOutcome<G::Attendee>, CheckInError> {
        let check_in_type: CheckInType = raw_type.parse()?;
        let check_in = NewCheckIn::new(check_in_type, None, false);
        record_check_in(&self.guests, qr_code, &check_in, || {
            format!("Guest pass not found for QR code {}", qr_code)
        })
        .await
    }
}
