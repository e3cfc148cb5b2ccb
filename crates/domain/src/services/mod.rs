//! Domain services for the event check-in backend.
//!
//! Services contain business logic that operates on domain models.

pub mod attendee_cache;
pub mod check_in;

pub use attendee_cache::{AttendeeCache, CacheError, CachedPool};
pub use check_in::{
    check_in_attendee, record_check_in, AttendeePool, CheckInError, CheckInOutcome,
    CheckInService, CheckInSubject, Resolved,
};
