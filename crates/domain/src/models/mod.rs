//! Domain models for the event check-in service.

pub mod check_in;
pub mod farmer;
pub mod feedback;
pub mod guest_pass;
pub mod stats;
pub mod volunteer;

pub use check_in::{AttendeeKind, CheckIn, CheckInFlags, CheckInType, NewCheckIn};
pub use farmer::Farmer;
pub use feedback::Feedback;
pub use guest_pass::{GuestCategory, GuestPass};
pub use volunteer::{Volunteer, VolunteerRole, VolunteerStatus};
