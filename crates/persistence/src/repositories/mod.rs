//! Repository implementations for database operations.

pub mod check_in;
pub mod farmer;
pub mod feedback;
pub mod guest_pass;
pub mod stats;
pub mod volunteer;

pub use check_in::CheckInLog;
pub use farmer::{FarmerRepository, NewFarmer};
pub use feedback::FeedbackRepository;
pub use guest_pass::GuestPassRepository;
pub use stats::StatsRepository;
pub use volunteer::VolunteerRepository;
