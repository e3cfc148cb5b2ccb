//! Database entity definitions.

pub mod check_in;
pub mod farmer;
pub mod feedback;
pub mod guest_pass;
pub mod volunteer;

pub use check_in::{CheckInCountEntity, CheckInEntity, CheckInExportEntity, CheckInTypeDb};
pub use farmer::FarmerEntity;
pub use feedback::{FeedbackEntity, RatingCountEntity};
pub use guest_pass::{GuestCategoryDb, GuestPassEntity};
pub use volunteer::{
    VolunteerEntity, VolunteerRoleDb, VolunteerStatusCountEntity, VolunteerStatusDb,
};
