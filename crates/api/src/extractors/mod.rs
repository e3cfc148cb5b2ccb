//! Custom Axum extractors.

pub mod volunteer;

pub use volunteer::CurrentVolunteer;
