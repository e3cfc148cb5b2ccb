//! HTTP route handlers.

pub mod check_in;
pub mod exports;
pub mod farmers;
pub mod feedback;
pub mod guest_passes;
pub mod health;
pub mod stats;
pub mod volunteers;
