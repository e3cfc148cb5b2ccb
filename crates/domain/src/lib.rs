//! Domain layer for the event check-in backend.
//!
//! This crate contains:
//! - Domain models (Farmer, GuestPass, CheckIn, Volunteer, Feedback)
//! - The check-in reconciliation service and its cache mirror
//! - Domain error types

pub mod models;
pub mod services;
