//! Shared utilities and common types for the event check-in backend.
//!
//! This crate provides functionality used across all other crates:
//! - JWT access tokens for volunteers and admins
//! - Password hashing with Argon2id
//! - Validation of mobile numbers, government IDs and QR codes
//! - Offset pagination helpers

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
