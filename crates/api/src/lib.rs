//! HTTP API for the event check-in backend.
//!
//! The binary in `main.rs` wires configuration, the database pool and the
//! optional Redis cache into the router built by [`app::create_app`].

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
