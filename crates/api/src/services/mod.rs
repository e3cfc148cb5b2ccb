//! Service wiring: storage adapters, cache backend, startup tasks.

pub mod admin_bootstrap;
pub mod check_in;
pub mod redis_cache;

pub use admin_bootstrap::{bootstrap_admin, BootstrapOutcome};
pub use check_in::{
    CachedFarmerStore, EventCheckIns, FarmerStore, GuestPassStore, FARMER_CACHE_NAMESPACE,
};
pub use redis_cache::RedisAttendeeCache;
