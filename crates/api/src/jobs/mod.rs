//! Periodic background jobs.

mod pool_metrics;
mod rate_limit_prune;
mod scheduler;

pub use pool_metrics::PoolMetricsJob;
pub use rate_limit_prune::RateLimitPruneJob;
pub use scheduler::{Job, JobScheduler};
