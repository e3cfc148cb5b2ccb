//! Drops idle clients from the anonymous rate limiter.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::scheduler::Job;
use crate::middleware::RateLimiterState;

pub struct RateLimitPruneJob {
    limiter: Arc<RateLimiterState>,
}

impl RateLimitPruneJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitPruneJob {
    fn name(&self) -> &'static str {
        "rate_limit_prune"
    }

    fn period(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn execute(&self) -> Result<(), String> {
        let before = self.limiter.tracked_clients();
        self.limiter.prune();
        debug!(
            before,
            after = self.limiter.tracked_clients(),
            "Pruned rate limiter state"
        );
        Ok(())
    }
}
