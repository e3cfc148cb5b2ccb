//! Redis backend for the attendee snapshot cache.

use async_trait::async_trait;
use domain::services::{AttendeeCache, CacheError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

use crate::middleware::metrics::record_cache_error;

/// Attendee cache on a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisAttendeeCache {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisAttendeeCache {
    /// Connects eagerly so a bad URL or unreachable server is reported at startup.
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Invalid Redis URL: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self {
            conn,
            ttl_secs: ttl_secs.max(1),
        })
    }
}

fn command_error(operation: &'static str, err: RedisError) -> CacheError {
    record_cache_error(operation);
    if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::Command(err.to_string())
    }
}

#[async_trait]
impl AttendeeCache for RedisAttendeeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|e| command_error("get", e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex(key, value, self.ttl_secs)
            .await
            .map_err(|e| command_error("set", e))
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let stored: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("set_nx", e))?;
        Ok(stored.is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(|e| command_error("delete", e))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("ping", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let result = RedisAttendeeCache::connect("not-a-redis-url", 60).await;
        assert!(matches!(result, Err(CacheError::Connection(_))));
    }
}
