//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub cache: CacheHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Attendee cache health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheHealth {
    /// Whether a cache backend is configured.
    pub enabled: bool,
    pub connected: bool,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Overall status: the database is required, the cache is optional.
fn overall_status(db_connected: bool, cache: &CacheHealth) -> &'static str {
    if !db_connected {
        "unhealthy"
    } else if cache.enabled && !cache.connected {
        "degraded"
    } else {
        "healthy"
    }
}

/// Full health check endpoint.
///
/// Reports database latency and cache reachability. A missing cache only
/// degrades the service since check-ins fall back to the database.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let latency = persistence::db::ping(&state.pool).await;
    let db_connected = latency.is_ok();

    let cache = match &state.cache {
        Some(cache) => {
            let connected = match cache.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Cache health check failed");
                    false
                }
            };
            CacheHealth {
                enabled: true,
                connected,
            }
        }
        None => CacheHealth {
            enabled: false,
            connected: false,
        },
    };

    let response = HealthResponse {
        status: overall_status(db_connected, &cache).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: db_connected,
            latency_ms: latency.ok().map(|d| d.as_millis() as u64),
        },
        cache,
    };

    if db_connected {
        Ok(Json(response))
    } else {
        tracing::error!("Health check failed: database unreachable");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if persistence::db::ping(&state.pool).await.is_ok() {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_live_reports_alive() {
        let Json(response) = live().await;
        assert_eq!(response.status, "alive");
    }

    #[test]
    fn test_overall_status() {
        let no_cache = CacheHealth {
            enabled: false,
            connected: false,
        };
        let cache_down = CacheHealth {
            enabled: true,
            connected: false,
        };
        let cache_up = CacheHealth {
            enabled: true,
            connected: true,
        };

        assert_eq!(overall_status(true, &no_cache), "healthy");
        assert_eq!(overall_status(true, &cache_up), "healthy");
        assert_eq!(overall_status(true, &cache_down), "degraded");
        assert_eq!(overall_status(false, &cache_up), "unhealthy");
    }
}
