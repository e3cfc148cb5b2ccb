use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use domain::services::{AttendeeCache, CachedPool, CheckInService};
use persistence::repositories::{FarmerRepository, GuestPassRepository};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    require_volunteer, security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    check_in, exports, farmers, feedback, guest_passes, health, stats, volunteers,
};
use crate::services::{EventCheckIns, FarmerStore, GuestPassStore, FARMER_CACHE_NAMESPACE};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub check_ins: Arc<EventCheckIns>,
    pub cache: Option<Arc<dyn AttendeeCache>>,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        cache: Option<Arc<dyn AttendeeCache>>,
    ) -> Result<Self, JwtError> {
        let jwt = JwtConfig::new(
            &config.jwt.private_key,
            &config.jwt.public_key,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        let farmers = CachedPool::new(
            FarmerStore::new(FarmerRepository::new(pool.clone())),
            cache.clone(),
            FARMER_CACHE_NAMESPACE,
        );
        let guests = GuestPassStore::new(GuestPassRepository::new(pool.clone()));

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            rate_limiter,
            check_ins: Arc::new(CheckInService::new(farmers, guests)),
            cache,
        })
    }
}

pub fn create_app(
    config: Config,
    pool: PgPool,
    cache: Option<Arc<dyn AttendeeCache>>,
) -> Result<Router, JwtError> {
    let state = AppState::new(config, pool, cache)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Any approved volunteer
    let volunteer_routes = Router::new()
        .route(
            "/api/v1/universal-checkin/:qr_code",
            post(check_in::universal_check_in),
        )
        .route(
            "/api/v1/farmers",
            post(farmers::register_farmer).get(farmers::list_farmers),
        )
        .route("/api/v1/farmers/:id", get(farmers::get_farmer))
        .route("/api/v1/farmers/qr/:qr_code", get(farmers::get_farmer_by_qr))
        .route(
            "/api/v1/farmers/:id/delegate",
            patch(farmers::update_delegate),
        )
        .route(
            "/api/v1/farmers/checkin/:qr_code",
            post(farmers::check_in_farmer),
        )
        .route(
            "/api/v1/farmers/:id/check-ins",
            get(farmers::list_farmer_check_ins),
        )
        .route("/api/v1/guest-passes", get(guest_passes::list_guest_passes))
        .route(
            "/api/v1/guest-passes/qr/:qr_code",
            get(guest_passes::get_guest_pass_by_qr),
        )
        .route(
            "/api/v1/guest-passes/:id/assign",
            put(guest_passes::assign_guest_pass),
        )
        .route(
            "/api/v1/guest-passes/:id/check-ins",
            get(guest_passes::list_guest_pass_check_ins),
        )
        .route("/api/v1/stats", get(stats::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_volunteer,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/v1/guest-passes/generate",
            post(guest_passes::generate_guest_passes),
        )
        .route("/api/v1/volunteers", get(volunteers::list_volunteers))
        .route(
            "/api/v1/volunteers/:id/approve",
            post(volunteers::approve_volunteer),
        )
        .route(
            "/api/v1/volunteers/:id/reject",
            post(volunteers::reject_volunteer),
        )
        .route("/api/v1/feedback", get(feedback::list_feedback))
        .route("/api/v1/feedback/summary", get(feedback::feedback_summary))
        .route("/api/v1/exports/farmers", get(exports::export_farmers))
        .route(
            "/api/v1/exports/guest-passes",
            get(exports::export_guest_passes),
        )
        .route("/api/v1/exports/check-ins", get(exports::export_check_ins))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Anonymous, rate limited per client
    let anonymous_routes = Router::new()
        .route(
            "/api/v1/guest-passes/fast-checkin/:qr_code",
            post(guest_passes::fast_check_in),
        )
        .route(
            "/api/v1/volunteers/register",
            post(volunteers::register_volunteer),
        )
        .route("/api/v1/volunteers/login", post(volunteers::login))
        .route("/api/v1/feedback", post(feedback::submit_feedback))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(anonymous_routes)
        .merge(volunteer_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
