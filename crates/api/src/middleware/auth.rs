//! Volunteer JWT authentication middleware.
//!
//! Tokens are only issued to approved volunteers at login, so a valid token
//! is the approval check. Admin routes additionally require the admin role.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::jwt::{extract_volunteer_id, JwtConfig, JwtError, Role};
use uuid::Uuid;

use crate::app::AppState;

/// Authenticated volunteer, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct VolunteerAuth {
    pub volunteer_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl VolunteerAuth {
    /// Validates an access token and returns the volunteer identity.
    pub fn validate(jwt: &JwtConfig, token: &str) -> Result<Self, JwtError> {
        let claims = jwt.validate_access_token(token)?;
        let volunteer_id = extract_volunteer_id(&claims)?;
        Ok(Self {
            volunteer_id,
            name: claims.name,
            role: claims.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Extracts the bearer token from the Authorization header.
pub(crate) fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(state: &AppState, req: &Request<Body>) -> Result<VolunteerAuth, Response> {
    let token = bearer_token(req)
        .ok_or_else(|| unauthorized_response("Missing or invalid Authorization header"))?;

    VolunteerAuth::validate(&state.jwt, token).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        match e {
            JwtError::TokenExpired => unauthorized_response("Token has expired"),
            _ => unauthorized_response("Invalid or expired token"),
        }
    })
}

/// Requires a valid volunteer token.
pub async fn require_volunteer(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(response) => response,
    }
}

/// Requires a valid token carrying the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req) {
        Ok(auth) if auth.is_admin() => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Ok(auth) => {
            tracing::warn!(volunteer_id = %auth.volunteer_id, "Admin route denied");
            forbidden_response("Admin access required")
        }
        Err(response) => response,
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_auth(value: &str) -> Request<Body> {
        Request::builder()
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&request_with_auth("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&request_with_auth("Basic abc")), None);
        assert_eq!(bearer_token(&request_with_auth("Bearer   ")), None);

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&bare), None);
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(
            unauthorized_response("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(forbidden_response("x").status(), StatusCode::FORBIDDEN);
    }
}
