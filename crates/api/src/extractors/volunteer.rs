//! Authenticated volunteer extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::middleware::auth::VolunteerAuth;

/// Volunteer identity placed in extensions by `require_volunteer` or
/// `require_admin`. Rejects with 401 on routes without either middleware.
#[derive(Debug, Clone)]
pub struct CurrentVolunteer(pub VolunteerAuth);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentVolunteer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VolunteerAuth>()
            .cloned()
            .map(CurrentVolunteer)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use shared::jwt::Role;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_extracts_from_extensions() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(VolunteerAuth {
            volunteer_id: Uuid::new_v4(),
            name: "Asha".to_string(),
            role: Role::Volunteer,
        });

        let CurrentVolunteer(auth) = CurrentVolunteer::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(auth.name, "Asha");
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = CurrentVolunteer::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
