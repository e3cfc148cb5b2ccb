//! Feedback entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Feedback;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the feedback table.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackEntity {
    pub id: Uuid,
    pub qr_code: Option<String>,
    pub name: Option<String>,
    pub rating: i16,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackEntity> for Feedback {
    fn from(entity: FeedbackEntity) -> Self {
        Self {
            id: entity.id,
            qr_code: entity.qr_code,
            name: entity.name,
            rating: entity.rating,
            comments: entity.comments,
            created_at: entity.created_at,
        }
    }
}

/// Count of feedback per rating value.
#[derive(Debug, Clone, FromRow)]
pub struct RatingCountEntity {
    pub rating: i16,
    pub count: i64,
}
