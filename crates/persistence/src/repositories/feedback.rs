//! Feedback repository for database operations.

use sqlx::PgPool;

use crate::entities::{FeedbackEntity, RatingCountEntity};
use crate::metrics::QueryTimer;

/// Repository for feedback database operations.
#[derive(Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    /// Creates a new FeedbackRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a feedback submission.
    pub async fn create(
        &self,
        qr_code: Option<&str>,
        name: Option<&str>,
        rating: i16,
        comments: Option<&str>,
    ) -> Result<FeedbackEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_feedback");
        let result = sqlx::query_as::<_, FeedbackEntity>(
            r#"
            INSERT INTO feedback (qr_code, name, rating, comments)
            VALUES ($1, $2, $3, $4)
            RETURNING id, qr_code, name, rating, comments, created_at
            "#,
        )
        .bind(qr_code)
        .bind(name)
        .bind(rating)
        .bind(comments)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recent feedback first.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<FeedbackEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_feedback");
        let result = sqlx::query_as::<_, FeedbackEntity>(
            r#"
            SELECT id, qr_code, name, rating, comments, created_at
            FROM feedback
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Number of submissions per rating value.
    pub async fn rating_counts(&self) -> Result<Vec<RatingCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("feedback_rating_counts");
        let result = sqlx::query_as::<_, RatingCountEntity>(
            "SELECT rating, COUNT(*) AS count FROM feedback GROUP BY rating ORDER BY rating",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
