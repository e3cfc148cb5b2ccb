//! Attendee feedback routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::feedback::{
    FeedbackSummary, ListFeedbackQuery, ListFeedbackResponse, SubmitFeedbackRequest,
};
use domain::models::Feedback;
use persistence::repositories::FeedbackRepository;
use shared::pagination::{PageInfo, PageWindow};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Submit feedback. No authentication.
///
/// POST /api/v1/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    request.validate()?;

    let repo = FeedbackRepository::new(state.pool.clone());
    let entity = repo
        .create(
            trimmed(request.qr_code.as_deref()),
            trimmed(request.name.as_deref()),
            request.rating,
            trimmed(request.comments.as_deref()),
        )
        .await?;

    info!(feedback_id = %entity.id, rating = entity.rating, "Feedback submitted");

    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// List feedback, newest first.
///
/// GET /api/v1/feedback?page&perPage
///
/// Requires admin role.
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<ListFeedbackQuery>,
) -> Result<Json<ListFeedbackResponse>, ApiError> {
    let repo = FeedbackRepository::new(state.pool.clone());
    let window = PageWindow::new(query.page, query.per_page);

    let feedback = repo.list(window.limit(), window.offset()).await?;
    let summary = FeedbackSummary::from_counts(&rating_counts(&repo).await?);

    Ok(Json(ListFeedbackResponse {
        data: feedback.into_iter().map(Feedback::from).collect(),
        pagination: PageInfo::new(window, summary.total),
    }))
}

/// Aggregate rating statistics.
///
/// GET /api/v1/feedback/summary
///
/// Requires admin role.
pub async fn feedback_summary(
    State(state): State<AppState>,
) -> Result<Json<FeedbackSummary>, ApiError> {
    let repo = FeedbackRepository::new(state.pool.clone());
    Ok(Json(FeedbackSummary::from_counts(
        &rating_counts(&repo).await?,
    )))
}

async fn rating_counts(repo: &FeedbackRepository) -> Result<Vec<(i16, i64)>, ApiError> {
    Ok(repo
        .rating_counts()
        .await?
        .into_iter()
        .map(|r| (r.rating, r.count))
        .collect())
}
