//! Attendee feedback models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A single feedback submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub qr_code: Option<String>,
    pub name: Option<String>,
    pub rating: i16,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for submitting feedback.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    #[validate(length(max = 64, message = "qrCode must be at most 64 characters"))]
    pub qr_code: Option<String>,

    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i16,

    #[validate(length(max = 2000, message = "comments must be at most 2000 characters"))]
    pub comments: Option<String>,
}

/// Aggregate view over all feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total: i64,
    pub average_rating: Option<f64>,
    /// Count per rating value, index 0 holds rating 1.
    pub distribution: [i64; 5],
}

impl FeedbackSummary {
    /// Builds a summary from `(rating, count)` pairs.
    pub fn from_counts(counts: &[(i16, i64)]) -> Self {
        let mut distribution = [0i64; 5];
        for (rating, count) in counts {
            if (1..=5).contains(rating) {
                distribution[(*rating - 1) as usize] += count;
            }
        }
        let total: i64 = distribution.iter().sum();
        let weighted: i64 = distribution
            .iter()
            .enumerate()
            .map(|(i, c)| (i as i64 + 1) * c)
            .sum();
        let average_rating = (total > 0).then(|| {
            let avg = weighted as f64 / total as f64;
            (avg * 100.0).round() / 100.0
        });
        Self {
            total,
            average_rating,
            distribution,
        }
    }
}

/// Query parameters for listing feedback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFeedbackQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginated feedback list, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ListFeedbackResponse {
    pub data: Vec<Feedback>,
    pub pagination: shared::pagination::PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut request = SubmitFeedbackRequest {
            qr_code: Some("EVENT-ABC123".to_string()),
            name: None,
            rating: 5,
            comments: Some("Well organized".to_string()),
        };
        assert!(request.validate().is_ok());

        request.rating = 0;
        assert!(request.validate().is_err());

        request.rating = 6;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_summary_from_counts() {
        let summary = FeedbackSummary::from_counts(&[(5, 3), (4, 1), (1, 1)]);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.distribution, [1, 0, 0, 1, 3]);
        assert_eq!(summary.average_rating, Some(4.0));
    }

    #[test]
    fn test_summary_empty() {
        let summary = FeedbackSummary::from_counts(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_rating, None);
    }

    #[test]
    fn test_summary_rounds_average() {
        let summary = FeedbackSummary::from_counts(&[(5, 1), (4, 1), (4, 1)]);
        assert_eq!(summary.average_rating, Some(4.33));
    }
}
