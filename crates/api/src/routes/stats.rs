//! Event statistics route.

use axum::{extract::State, Json};
use domain::models::stats::{
    CheckInCounts, EventStats, FarmerStats, GuestPassStats, VolunteerStats,
};
use domain::models::VolunteerStatus;
use persistence::entities::{CheckInCountEntity, VolunteerStatusCountEntity};
use persistence::repositories::{StatsRepository, VolunteerRepository};

use crate::app::AppState;
use crate::error::ApiError;

fn check_in_counts(rows: Vec<CheckInCountEntity>) -> CheckInCounts {
    let mut counts = CheckInCounts::default();
    for row in rows {
        counts.set(row.check_in_type.into(), row.count);
    }
    counts
}

fn volunteer_stats(rows: Vec<VolunteerStatusCountEntity>) -> VolunteerStats {
    let mut stats = VolunteerStats::default();
    for row in rows {
        match VolunteerStatus::from(row.status) {
            VolunteerStatus::Pending => stats.pending = row.count,
            VolunteerStatus::Approved => stats.approved = row.count,
            VolunteerStatus::Rejected => stats.rejected = row.count,
        }
    }
    stats
}

/// Dashboard statistics.
///
/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<EventStats>, ApiError> {
    let repo = StatsRepository::new(state.pool.clone());
    let volunteers = VolunteerRepository::new(state.pool.clone());

    let farmer_totals = repo.farmer_totals().await?;
    let guest_totals = repo.guest_pass_totals().await?;

    Ok(Json(EventStats {
        farmers: FarmerStats {
            total: farmer_totals.total,
            delegates_attending: farmer_totals.delegates_attending,
            check_ins: check_in_counts(repo.farmer_check_in_counts().await?),
        },
        guest_passes: GuestPassStats {
            total: guest_totals.total,
            assigned: guest_totals.assigned,
            check_ins: check_in_counts(repo.guest_check_in_counts().await?),
        },
        volunteers: volunteer_stats(volunteers.count_by_status().await?),
        feedback_count: repo.feedback_count().await?,
    }))
}
