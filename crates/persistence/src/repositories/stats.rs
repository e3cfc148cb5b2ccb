//! Aggregate statistics and export queries spanning several tables.

use sqlx::PgPool;

use crate::entities::{CheckInCountEntity, CheckInExportEntity};
use crate::metrics::QueryTimer;

/// Headline counts for the registered pool.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct FarmerTotalsEntity {
    pub total: i64,
    pub delegates_attending: i64,
}

/// Headline counts for guest passes.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct GuestPassTotalsEntity {
    pub total: i64,
    pub assigned: i64,
}

/// Repository for cross-table statistics.
#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Creates a new StatsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn farmer_totals(&self) -> Result<FarmerTotalsEntity, sqlx::Error> {
        let timer = QueryTimer::new("farmer_totals");
        let result = sqlx::query_as::<_, FarmerTotalsEntity>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE is_delegate_attending) AS delegates_attending
            FROM farmers
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn guest_pass_totals(&self) -> Result<GuestPassTotalsEntity, sqlx::Error> {
        let timer = QueryTimer::new("guest_pass_totals");
        let result = sqlx::query_as::<_, GuestPassTotalsEntity>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE is_assigned) AS assigned
            FROM guest_passes
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Per-kind check-in counts from farmer_check_ins.
    pub async fn farmer_check_in_counts(&self) -> Result<Vec<CheckInCountEntity>, sqlx::Error> {
        self.check_in_counts("farmer_check_ins").await
    }

    /// Per-kind check-in counts from guest_check_ins.
    pub async fn guest_check_in_counts(&self) -> Result<Vec<CheckInCountEntity>, sqlx::Error> {
        self.check_in_counts("guest_check_ins").await
    }

    async fn check_in_counts(
        &self,
        table: &'static str,
    ) -> Result<Vec<CheckInCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new(format!("count_{}", table));
        let sql = format!(
            "SELECT check_in_type, COUNT(*) AS count FROM {} GROUP BY check_in_type",
            table
        );
        let result = sqlx::query_as::<_, CheckInCountEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn feedback_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&self.pool)
            .await
    }

    /// Every check-in from both pools, oldest first.
    pub async fn all_check_ins(&self) -> Result<Vec<CheckInExportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("export_check_ins");
        let result = sqlx::query_as::<_, CheckInExportEntity>(
            r#"
            SELECT 'FARMER'::text AS attendee_type, f.qr_code, f.name AS attendee_name,
                   c.check_in_type, c.scanned_by, c.was_delegate, c.created_at
            FROM farmer_check_ins c
            JOIN farmers f ON f.id = c.farmer_id
            UNION ALL
            SELECT 'GUEST'::text AS attendee_type, g.qr_code, g.name AS attendee_name,
                   c.check_in_type, c.scanned_by, c.was_delegate, c.created_at
            FROM guest_check_ins c
            JOIN guest_passes g ON g.id = c.guest_pass_id
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
