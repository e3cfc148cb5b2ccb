//! Guest pass repository for database operations.

use domain::models::guest_pass::guest_qr_code;
use domain::models::{GuestCategory, NewCheckIn};
use sqlx::PgPool;
use uuid::Uuid;

use super::check_in::CheckInLog;
use crate::entities::{CheckInEntity, GuestCategoryDb, GuestPassEntity};
use crate::metrics::QueryTimer;

const GUEST_PASS_COLUMNS: &str = "id, category, sequence_number, qr_code, name, mobile, \
    designation, is_assigned, \
    has_entry_check_in, has_lunch_check_in, has_dinner_check_in, has_session_check_in, \
    created_at, updated_at";

/// Check-in log layout for guest passes.
pub const GUEST_CHECK_IN_LOG: CheckInLog = CheckInLog {
    attendee_table: "guest_passes",
    log_table: "guest_check_ins",
    owner_column: "guest_pass_id",
    returning: GUEST_PASS_COLUMNS,
};

/// Repository for guest pass database operations.
#[derive(Clone)]
pub struct GuestPassRepository {
    pool: PgPool,
}

impl GuestPassRepository {
    /// Creates a new GuestPassRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Generate `count` passes continuing the category's sequence.
    ///
    /// Generation for one category is serialized with a transaction-scoped
    /// advisory lock so sequence numbers stay gap-free.
    pub async fn generate(
        &self,
        category: GuestCategory,
        count: u32,
    ) -> Result<Vec<GuestPassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("generate_guest_passes");
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("guest_passes:{}", category))
            .execute(&mut *tx)
            .await?;

        let last: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_number), 0) FROM guest_passes WHERE category = $1",
        )
        .bind(GuestCategoryDb::from(category))
        .fetch_one(&mut *tx)
        .await?;

        let sequences: Vec<i32> = (1..=count as i32).map(|i| last + i).collect();
        let qr_codes: Vec<String> = sequences
            .iter()
            .map(|seq| guest_qr_code(category, *seq))
            .collect();

        let sql = format!(
            r#"
            INSERT INTO guest_passes (category, sequence_number, qr_code)
            SELECT $1, seq, qr
            FROM UNNEST($2::int4[], $3::text[]) AS t(seq, qr)
            RETURNING {}
            "#,
            GUEST_PASS_COLUMNS
        );
        let mut passes = sqlx::query_as::<_, GuestPassEntity>(&sql)
            .bind(GuestCategoryDb::from(category))
            .bind(&sequences)
            .bind(&qr_codes)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();

        passes.sort_by_key(|p| p.sequence_number);
        Ok(passes)
    }

    /// Find pass by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GuestPassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_pass_by_id");
        let sql = format!("SELECT {} FROM guest_passes WHERE id = $1", GUEST_PASS_COLUMNS);
        let result = sqlx::query_as::<_, GuestPassEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find pass by QR code.
    pub async fn find_by_qr_code(
        &self,
        qr_code: &str,
    ) -> Result<Option<GuestPassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_pass_by_qr_code");
        let sql = format!(
            "SELECT {} FROM guest_passes WHERE qr_code = $1",
            GUEST_PASS_COLUMNS
        );
        let result = sqlx::query_as::<_, GuestPassEntity>(&sql)
            .bind(qr_code)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// List passes ordered by category and sequence.
    pub async fn list(
        &self,
        category: Option<GuestCategory>,
        assigned: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GuestPassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_guest_passes");
        let sql = format!(
            r#"
            SELECT {}
            FROM guest_passes
            WHERE ($1::guest_category IS NULL OR category = $1)
              AND ($2::boolean IS NULL OR is_assigned = $2)
            ORDER BY category, sequence_number
            LIMIT $3 OFFSET $4
            "#,
            GUEST_PASS_COLUMNS
        );
        let result = sqlx::query_as::<_, GuestPassEntity>(&sql)
            .bind(category.map(GuestCategoryDb::from))
            .bind(assigned)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count passes matching the list filters.
    pub async fn count(
        &self,
        category: Option<GuestCategory>,
        assigned: Option<bool>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_guest_passes");
        let result = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM guest_passes
            WHERE ($1::guest_category IS NULL OR category = $1)
              AND ($2::boolean IS NULL OR is_assigned = $2)
            "#,
        )
        .bind(category.map(GuestCategoryDb::from))
        .bind(assigned)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Assign a pass to a named holder. Returns None if the pass does not exist.
    pub async fn assign(
        &self,
        id: Uuid,
        name: &str,
        mobile: Option<&str>,
        designation: Option<&str>,
    ) -> Result<Option<GuestPassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("assign_guest_pass");
        let sql = format!(
            r#"
            UPDATE guest_passes
            SET name = $2, mobile = $3, designation = $4, is_assigned = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GUEST_PASS_COLUMNS
        );
        let result = sqlx::query_as::<_, GuestPassEntity>(&sql)
            .bind(id)
            .bind(name)
            .bind(mobile)
            .bind(designation)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Record a check-in. Returns None if this kind was already recorded.
    pub async fn record_check_in(
        &self,
        guest_pass_id: Uuid,
        check_in: &NewCheckIn,
    ) -> Result<Option<GuestPassEntity>, sqlx::Error> {
        GUEST_CHECK_IN_LOG
            .append(&self.pool, guest_pass_id, check_in)
            .await
    }

    /// Check-in history of a pass.
    pub async fn list_check_ins(
        &self,
        guest_pass_id: Uuid,
    ) -> Result<Vec<CheckInEntity>, sqlx::Error> {
        GUEST_CHECK_IN_LOG.list(&self.pool, guest_pass_id).await
    }

    /// All passes ordered by category and sequence, for export.
    pub async fn list_all(&self) -> Result<Vec<GuestPassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_guest_passes");
        let sql = format!(
            "SELECT {} FROM guest_passes ORDER BY category, sequence_number",
            GUEST_PASS_COLUMNS
        );
        let result = sqlx::query_as::<_, GuestPassEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }
}
