//! Farmer repository for database operations.

use domain::models::NewCheckIn;
use sqlx::PgPool;
use uuid::Uuid;

use super::check_in::CheckInLog;
use crate::entities::{CheckInEntity, FarmerEntity};
use crate::metrics::QueryTimer;

const FARMER_COLUMNS: &str = "id, name, mobile, government_id, village, district, \
    delegate_name, delegate_mobile, is_delegate_attending, qr_code, \
    has_entry_check_in, has_lunch_check_in, has_dinner_check_in, has_session_check_in, \
    created_at, updated_at";

/// Check-in log layout for farmers.
pub const FARMER_CHECK_IN_LOG: CheckInLog = CheckInLog {
    attendee_table: "farmers",
    log_table: "farmer_check_ins",
    owner_column: "farmer_id",
    returning: FARMER_COLUMNS,
};

/// Input for creating a farmer row.
#[derive(Debug, Clone)]
pub struct NewFarmer<'a> {
    pub name: &'a str,
    pub mobile: &'a str,
    pub government_id: &'a str,
    pub village: Option<&'a str>,
    pub district: Option<&'a str>,
    pub delegate_name: Option<&'a str>,
    pub delegate_mobile: Option<&'a str>,
    pub qr_code: &'a str,
}

/// Turns a free-text search into an ILIKE pattern.
pub(crate) fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// Repository for farmer-related database operations.
#[derive(Clone)]
pub struct FarmerRepository {
    pool: PgPool,
}

impl FarmerRepository {
    /// Creates a new FarmerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a farmer. Unique violations surface as database errors.
    pub async fn create(&self, farmer: &NewFarmer<'_>) -> Result<FarmerEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_farmer");
        let sql = format!(
            r#"
            INSERT INTO farmers (name, mobile, government_id, village, district,
                                 delegate_name, delegate_mobile, qr_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            FARMER_COLUMNS
        );
        let result = sqlx::query_as::<_, FarmerEntity>(&sql)
            .bind(farmer.name)
            .bind(farmer.mobile)
            .bind(farmer.government_id)
            .bind(farmer.village)
            .bind(farmer.district)
            .bind(farmer.delegate_name)
            .bind(farmer.delegate_mobile)
            .bind(farmer.qr_code)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find farmer by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FarmerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_farmer_by_id");
        let sql = format!("SELECT {} FROM farmers WHERE id = $1", FARMER_COLUMNS);
        let result = sqlx::query_as::<_, FarmerEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find farmer by QR code.
    pub async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<FarmerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_farmer_by_qr_code");
        let sql = format!("SELECT {} FROM farmers WHERE qr_code = $1", FARMER_COLUMNS);
        let result = sqlx::query_as::<_, FarmerEntity>(&sql)
            .bind(qr_code)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Returns true when a QR code is already taken.
    pub async fn qr_code_exists(&self, qr_code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM farmers WHERE qr_code = $1)")
            .bind(qr_code)
            .fetch_one(&self.pool)
            .await
    }

    /// List farmers, newest first, optionally filtered by a search term.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FarmerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_farmers");
        let sql = format!(
            r#"
            SELECT {}
            FROM farmers
            WHERE ($1::text IS NULL
                   OR name ILIKE $1 OR mobile LIKE $1 OR village ILIKE $1 OR qr_code ILIKE $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            FARMER_COLUMNS
        );
        let result = sqlx::query_as::<_, FarmerEntity>(&sql)
            .bind(search_pattern(search))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count farmers matching a search term.
    pub async fn count(&self, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_farmers");
        let result = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM farmers
            WHERE ($1::text IS NULL
                   OR name ILIKE $1 OR mobile LIKE $1 OR village ILIKE $1 OR qr_code ILIKE $1)
            "#,
        )
        .bind(search_pattern(search))
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update delegate details. Returns None if the farmer does not exist.
    pub async fn update_delegate(
        &self,
        id: Uuid,
        delegate_name: Option<&str>,
        delegate_mobile: Option<&str>,
        is_delegate_attending: bool,
    ) -> Result<Option<FarmerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_farmer_delegate");
        let sql = format!(
            r#"
            UPDATE farmers
            SET delegate_name = $2,
                delegate_mobile = $3,
                is_delegate_attending = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FARMER_COLUMNS
        );
        let result = sqlx::query_as::<_, FarmerEntity>(&sql)
            .bind(id)
            .bind(delegate_name)
            .bind(delegate_mobile)
            .bind(is_delegate_attending)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Record a check-in. Returns None if this kind was already recorded.
    pub async fn record_check_in(
        &self,
        farmer_id: Uuid,
        check_in: &NewCheckIn,
    ) -> Result<Option<FarmerEntity>, sqlx::Error> {
        FARMER_CHECK_IN_LOG
            .append(&self.pool, farmer_id, check_in)
            .await
    }

    /// Check-in history of a farmer.
    pub async fn list_check_ins(&self, farmer_id: Uuid) -> Result<Vec<CheckInEntity>, sqlx::Error> {
        FARMER_CHECK_IN_LOG.list(&self.pool, farmer_id).await
    }

    /// All farmers in registration order, for export.
    pub async fn list_all(&self) -> Result<Vec<FarmerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_farmers");
        let sql = format!(
            "SELECT {} FROM farmers ORDER BY created_at ASC, id",
            FARMER_COLUMNS
        );
        let result = sqlx::query_as::<_, FarmerEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(Some(" Ravi ")), Some("%Ravi%".to_string()));
        assert_eq!(search_pattern(Some("50%")), Some("%50\\%%".to_string()));
        assert_eq!(search_pattern(Some("a_b")), Some("%a\\_b%".to_string()));
    }

    #[test]
    fn test_farmer_log_layout() {
        assert_eq!(FARMER_CHECK_IN_LOG.log_table, "farmer_check_ins");
        assert!(FARMER_CHECK_IN_LOG.returning.contains("has_session_check_in"));
    }
}
