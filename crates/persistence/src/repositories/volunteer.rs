//! Volunteer repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    VolunteerEntity, VolunteerRoleDb, VolunteerStatusCountEntity, VolunteerStatusDb,
};
use crate::metrics::QueryTimer;

const VOLUNTEER_COLUMNS: &str = "id, name, mobile, password_hash, role, status, approved_by, \
    approved_at, last_login_at, created_at, updated_at";

/// Repository for volunteer-related database operations.
#[derive(Clone)]
pub struct VolunteerRepository {
    pool: PgPool,
}

impl VolunteerRepository {
    /// Creates a new VolunteerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a volunteer.
    pub async fn create(
        &self,
        name: &str,
        mobile: &str,
        password_hash: &str,
        role: VolunteerRoleDb,
        status: VolunteerStatusDb,
    ) -> Result<VolunteerEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_volunteer");
        let sql = format!(
            r#"
            INSERT INTO volunteers (name, mobile, password_hash, role, status, approved_at)
            VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 = 'approved'::volunteer_status THEN NOW() END)
            RETURNING {}
            "#,
            VOLUNTEER_COLUMNS
        );
        let result = sqlx::query_as::<_, VolunteerEntity>(&sql)
            .bind(name)
            .bind(mobile)
            .bind(password_hash)
            .bind(role)
            .bind(status)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find volunteer by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VolunteerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_volunteer_by_id");
        let sql = format!("SELECT {} FROM volunteers WHERE id = $1", VOLUNTEER_COLUMNS);
        let result = sqlx::query_as::<_, VolunteerEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find volunteer by normalized mobile number.
    pub async fn find_by_mobile(&self, mobile: &str) -> Result<Option<VolunteerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_volunteer_by_mobile");
        let sql = format!(
            "SELECT {} FROM volunteers WHERE mobile = $1",
            VOLUNTEER_COLUMNS
        );
        let result = sqlx::query_as::<_, VolunteerEntity>(&sql)
            .bind(mobile)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// List volunteers, optionally filtered by status, oldest first.
    pub async fn list(
        &self,
        status: Option<VolunteerStatusDb>,
    ) -> Result<Vec<VolunteerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_volunteers");
        let sql = format!(
            r#"
            SELECT {}
            FROM volunteers
            WHERE ($1::volunteer_status IS NULL OR status = $1)
            ORDER BY created_at ASC
            "#,
            VOLUNTEER_COLUMNS
        );
        let result = sqlx::query_as::<_, VolunteerEntity>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Set the approval status. Returns None if the volunteer does not exist.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: VolunteerStatusDb,
        decided_by: Uuid,
    ) -> Result<Option<VolunteerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_volunteer_status");
        let sql = format!(
            r#"
            UPDATE volunteers
            SET status = $2,
                approved_by = $3,
                approved_at = CASE WHEN $2 = 'approved'::volunteer_status THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VOLUNTEER_COLUMNS
        );
        let result = sqlx::query_as::<_, VolunteerEntity>(&sql)
            .bind(id)
            .bind(status)
            .bind(decided_by)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE volunteers SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns true when at least one admin account exists.
    pub async fn admin_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM volunteers WHERE role = 'admin')")
            .fetch_one(&self.pool)
            .await
    }

    /// Count volunteers per status.
    pub async fn count_by_status(&self) -> Result<Vec<VolunteerStatusCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("count_volunteers_by_status");
        let result = sqlx::query_as::<_, VolunteerStatusCountEntity>(
            "SELECT status, COUNT(*) AS count FROM volunteers GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
