//! Append-only check-in log shared by both attendee tables.

use domain::models::{CheckInType, NewCheckIn};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::entities::{CheckInEntity, CheckInTypeDb};
use crate::metrics::QueryTimer;

/// Table layout of one attendee pool and its check-in log.
#[derive(Debug, Clone, Copy)]
pub struct CheckInLog {
    pub attendee_table: &'static str,
    pub log_table: &'static str,
    pub owner_column: &'static str,
    pub returning: &'static str,
}

/// Flag column on the attendee row for a check-in kind.
pub fn flag_column(check_in_type: CheckInType) -> &'static str {
    match check_in_type {
        CheckInType::Entry => "has_entry_check_in",
        CheckInType::Lunch => "has_lunch_check_in",
        CheckInType::Dinner => "has_dinner_check_in",
        CheckInType::Session => "has_session_check_in",
    }
}

impl CheckInLog {
    /// Inserts the log row and sets the flag in one transaction.
    ///
    /// Returns `None` without touching the attendee row when a check-in of
    /// this kind already exists.
    pub async fn append<T>(
        &self,
        pool: &PgPool,
        attendee_id: Uuid,
        check_in: &NewCheckIn,
    ) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let timer = QueryTimer::new(format!("append_{}", self.log_table));
        let mut tx = pool.begin().await?;

        let insert_sql = format!(
            r#"
            INSERT INTO {log} ({owner}, check_in_type, scanned_by, was_delegate)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ({owner}, check_in_type) DO NOTHING
            RETURNING id
            "#,
            log = self.log_table,
            owner = self.owner_column,
        );
        let inserted: Option<Uuid> = sqlx::query_scalar(&insert_sql)
            .bind(attendee_id)
            .bind(CheckInTypeDb::from(check_in.check_in_type))
            .bind(check_in.scanned_by.as_deref())
            .bind(check_in.was_delegate)
            .fetch_optional(&mut *tx)
            .await?;

        if inserted.is_none() {
            tracing::debug!(
                log_table = self.log_table,
                attendee_id = %attendee_id,
                check_in_type = %check_in.check_in_type,
                "Check-in row already present"
            );
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        }

        let update_sql = format!(
            r#"
            UPDATE {table}
            SET {flag} = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {columns}
            "#,
            table = self.attendee_table,
            flag = flag_column(check_in.check_in_type),
            columns = self.returning,
        );
        let updated = sqlx::query_as::<_, T>(&update_sql)
            .bind(attendee_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(updated))
    }

    /// Lists the check-ins of one attendee, oldest first.
    pub async fn list(
        &self,
        pool: &PgPool,
        attendee_id: Uuid,
    ) -> Result<Vec<CheckInEntity>, sqlx::Error> {
        let timer = QueryTimer::new(format!("list_{}", self.log_table));
        let sql = format!(
            r#"
            SELECT id, {owner} AS attendee_id, check_in_type, scanned_by, was_delegate, created_at
            FROM {log}
            WHERE {owner} = $1
            ORDER BY created_at ASC
            "#,
            log = self.log_table,
            owner = self.owner_column,
        );
        let result = sqlx::query_as::<_, CheckInEntity>(&sql)
            .bind(attendee_id)
            .fetch_all(pool)
            .await;
        timer.record();
        result
    }
}
