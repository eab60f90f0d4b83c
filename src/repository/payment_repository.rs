use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    user_id: String,
    enrollment_id: Option<String>,
    amount_cents: i64,
    status: String,
    created_on: NaiveDateTime,
}

const PAYMENT_COLUMNS: &str = "id, user_id, enrollment_id, amount_cents, status, created_on";

fn row_to_payment(row: PaymentRow) -> Result<Payment> {
    Ok(Payment {
        id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
        user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
        enrollment_id: row
            .enrollment_id
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| AppError::Database(e.to_string()))?,
        amount_cents: row.amount_cents,
        status: PaymentStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Database(format!("Invalid payment status: {}", row.status)))?,
        created_on: DateTime::from_naive_utc_and_offset(row.created_on, Utc),
    })
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?");
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_on DESC");
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_payment).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = ? ORDER BY created_on DESC"
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_payment).collect()
    }

    async fn list_for_enrollment(&self, enrollment_id: Uuid) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE enrollment_id = ? ORDER BY created_on DESC"
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(enrollment_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_payment).collect()
    }

    async fn sum_completed_for_enrollment(&self, enrollment_id: Uuid) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments \
             WHERE enrollment_id = ? AND status = 'completed'",
        )
        .bind(enrollment_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total)
    }

    async fn total_revenue_cents(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total)
    }
}
