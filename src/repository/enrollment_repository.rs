use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Enrollment, EnrollmentStatus},
    error::{AppError, Result},
    repository::EnrollmentRepository,
};

#[derive(FromRow)]
pub(crate) struct EnrollmentRow {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub status: String,
    pub enrolled_on: NaiveDateTime,
}

pub(crate) const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, status, enrolled_on";

pub(crate) fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment> {
    Ok(Enrollment {
        id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
        user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
        course_id: Uuid::parse_str(&row.course_id)
            .map_err(|e| AppError::Database(e.to_string()))?,
        status: EnrollmentStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Database(format!("Invalid enrollment status: {}", row.status)))?,
        enrolled_on: DateTime::from_naive_utc_and_offset(row.enrolled_on, Utc),
    })
}

pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>> {
        let sql = format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?");
        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_enrollment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_live(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE user_id = ? AND course_id = ? AND status != 'cancelled'"
        );
        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(user_id.to_string())
            .bind(course_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_enrollment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_latest_for_pair(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE user_id = ? AND course_id = ? \
             ORDER BY enrolled_on DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(user_id.to_string())
            .bind(course_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_enrollment(r)?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE user_id = ? ORDER BY enrolled_on DESC"
        );
        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_enrollment).collect()
    }

    async fn list_not_cancelled(&self) -> Result<Vec<Enrollment>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE status != 'cancelled' ORDER BY enrolled_on DESC"
        );
        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_enrollment).collect()
    }

    async fn count_not_cancelled(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE status != 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}
