use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Enquiry, EnquiryStatus},
    error::{AppError, Result},
    repository::EnquiryRepository,
};

#[derive(FromRow)]
struct EnquiryRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    course: String,
    message: Option<String>,
    status: String,
    created_on: NaiveDateTime,
}

const ENQUIRY_COLUMNS: &str = "id, name, email, phone, course, message, status, created_on";

pub struct SqliteEnquiryRepository {
    pool: SqlitePool,
}

impl SqliteEnquiryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_enquiry(row: EnquiryRow) -> Result<Enquiry> {
        Ok(Enquiry {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            email: row.email,
            phone: row.phone,
            course: row.course,
            message: row.message,
            status: EnquiryStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid enquiry status: {}", row.status)))?,
            created_on: DateTime::from_naive_utc_and_offset(row.created_on, Utc),
        })
    }
}

#[async_trait]
impl EnquiryRepository for SqliteEnquiryRepository {
    async fn create(&self, enquiry: Enquiry) -> Result<Enquiry> {
        sqlx::query(
            r#"
            INSERT INTO enquiries (id, name, email, phone, course, message, status, created_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(enquiry.id.to_string())
        .bind(&enquiry.name)
        .bind(&enquiry.email)
        .bind(&enquiry.phone)
        .bind(&enquiry.course)
        .bind(&enquiry.message)
        .bind(enquiry.status.as_str())
        .bind(enquiry.created_on.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(enquiry)
    }

    async fn list(&self) -> Result<Vec<Enquiry>> {
        let sql = format!("SELECT {ENQUIRY_COLUMNS} FROM enquiries ORDER BY created_on DESC");
        let rows = sqlx::query_as::<_, EnquiryRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_enquiry).collect()
    }

    async fn mark_contacted(&self, id: Uuid) -> Result<Enquiry> {
        let id_str = id.to_string();
        sqlx::query("UPDATE enquiries SET status = 'contacted' WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let sql = format!("SELECT {ENQUIRY_COLUMNS} FROM enquiries WHERE id = ?");
        let row = sqlx::query_as::<_, EnquiryRow>(&sql)
            .bind(&id_str)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Enquiry not found".to_string()))?;

        Self::row_to_enquiry(row)
    }
}
