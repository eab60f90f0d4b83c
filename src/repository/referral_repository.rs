use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Referral,
    error::{AppError, Result},
    repository::ReferralRepository,
};

#[derive(FromRow)]
struct ReferralRow {
    id: String,
    user_id: String,
    code: String,
    uses: i64,
}

pub struct SqliteReferralRepository {
    pool: SqlitePool,
}

impl SqliteReferralRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_referral(row: ReferralRow) -> Result<Referral> {
        Ok(Referral {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            code: row.code,
            uses: row.uses,
        })
    }
}

#[async_trait]
impl ReferralRepository for SqliteReferralRepository {
    async fn create(&self, user_id: Uuid, code: &str) -> Result<Referral> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO referrals (id, user_id, code, uses) VALUES (?, ?, ?, 0)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(code)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                return Err(AppError::Conflict(
                    "A referral code already exists for this user".to_string(),
                ));
            }
            return Err(AppError::Database(e.to_string()));
        }

        Ok(Referral {
            id,
            user_id,
            code: code.to_string(),
            uses: 0,
        })
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Referral>> {
        let row = sqlx::query_as::<_, ReferralRow>(
            "SELECT id, user_id, code, uses FROM referrals WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_referral(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Referral>> {
        let row = sqlx::query_as::<_, ReferralRow>(
            "SELECT id, user_id, code, uses FROM referrals WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_referral(r)?)),
            None => Ok(None),
        }
    }

    async fn increment_uses(&self, code: &str) -> Result<()> {
        sqlx::query("UPDATE referrals SET uses = uses + 1 WHERE code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
