use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Inserts one unread notification on the caller's connection, which is
/// usually an open transaction. Notifications are best-effort: a failed
/// insert is logged and swallowed so it can never roll back the state
/// change that triggered it.
pub(crate) async fn queue_notification(conn: &mut SqliteConnection, user_id: Uuid, message: &str) {
    let result = sqlx::query(
        "INSERT INTO notifications (id, user_id, message, is_read, created_on) \
         VALUES (?, ?, ?, 0, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(message)
    .bind(Utc::now().naive_utc())
    .execute(conn)
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to queue notification for user {}: {}", user_id, e);
    }
}

/// Fans one message out to every admin and main_admin. The recipient set
/// is read at call time, not kept as a stored distribution list.
pub(crate) async fn queue_admin_fanout(conn: &mut SqliteConnection, message: &str) {
    let admin_ids = match sqlx::query_scalar::<_, String>(
        "SELECT id FROM users WHERE role IN ('admin', 'main_admin')",
    )
    .fetch_all(&mut *conn)
    .await
    {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Failed to load admin recipients: {}", e);
            return;
        }
    };

    for id in admin_ids {
        match Uuid::parse_str(&id) {
            Ok(user_id) => queue_notification(&mut *conn, user_id, message).await,
            Err(e) => tracing::warn!("Skipping malformed admin id {}: {}", id, e),
        }
    }
}

pub struct NotificationService {
    pool: SqlitePool,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn notify(&self, user_id: Uuid, message: &str) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        queue_notification(&mut conn, user_id, message).await;
        Ok(())
    }

    pub async fn notify_admins(&self, message: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        queue_admin_fanout(&mut tx, message).await;
        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Notifies every student with an active enrollment in the course,
    /// e.g. after an admin edits it.
    pub async fn notify_active_enrollees(&self, course_id: Uuid, message: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user_ids = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM enrollments WHERE course_id = ? AND status = 'active'",
        )
        .bind(course_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        for id in user_ids {
            match Uuid::parse_str(&id) {
                Ok(user_id) => queue_notification(&mut tx, user_id, message).await,
                Err(e) => tracing::warn!("Skipping malformed user id {}: {}", id, e),
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
