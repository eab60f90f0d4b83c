use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Enrollment, EnrollmentStatus, Identity, Transition},
    error::{AppError, Result},
    repository::enrollment_repository::{row_to_enrollment, EnrollmentRow, ENROLLMENT_COLUMNS},
    service::notification_service::{queue_admin_fanout, queue_notification},
};

/// The enrollment ledger. Every state-changing operation runs inside a
/// single transaction: transition, payment side effects and queued
/// notifications commit together or not at all. Role checks are the
/// HTTP layer's job; this service re-validates only data invariants
/// (state preconditions and enrollment ownership).
pub struct EnrollmentService {
    pool: SqlitePool,
}

pub(crate) async fn fetch_enrollment(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<Enrollment>> {
    let sql = format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?");
    let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    match row {
        Some(r) => Ok(Some(row_to_enrollment(r)?)),
        None => Ok(None),
    }
}

pub(crate) async fn fetch_course_title(
    conn: &mut SqliteConnection,
    course_id: Uuid,
) -> Result<Option<String>> {
    let title = sqlx::query_scalar::<_, String>("SELECT title FROM courses WHERE id = ?")
        .bind(course_id.to_string())
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(title)
}

pub(crate) async fn set_enrollment_status(
    conn: &mut SqliteConnection,
    id: Uuid,
    status: EnrollmentStatus,
) -> Result<()> {
    sqlx::query("UPDATE enrollments SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}

impl EnrollmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Student requests enrollment in a course. Creates a pending row,
    /// notifies the student and fans out to all admins. Fails with
    /// Conflict when a pending-or-active enrollment already exists for
    /// the pair; the partial unique index on enrollments makes that hold
    /// even for two racing requests.
    pub async fn request_enrollment(
        &self,
        actor: &Identity,
        course_id: Uuid,
    ) -> Result<Enrollment> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let course_title = fetch_course_title(&mut tx, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let live = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments \
             WHERE user_id = ? AND course_id = ? AND status != 'cancelled'",
        )
        .bind(actor.user_id.to_string())
        .bind(course_id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if live > 0 {
            return Err(AppError::Conflict(
                "You are already enrolled in this course".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        let insert = sqlx::query(
            "INSERT INTO enrollments (id, user_id, course_id, status, enrolled_on) \
             VALUES (?, ?, ?, 'pending', ?)",
        )
        .bind(id.to_string())
        .bind(actor.user_id.to_string())
        .bind(course_id.to_string())
        .bind(now.naive_utc())
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                return Err(AppError::Conflict(
                    "You are already enrolled in this course".to_string(),
                ));
            }
            return Err(AppError::Database(e.to_string()));
        }

        queue_notification(
            &mut tx,
            actor.user_id,
            &format!(
                "Your enrollment request for {course_title} has been submitted and is pending approval."
            ),
        )
        .await;
        queue_admin_fanout(
            &mut tx,
            &format!(
                "New enrollment request from {} for course '{}'.",
                actor.username, course_title
            ),
        )
        .await;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Enrollment {
            id,
            user_id: actor.user_id,
            course_id,
            status: EnrollmentStatus::Pending,
            enrolled_on: now,
        })
    }

    /// Admin approves a pending enrollment. Approving an already-active
    /// enrollment is a no-op that returns the current row without
    /// re-notifying; approving a cancelled one is refused.
    pub async fn approve(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut enrollment = fetch_enrollment(&mut tx, enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        match enrollment.status.activate() {
            Transition::AlreadyThere => Ok(enrollment),
            Transition::Refused => Err(AppError::InvalidState(
                "Cannot approve a cancelled enrollment".to_string(),
            )),
            Transition::Changed(next) => {
                set_enrollment_status(&mut tx, enrollment_id, next).await?;

                let course_title = fetch_course_title(&mut tx, enrollment.course_id)
                    .await?
                    .unwrap_or_else(|| "your course".to_string());
                queue_notification(
                    &mut tx,
                    enrollment.user_id,
                    &format!("Your enrollment in {course_title} has been approved!"),
                )
                .await;

                tx.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                enrollment.status = next;
                Ok(enrollment)
            }
        }
    }

    /// Admin rejects an enrollment request. Cancels from any live state;
    /// a second reject on an already-cancelled row is a no-op.
    pub async fn reject(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut enrollment = fetch_enrollment(&mut tx, enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        match enrollment.status.cancel() {
            Transition::AlreadyThere => Ok(enrollment),
            Transition::Refused => Err(AppError::InvalidState(
                "Enrollment cannot be rejected".to_string(),
            )),
            Transition::Changed(next) => {
                set_enrollment_status(&mut tx, enrollment_id, next).await?;

                let course_title = fetch_course_title(&mut tx, enrollment.course_id)
                    .await?
                    .unwrap_or_else(|| "your course".to_string());
                queue_notification(
                    &mut tx,
                    enrollment.user_id,
                    &format!("Your enrollment request for {course_title} has been rejected."),
                )
                .await;

                tx.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                enrollment.status = next;
                Ok(enrollment)
            }
        }
    }

    /// Cancels an enrollment. A student may only cancel their own, and
    /// keeps whatever they paid. When an admin unenrolls a student, the
    /// latest completed payment for the enrollment (if any) is marked
    /// refunded in the same transaction and the notification says so.
    pub async fn unenroll(&self, actor: &Identity, enrollment_id: Uuid) -> Result<Enrollment> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut enrollment = fetch_enrollment(&mut tx, enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        if !actor.is_admin() && enrollment.user_id != actor.user_id {
            return Err(AppError::Unauthorized);
        }

        match enrollment.status.cancel() {
            Transition::AlreadyThere => Ok(enrollment),
            Transition::Refused => Err(AppError::InvalidState(
                "Enrollment cannot be cancelled".to_string(),
            )),
            Transition::Changed(next) => {
                set_enrollment_status(&mut tx, enrollment_id, next).await?;

                let course_title = fetch_course_title(&mut tx, enrollment.course_id)
                    .await?
                    .unwrap_or_else(|| "your course".to_string());

                if actor.is_admin() {
                    let refunded = refund_latest_completed(&mut tx, enrollment_id).await?;
                    let mut message =
                        format!("You have been unenrolled from {course_title} by an admin.");
                    if refunded {
                        message.push_str(" Your payment has been refunded.");
                    }
                    queue_notification(&mut tx, enrollment.user_id, &message).await;
                } else {
                    queue_notification(
                        &mut tx,
                        enrollment.user_id,
                        &format!("You have unenrolled from {course_title}."),
                    )
                    .await;
                }

                tx.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                enrollment.status = next;
                Ok(enrollment)
            }
        }
    }
}

/// Marks the most recent completed payment for the enrollment refunded.
/// Returns whether a payment was refunded. No reversing ledger entry is
/// written; the status flip is the whole refund record.
async fn refund_latest_completed(conn: &mut SqliteConnection, enrollment_id: Uuid) -> Result<bool> {
    let payment_id = sqlx::query_scalar::<_, String>(
        "SELECT id FROM payments \
         WHERE enrollment_id = ? AND status = 'completed' \
         ORDER BY created_on DESC LIMIT 1",
    )
    .bind(enrollment_id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;

    let Some(payment_id) = payment_id else {
        return Ok(false);
    };

    sqlx::query("UPDATE payments SET status = 'refunded' WHERE id = ?")
        .bind(&payment_id)
        .execute(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(true)
}
