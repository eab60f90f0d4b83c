use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Identity, Payment, PaymentOrigin, PaymentStatus, Transition},
    error::{AppError, Result},
    service::enrollment_service::{fetch_enrollment, set_enrollment_status},
};

/// Outstanding balance on one enrollment, reported only when positive.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentDue {
    pub enrollment_id: Uuid,
    pub due_cents: i64,
}

/// The dues calculator. Payments are append-only; the due for an
/// enrollment is always recomputed from the course fee and the sum of
/// its completed payments, never cached.
pub struct PaymentService {
    pool: SqlitePool,
}

impl PaymentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends a payment for an enrollment. A student can only pay for
    /// their own enrollment, and a completed self-payment activates a
    /// pending enrollment in the same transaction. Admin-recorded
    /// offline payments are bookkeeping only and never change the
    /// enrollment status.
    pub async fn record_payment(
        &self,
        actor: &Identity,
        enrollment_id: Uuid,
        amount_cents: i64,
        status: PaymentStatus,
        origin: PaymentOrigin,
    ) -> Result<Payment> {
        if amount_cents <= 0 {
            return Err(AppError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let enrollment = fetch_enrollment(&mut tx, enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        if origin == PaymentOrigin::StudentSelfPay && enrollment.user_id != actor.user_id {
            return Err(AppError::Unauthorized);
        }

        let payment = insert_payment(
            &mut tx,
            enrollment.user_id,
            Some(enrollment_id),
            amount_cents,
            status,
        )
        .await?;

        if origin == PaymentOrigin::StudentSelfPay && status == PaymentStatus::Completed {
            if let Transition::Changed(next) = enrollment.status.activate() {
                set_enrollment_status(&mut tx, enrollment_id, next).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(payment)
    }

    /// Records a completed payment taken outside the system (cash,
    /// bank transfer) against the student's most recent enrollment in
    /// the course. The enrollment must already exist; its status is
    /// left alone even when the payment clears the dues.
    pub async fn record_offline_payment(
        &self,
        user_identifier: &str,
        course_id: Uuid,
        amount_cents: i64,
    ) -> Result<Payment> {
        if amount_cents <= 0 {
            return Err(AppError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user_id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM users WHERE id = ? OR username = ?",
        )
        .bind(user_identifier)
        .bind(user_identifier)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("User '{user_identifier}' not found")))?;
        let user_id =
            Uuid::parse_str(&user_id).map_err(|e| AppError::Database(e.to_string()))?;

        let course_title = sqlx::query_scalar::<_, String>("SELECT title FROM courses WHERE id = ?")
            .bind(course_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let enrollment_id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM enrollments WHERE user_id = ? AND course_id = ? \
             ORDER BY enrolled_on DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "User '{user_identifier}' is not enrolled in course '{course_title}'"
            ))
        })?;
        let enrollment_id =
            Uuid::parse_str(&enrollment_id).map_err(|e| AppError::Database(e.to_string()))?;

        let payment = insert_payment(
            &mut tx,
            user_id,
            Some(enrollment_id),
            amount_cents,
            PaymentStatus::Completed,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(payment)
    }

    /// Course fee minus the sum of completed payments, floored at zero.
    /// Overpayment is simply hidden from the dues view, not an error.
    pub async fn compute_due(&self, enrollment_id: Uuid) -> Result<i64> {
        let due = sqlx::query_scalar::<_, i64>(
            "SELECT c.fee_cents - COALESCE(( \
                 SELECT SUM(p.amount_cents) FROM payments p \
                 WHERE p.enrollment_id = e.id AND p.status = 'completed'), 0) \
             FROM enrollments e \
             JOIN courses c ON c.id = e.course_id \
             WHERE e.id = ?",
        )
        .bind(enrollment_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        Ok(due.max(0))
    }

    /// Positive dues for the user's active enrollments, for the student
    /// dashboard.
    pub async fn dues_for_user(&self, user_id: Uuid) -> Result<Vec<EnrollmentDue>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT e.id, c.fee_cents - COALESCE(SUM(CASE WHEN p.status = 'completed' \
                 THEN p.amount_cents END), 0) AS due \
             FROM enrollments e \
             JOIN courses c ON c.id = e.course_id \
             LEFT JOIN payments p ON p.enrollment_id = e.id \
             WHERE e.status = 'active' AND e.user_id = ? \
             GROUP BY e.id, c.fee_cents \
             HAVING due > 0",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(due_from_row).collect()
    }

    /// Positive dues across every active enrollment, for the admin
    /// panel.
    pub async fn dues_all_active(&self) -> Result<Vec<EnrollmentDue>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT e.id, c.fee_cents - COALESCE(SUM(CASE WHEN p.status = 'completed' \
                 THEN p.amount_cents END), 0) AS due \
             FROM enrollments e \
             JOIN courses c ON c.id = e.course_id \
             LEFT JOIN payments p ON p.enrollment_id = e.id \
             WHERE e.status = 'active' \
             GROUP BY e.id, c.fee_cents \
             HAVING due > 0",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(due_from_row).collect()
    }
}

fn due_from_row((id, due_cents): (String, i64)) -> Result<EnrollmentDue> {
    Ok(EnrollmentDue {
        enrollment_id: Uuid::parse_str(&id).map_err(|e| AppError::Database(e.to_string()))?,
        due_cents,
    })
}

async fn insert_payment(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    enrollment_id: Option<Uuid>,
    amount_cents: i64,
    status: PaymentStatus,
) -> Result<Payment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO payments (id, user_id, enrollment_id, amount_cents, status, created_on) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(enrollment_id.map(|e| e.to_string()))
    .bind(amount_cents)
    .bind(status.as_str())
    .bind(now.naive_utc())
    .execute(conn)
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Payment {
        id,
        user_id,
        enrollment_id,
        amount_cents,
        status,
        created_on: now,
    })
}
