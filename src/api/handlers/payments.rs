use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Identity, Payment, PaymentOrigin, PaymentStatus, Role},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub enrollment_id: Uuid,
    /// Omitted means the full course fee, the common self-pay case.
    pub amount_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub message: String,
    pub payment: Payment,
}

pub async fn pay(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<PayRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>)> {
    if current.user.role != Role::Student {
        return Err(AppError::Forbidden);
    }

    let amount_cents = match req.amount_cents {
        Some(amount) => amount,
        None => {
            let enrollment = state
                .service_context
                .enrollment_repo
                .find_by_id(req.enrollment_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;
            let course = state
                .service_context
                .course_repo
                .find_by_id(enrollment.course_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
            course.fee_cents
        }
    };

    let actor = Identity::from(&current.user);
    let payment = state
        .service_context
        .payment_service
        .record_payment(
            &actor,
            req.enrollment_id,
            amount_cents,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            message: "Payment successful!".to_string(),
            payment,
        }),
    ))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state
        .service_context
        .payment_repo
        .list_for_user(current.user.id)
        .await?;

    Ok(Json(payments))
}

// Admin-side operations.

#[derive(Debug, Deserialize)]
pub struct OfflinePaymentRequest {
    /// User id or username, as typed by the admin.
    pub user_identifier: String,
    pub course_id: Uuid,
    pub amount_cents: i64,
}

pub async fn add_offline(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(req): Json<OfflinePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>)> {
    let payment = state
        .service_context
        .payment_service
        .record_offline_payment(&req.user_identifier, req.course_id, req.amount_cents)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            message: "Offline payment added successfully!".to_string(),
            payment,
        }),
    ))
}

pub async fn list_all(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state.service_context.payment_repo.list().await?;
    Ok(Json(payments))
}
