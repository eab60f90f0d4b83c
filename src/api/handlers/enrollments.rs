use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Enrollment, Identity, Role},
    error::{AppError, Result},
    service::EnrollmentDue,
};

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub message: String,
    pub enrollment: Enrollment,
}

pub async fn enroll(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>)> {
    if current.user.role != Role::Student {
        return Err(AppError::Forbidden);
    }

    let actor = Identity::from(&current.user);
    let enrollment = state
        .service_context
        .enrollment_service
        .request_enrollment(&actor, req.course_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            message: "Your enrollment request has been submitted and is pending approval."
                .to_string(),
            enrollment,
        }),
    ))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Enrollment>>> {
    let enrollments = state
        .service_context
        .enrollment_repo
        .list_for_user(current.user.id)
        .await?;

    Ok(Json(enrollments))
}

pub async fn my_dues(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<EnrollmentDue>>> {
    let dues = state
        .service_context
        .payment_service
        .dues_for_user(current.user.id)
        .await?;

    Ok(Json(dues))
}

#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub enrollment_id: Uuid,
    pub due_cents: i64,
}

pub async fn due(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DueResponse>> {
    let enrollment = state
        .service_context
        .enrollment_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    if !current.user.role.is_admin() && enrollment.user_id != current.user.id {
        return Err(AppError::Forbidden);
    }

    let due_cents = state.service_context.payment_service.compute_due(id).await?;

    Ok(Json(DueResponse {
        enrollment_id: id,
        due_cents,
    }))
}

pub async fn unenroll(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentResponse>> {
    let actor = Identity::from(&current.user);
    let enrollment = state
        .service_context
        .enrollment_service
        .unenroll(&actor, id)
        .await?;

    Ok(Json(EnrollmentResponse {
        message: "Successfully unenrolled.".to_string(),
        enrollment,
    }))
}

// Admin-side operations.

pub async fn list_all(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<Enrollment>>> {
    let enrollments = state
        .service_context
        .enrollment_repo
        .list_not_cancelled()
        .await?;

    Ok(Json(enrollments))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentResponse>> {
    let enrollment = state.service_context.enrollment_service.approve(id).await?;

    Ok(Json(EnrollmentResponse {
        message: "Enrollment approved successfully".to_string(),
        enrollment,
    }))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentResponse>> {
    let enrollment = state.service_context.enrollment_service.reject(id).await?;

    Ok(Json(EnrollmentResponse {
        message: "Enrollment rejected successfully".to_string(),
        enrollment,
    }))
}
