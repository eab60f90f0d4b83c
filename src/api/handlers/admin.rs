use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::Result,
    service::EnrollmentDue,
};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_courses: i64,
    /// Cancelled enrollments are history, not headcount.
    pub total_enrollments: i64,
    pub total_revenue_cents: i64,
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<StatsResponse>> {
    let ctx = &state.service_context;

    Ok(Json(StatsResponse {
        total_users: ctx.user_repo.count().await?,
        total_courses: ctx.course_repo.count().await?,
        total_enrollments: ctx.enrollment_repo.count_not_cancelled().await?,
        total_revenue_cents: ctx.payment_repo.total_revenue_cents().await?,
    }))
}

pub async fn dues(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<EnrollmentDue>>> {
    let dues = state.service_context.payment_service.dues_all_active().await?;
    Ok(Json(dues))
}
