use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Course, CreateCourseRequest, UpdateCourseRequest},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    query: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Course>>> {
    let courses = state.service_context.course_repo.list().await?;
    Ok(Json(courses))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Course>> {
    let course = state
        .service_context
        .course_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Course>>> {
    let courses = state.service_context.course_repo.search(&params.query).await?;
    Ok(Json(courses))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Fee cannot be negative"))]
    pub fee_cents: i64,
    pub category: Option<String>,
    pub course_type: Option<String>,
    pub image_file: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(dto): Json<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>)> {
    dto.validate()?;

    let course = state
        .service_context
        .course_repo
        .create(CreateCourseRequest {
            title: dto.title,
            description: dto.description,
            fee_cents: dto.fee_cents,
            category: dto.category,
            course_type: dto.course_type,
            image_file: dto.image_file,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateCourseRequest>,
) -> Result<Json<Course>> {
    let course = state.service_context.course_repo.update(id, update).await?;

    // Students with an active enrollment hear about course changes.
    state
        .service_context
        .notification_service
        .notify_active_enrollees(
            course.id,
            &format!("The course '{}' has been updated.", course.title),
        )
        .await?;

    Ok(Json(course))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .course_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    state.service_context.course_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
