use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Notification,
    error::{AppError, Result},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .service_context
        .notification_repo
        .list_for_user(current.user.id)
        .await?;

    Ok(Json(notifications))
}

pub async fn list_unread(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .service_context
        .notification_repo
        .list_unread_for_user(current.user.id)
        .await?;

    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let marked = state
        .service_context
        .notification_repo
        .mark_read(id, current.user.id)
        .await?;

    if !marked {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: u64,
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<BulkResponse>> {
    let affected = state
        .service_context
        .notification_repo
        .mark_all_read(current.user.id)
        .await?;

    Ok(Json(BulkResponse { affected }))
}

pub async fn clear_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<BulkResponse>> {
    let affected = state
        .service_context
        .notification_repo
        .delete_all_for_user(current.user.id)
        .await?;

    Ok(Json(BulkResponse { affected }))
}
