use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Identity, Role, UpdateUserRequest, User, UserStatus},
    error::{AppError, Result},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<User>>> {
    let users = state.service_context.user_repo.list().await?;
    Ok(Json(users))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let user = state
        .service_context
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

#[derive(Debug, Serialize)]
pub struct UserActionResponse {
    pub message: String,
    pub user: User,
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserActionResponse>> {
    let user = state
        .service_context
        .user_service
        .set_status(id, UserStatus::Approved)
        .await?;

    Ok(Json(UserActionResponse {
        message: "User approved successfully".to_string(),
        user,
    }))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserActionResponse>> {
    let user = state
        .service_context
        .user_service
        .set_status(id, UserStatus::Rejected)
        .await?;

    Ok(Json(UserActionResponse {
        message: "User rejected successfully".to_string(),
        user,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let target = state
        .service_context
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let acting_role = current.user.role;

    if target.role == Role::MainAdmin && acting_role != Role::MainAdmin {
        return Err(AppError::Forbidden);
    }
    if target.role == Role::Admin && acting_role == Role::Admin && target.id != current.user.id {
        return Err(AppError::BadRequest(
            "Admins cannot edit other admins".to_string(),
        ));
    }
    // Email and role changes are the main admin's call alone.
    if acting_role != Role::MainAdmin && (update.email.is_some() || update.role.is_some()) {
        return Err(AppError::BadRequest(
            "Cannot change user's email or role".to_string(),
        ));
    }

    if let Some(email) = &update.email {
        let existing = state.service_context.user_repo.find_by_email(email).await?;
        if existing.is_some_and(|u| u.id != id) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }

    let user = state.service_context.user_repo.update(id, update).await?;

    Ok(Json(user))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let actor = Identity::from(&current.user);
    state
        .service_context
        .user_service
        .delete_user(&actor, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(equal = 10, message = "Mobile number must be exactly 10 digits"))]
    pub mobile_number: Option<String>,
}

pub async fn create_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(dto): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<UserActionResponse>)> {
    if current.user.role != Role::MainAdmin {
        return Err(AppError::Forbidden);
    }
    dto.validate()?;

    let actor = Identity::from(&current.user);
    let user = state
        .service_context
        .user_service
        .create_student(
            &actor,
            &dto.full_name,
            &dto.email,
            &dto.password,
            dto.mobile_number,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserActionResponse {
            message: format!(
                "Student added successfully. Username: {}. A welcome email has been sent.",
                user.username
            ),
            user,
        }),
    ))
}

pub async fn create_admin(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(dto): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<UserActionResponse>)> {
    if current.user.role != Role::MainAdmin {
        return Err(AppError::Forbidden);
    }
    dto.validate()?;

    let user = state
        .service_context
        .user_service
        .create_admin(&dto.full_name, &dto.email, &dto.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserActionResponse {
            message: format!("Admin created successfully. Username: {}", user.username),
            user,
        }),
    ))
}
