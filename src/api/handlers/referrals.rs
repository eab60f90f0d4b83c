use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Identity, Referral, Role},
    error::{AppError, Result},
};

pub async fn get_mine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Option<Referral>>> {
    let referral = state
        .service_context
        .referral_repo
        .find_by_user(current.user.id)
        .await?;

    Ok(Json(referral))
}

pub async fn generate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<Referral>)> {
    if current.user.role != Role::Student {
        return Err(AppError::Forbidden);
    }

    let actor = Identity::from(&current.user);
    let referral = state
        .service_context
        .user_service
        .generate_referral(&actor)
        .await?;

    Ok((StatusCode::CREATED, Json(referral)))
}
