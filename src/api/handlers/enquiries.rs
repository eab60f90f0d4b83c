use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Enquiry, EnquiryStatus},
    error::Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct EnquiryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Course is required"))]
    pub course: String,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnquiryResponse {
    pub message: String,
    pub enquiry: Enquiry,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<EnquiryRequest>,
) -> Result<(StatusCode, Json<EnquiryResponse>)> {
    req.validate()?;

    let enquiry = state
        .service_context
        .enquiry_repo
        .create(Enquiry {
            id: Uuid::new_v4(),
            name: req.name,
            email: req.email,
            phone: req.phone,
            course: req.course,
            message: req.message,
            status: EnquiryStatus::New,
            created_on: Utc::now(),
        })
        .await?;

    state
        .service_context
        .notification_service
        .notify_admins(&format!(
            "New enquiry from {} for course '{}'.",
            enquiry.name, enquiry.course
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnquiryResponse {
            message: "Your enquiry has been submitted successfully!".to_string(),
            enquiry,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<Vec<Enquiry>>> {
    let enquiries = state.service_context.enquiry_repo.list().await?;
    Ok(Json(enquiries))
}

pub async fn mark_contacted(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Enquiry>> {
    let enquiry = state.service_context.enquiry_repo.mark_contacted(id).await?;
    Ok(Json(enquiry))
}
