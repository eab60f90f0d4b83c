use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub fee_cents: i64,
    pub category: Option<String>,
    pub course_type: Option<String>,
    pub image_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub fee_cents: i64,
    pub category: Option<String>,
    pub course_type: Option<String>,
    pub image_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fee_cents: Option<i64>,
    pub category: Option<String>,
    pub course_type: Option<String>,
    pub image_file: Option<String>,
}
