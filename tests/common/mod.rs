use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use vidyasetu::{
    auth::AuthService,
    domain::{Course, CreateCourseRequest, CreateUserRequest, Role, User, UserStatus},
    service::ServiceContext,
};

/// In-memory database with migrations applied. A single connection
/// keeps the whole test on one SQLite memory database.
pub async fn test_context() -> anyhow::Result<Arc<ServiceContext>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Arc::new(ServiceContext::new(pool, None)))
}

pub async fn create_user(
    ctx: &ServiceContext,
    username: &str,
    role: Role,
) -> anyhow::Result<User> {
    let password_hash = AuthService::hash_password("password123").await?;

    let user = ctx
        .user_repo
        .create(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
            full_name: Some(username.to_string()),
            mobile_number: None,
            role,
            status: UserStatus::Approved,
            discount: 0.0,
            referred_by: None,
        })
        .await?;

    Ok(user)
}

pub async fn create_student(ctx: &ServiceContext, username: &str) -> anyhow::Result<User> {
    create_user(ctx, username, Role::Student).await
}

pub async fn create_admin(ctx: &ServiceContext, username: &str) -> anyhow::Result<User> {
    create_user(ctx, username, Role::Admin).await
}

pub async fn create_course(
    ctx: &ServiceContext,
    title: &str,
    fee_cents: i64,
) -> anyhow::Result<Course> {
    let course = ctx
        .course_repo
        .create(CreateCourseRequest {
            title: title.to_string(),
            description: Some("A course".to_string()),
            fee_cents,
            category: Some("programming".to_string()),
            course_type: Some("beginner".to_string()),
            image_file: None,
        })
        .await?;

    Ok(course)
}
