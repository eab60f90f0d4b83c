use clap::Parser;
use fake::{faker::name::en::Name, Fake};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use vidyasetu::{
    domain::{
        CreateCourseRequest, CreateUserRequest, Identity, PaymentOrigin, PaymentStatus, Role,
        UserStatus,
    },
    service::ServiceContext,
};

#[derive(Parser)]
#[command(about = "Seed the Vidyasetu database with the default catalog and admin account")]
struct Args {
    /// Database URL; falls back to DATABASE_URL, then sqlite:vidyasetu.db
    #[arg(long)]
    database_url: Option<String>,
    /// Also create demo students with enrollments and payments
    #[arg(long)]
    demo: bool,
}

const DEFAULT_COURSES: &[(&str, &str, i64, &str, &str)] = &[
    (
        "Python Programming",
        "Learn Python basics to advanced.",
        300_000,
        "programming",
        "beginner",
    ),
    (
        "Web Development",
        "Build websites with HTML, CSS, JS.",
        350_000,
        "development",
        "intermediate",
    ),
    (
        "Data Science",
        "Data analysis & ML basics.",
        400_000,
        "business",
        "advanced",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:vidyasetu.db".to_string());

    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let ctx = Arc::new(ServiceContext::new(db_pool, None));

    // Seed the default catalog, skipping titles that already exist so
    // reseeding is safe.
    println!("📚 Creating courses...");
    for (title, description, fee_cents, category, course_type) in DEFAULT_COURSES {
        if ctx.course_repo.find_by_title(title).await?.is_none() {
            ctx.course_repo
                .create(CreateCourseRequest {
                    title: title.to_string(),
                    description: Some(description.to_string()),
                    fee_cents: *fee_cents,
                    category: Some(category.to_string()),
                    course_type: Some(course_type.to_string()),
                    image_file: None,
                })
                .await?;
            println!("  ✅ Created course '{title}'");
        }
    }

    // Main admin account
    let admin = match ctx.user_repo.find_by_email("admin@vidyasetu.local").await? {
        Some(admin) => admin,
        None => {
            let password_hash =
                vidyasetu::auth::AuthService::hash_password("admin123").await?;
            let admin = ctx
                .user_repo
                .create(CreateUserRequest {
                    username: "mainadmin".to_string(),
                    email: "admin@vidyasetu.local".to_string(),
                    password_hash,
                    full_name: Some("Main Admin".to_string()),
                    mobile_number: None,
                    role: Role::MainAdmin,
                    status: UserStatus::Approved,
                    discount: 0.0,
                    referred_by: None,
                })
                .await?;
            println!("  ✅ Created main admin (admin@vidyasetu.local / admin123)");
            admin
        }
    };

    if args.demo {
        println!("👥 Creating demo students...");

        let courses = ctx.course_repo.list().await?;
        let admin_identity = Identity::from(&admin);

        for i in 0..3 {
            let full_name: String = Name().fake();
            let email = format!("student{i}@example.com");

            if ctx.user_repo.find_by_email(&email).await?.is_some() {
                continue;
            }

            let student = ctx
                .user_service
                .create_student(&admin_identity, &full_name, &email, "password123", None)
                .await?;

            // First demo student goes through the whole enroll/approve/
            // pay flow so the dashboard has data on it.
            if i == 0 {
                if let Some(course) = courses.first() {
                    let student_identity = Identity::from(&student);
                    let enrollment = ctx
                        .enrollment_service
                        .request_enrollment(&student_identity, course.id)
                        .await?;
                    ctx.enrollment_service.approve(enrollment.id).await?;
                    ctx.payment_service
                        .record_payment(
                            &student_identity,
                            enrollment.id,
                            course.fee_cents / 3,
                            PaymentStatus::Completed,
                            PaymentOrigin::StudentSelfPay,
                        )
                        .await?;
                    println!(
                        "  ✅ {} enrolled in '{}' with a part payment",
                        student.username, course.title
                    );
                }
            }
        }

        println!("  ✅ Created demo students (password123)");
    }

    println!("🎉 Seeding complete");
    Ok(())
}
