use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod course_repository;
pub mod enquiry_repository;
pub mod enrollment_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod referral_repository;
pub mod user_repository;

pub use course_repository::SqliteCourseRepository;
pub use enquiry_repository::SqliteEnquiryRepository;
pub use enrollment_repository::SqliteEnrollmentRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use referral_repository::SqliteReferralRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Looks up by email or username, the two login identifiers.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn list_admins(&self) -> Result<Vec<User>>;
    async fn count(&self) -> Result<i64>;
    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User>;
    /// Removes the user together with their enrollments, payments,
    /// referral, notifications and sessions, in one transaction.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, request: CreateCourseRequest) -> Result<Course>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>>;
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>>;
    async fn list(&self) -> Result<Vec<Course>>;
    async fn search(&self, query: &str) -> Result<Vec<Course>>;
    async fn count(&self) -> Result<i64>;
    async fn update(&self, id: Uuid, update: UpdateCourseRequest) -> Result<Course>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>>;
    /// The at-most-one pending-or-active enrollment for a (user, course)
    /// pair, if any.
    async fn find_live(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>>;
    /// Most recent enrollment for the pair regardless of status, used to
    /// target admin-recorded offline payments.
    async fn find_latest_for_pair(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>>;
    async fn list_not_cancelled(&self) -> Result<Vec<Enrollment>>;
    async fn count_not_cancelled(&self) -> Result<i64>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn list(&self) -> Result<Vec<Payment>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>>;
    async fn list_for_enrollment(&self, enrollment_id: Uuid) -> Result<Vec<Payment>>;
    async fn sum_completed_for_enrollment(&self, enrollment_id: Uuid) -> Result<i64>;
    async fn total_revenue_cents(&self) -> Result<i64>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, message: &str) -> Result<Notification>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;
    async fn list_unread_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;
    /// Marks one notification read; the ownership check is part of the
    /// query so a user can never flip someone else's row.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait ReferralRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, code: &str) -> Result<Referral>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Referral>>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Referral>>;
    async fn increment_uses(&self, code: &str) -> Result<()>;
}

#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    async fn create(&self, enquiry: Enquiry) -> Result<Enquiry>;
    async fn list(&self) -> Result<Vec<Enquiry>>;
    async fn mark_contacted(&self, id: Uuid) -> Result<Enquiry>;
}
