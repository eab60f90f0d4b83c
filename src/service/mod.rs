pub mod enrollment_service;
pub mod notification_service;
pub mod payment_service;
pub mod user_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::email::Mailer;
use crate::repository::*;

pub use enrollment_service::EnrollmentService;
pub use notification_service::NotificationService;
pub use payment_service::{EnrollmentDue, PaymentService};
pub use user_service::UserService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub course_repo: Arc<dyn CourseRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub referral_repo: Arc<dyn ReferralRepository>,
    pub enquiry_repo: Arc<dyn EnquiryRepository>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub payment_service: Arc<PaymentService>,
    pub notification_service: Arc<NotificationService>,
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, mailer: Option<Arc<Mailer>>) -> Self {
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let course_repo: Arc<dyn CourseRepository> =
            Arc::new(SqliteCourseRepository::new(db_pool.clone()));
        let enrollment_repo: Arc<dyn EnrollmentRepository> =
            Arc::new(SqliteEnrollmentRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(SqliteNotificationRepository::new(db_pool.clone()));
        let referral_repo: Arc<dyn ReferralRepository> =
            Arc::new(SqliteReferralRepository::new(db_pool.clone()));
        let enquiry_repo: Arc<dyn EnquiryRepository> =
            Arc::new(SqliteEnquiryRepository::new(db_pool.clone()));

        let notification_service = Arc::new(NotificationService::new(db_pool.clone()));
        let enrollment_service = Arc::new(EnrollmentService::new(db_pool.clone()));
        let payment_service = Arc::new(PaymentService::new(db_pool.clone()));
        let user_service = Arc::new(UserService::new(
            user_repo.clone(),
            referral_repo.clone(),
            notification_service.clone(),
            mailer,
        ));
        let auth_service = Arc::new(AuthService::new(db_pool.clone()));

        Self {
            user_repo,
            course_repo,
            enrollment_repo,
            payment_repo,
            notification_repo,
            referral_repo,
            enquiry_repo,
            enrollment_service,
            payment_service,
            notification_service,
            user_service,
            auth_service,
            db_pool,
        }
    }
}
