pub mod admin;
pub mod auth;
pub mod courses;
pub mod enquiries;
pub mod enrollments;
pub mod notifications;
pub mod payments;
pub mod referrals;
pub mod root;
pub mod users;
