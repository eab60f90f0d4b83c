pub mod course;
pub mod enquiry;
pub mod enrollment;
pub mod notification;
pub mod payment;
pub mod referral;
pub mod user;

pub use course::{Course, CreateCourseRequest, UpdateCourseRequest};
pub use enquiry::{Enquiry, EnquiryStatus};
pub use enrollment::{Enrollment, EnrollmentStatus, Transition};
pub use notification::Notification;
pub use payment::{Payment, PaymentOrigin, PaymentStatus};
pub use referral::Referral;
pub use user::{CreateUserRequest, Identity, Role, UpdateUserRequest, User, UserStatus};
