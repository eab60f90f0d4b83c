use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthService,
    domain::{CreateUserRequest, Identity, Referral, Role, UpdateUserRequest, User, UserStatus},
    email::Mailer,
    error::{AppError, Result},
    repository::{ReferralRepository, UserRepository},
    service::NotificationService,
};

/// Flat signup discount granted when a valid referral code is redeemed.
const REFERRAL_DISCOUNT_PERCENT: f64 = 20.0;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    referrals: Arc<dyn ReferralRepository>,
    notifications: Arc<NotificationService>,
    mailer: Option<Arc<Mailer>>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        referrals: Arc<dyn ReferralRepository>,
        notifications: Arc<NotificationService>,
        mailer: Option<Arc<Mailer>>,
    ) -> Self {
        Self {
            users,
            referrals,
            notifications,
            mailer,
        }
    }

    /// Public signup. The account starts pending and cannot log in
    /// until an admin approves it. A valid referral code grants the
    /// discount and bumps the referrer's use counter; an unknown code
    /// is silently ignored. Every new account gets its own referral
    /// code and is mailed its generated username.
    pub async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        mobile_number: Option<String>,
        referral_code: Option<&str>,
    ) -> Result<User> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let username = self.generate_username(full_name, "").await?;
        let password_hash = AuthService::hash_password(password).await?;

        let mut discount = 0.0;
        let mut referred_by = None;
        if let Some(code) = referral_code.filter(|c| !c.is_empty()) {
            if self.referrals.find_by_code(code).await?.is_some() {
                discount = REFERRAL_DISCOUNT_PERCENT;
                self.referrals.increment_uses(code).await?;
                referred_by = Some(code.to_string());
            }
        }

        let user = self
            .users
            .create(CreateUserRequest {
                username,
                email: email.to_string(),
                password_hash,
                full_name: Some(full_name.to_string()),
                mobile_number,
                role: Role::Student,
                status: UserStatus::Pending,
                discount,
                referred_by,
            })
            .await?;

        let code = generate_referral_code(&user.username);
        self.referrals.create(user.id, &code).await?;

        if let Some(mailer) = &self.mailer {
            mailer.send_username_email(&user.email, &user.username);
        }

        Ok(user)
    }

    /// Admin approves or rejects an account; the owner is notified.
    pub async fn set_status(&self, user_id: Uuid, status: UserStatus) -> Result<User> {
        let user = self
            .users
            .update(
                user_id,
                UpdateUserRequest {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;

        let message = match status {
            UserStatus::Approved => "Your account has been approved.",
            UserStatus::Rejected => "Your account has been rejected.",
            UserStatus::Pending => return Ok(user),
        };
        self.notifications.notify(user.id, message).await?;

        Ok(user)
    }

    /// Main admin creates a pre-approved student account on someone's
    /// behalf; a welcome email goes out best-effort.
    pub async fn create_student(
        &self,
        actor: &Identity,
        full_name: &str,
        email: &str,
        password: &str,
        mobile_number: Option<String>,
    ) -> Result<User> {
        let user = self
            .create_account(full_name, email, password, mobile_number, "", Role::Student)
            .await?;

        if let Some(mailer) = &self.mailer {
            mailer.send_admin_added_user_email(
                &user.email,
                user.full_name.as_deref().unwrap_or(&user.username),
                &user.username,
                &actor.username,
            );
        }

        Ok(user)
    }

    /// Main admin creates another admin account, pre-approved.
    pub async fn create_admin(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        self.create_account(full_name, email, password, None, "admin", Role::Admin)
            .await
    }

    async fn create_account(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        mobile_number: Option<String>,
        username_suffix: &str,
        role: Role,
    ) -> Result<User> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(
                "User with that email already exists".to_string(),
            ));
        }

        let username = self.generate_username(full_name, username_suffix).await?;
        let password_hash = AuthService::hash_password(password).await?;

        self.users
            .create(CreateUserRequest {
                username,
                email: email.to_string(),
                password_hash,
                full_name: Some(full_name.to_string()),
                mobile_number,
                role,
                status: UserStatus::Approved,
                discount: 0.0,
                referred_by: None,
            })
            .await
    }

    /// Deleting a user removes their enrollments, payments, referral
    /// and notifications with them. Self-deletion and deleting the
    /// main admin are refused.
    pub async fn delete_user(&self, actor: &Identity, user_id: Uuid) -> Result<()> {
        if actor.user_id == user_id {
            return Err(AppError::BadRequest("You cannot delete yourself".to_string()));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.role == Role::MainAdmin {
            return Err(AppError::BadRequest("Cannot delete main admin".to_string()));
        }

        self.users.delete(user_id).await
    }

    /// Students generate their referral code once; a second attempt is
    /// a conflict.
    pub async fn generate_referral(&self, actor: &Identity) -> Result<Referral> {
        if self.referrals.find_by_user(actor.user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "You already have a referral code".to_string(),
            ));
        }

        let code = generate_referral_code(&actor.username);
        self.referrals.create(actor.user_id, &code).await
    }

    /// Username is derived from the full name, lowercased with spaces
    /// stripped, suffixed with a counter until unique.
    async fn generate_username(&self, full_name: &str, suffix: &str) -> Result<String> {
        let base: String = full_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
            + suffix;

        let mut username = base.clone();
        let mut counter = 1;
        while self.users.find_by_username(&username).await?.is_some() {
            username = format!("{base}{counter}");
            counter += 1;
        }

        Ok(username)
    }
}

fn generate_referral_code(username: &str) -> String {
    use rand::Rng;
    let digits: u32 = rand::thread_rng().gen_range(100..1000);
    format!("{}{}", username.to_uppercase(), digits)
}
