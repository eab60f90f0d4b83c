mod common;

use common::{create_admin, create_course, create_student, test_context};
use vidyasetu::{
    auth::AuthService,
    domain::{Identity, PaymentOrigin, PaymentStatus, Role, UserStatus},
    error::AppError,
};

#[tokio::test]
async fn test_signup_creates_pending_account_with_referral_code() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    let user = ctx
        .user_service
        .signup("Asha Verma", "asha@example.com", "secret-password", None, None)
        .await?;

    assert_eq!(user.username, "ashaverma");
    assert_eq!(user.role, Role::Student);
    assert_eq!(user.status, UserStatus::Pending);
    assert_eq!(user.discount, 0.0);

    let referral = ctx.referral_repo.find_by_user(user.id).await?.unwrap();
    assert!(referral.code.starts_with("ASHAVERMA"));
    assert_eq!(referral.uses, 0);

    Ok(())
}

#[tokio::test]
async fn test_signup_generates_unique_usernames() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    let first = ctx
        .user_service
        .signup("Asha Verma", "asha1@example.com", "secret-password", None, None)
        .await?;
    let second = ctx
        .user_service
        .signup("Asha Verma", "asha2@example.com", "secret-password", None, None)
        .await?;

    assert_eq!(first.username, "ashaverma");
    assert_eq!(second.username, "ashaverma1");

    Ok(())
}

#[tokio::test]
async fn test_signup_redeems_referral_code() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    let referrer = ctx
        .user_service
        .signup("Asha Verma", "asha@example.com", "secret-password", None, None)
        .await?;
    let referral = ctx.referral_repo.find_by_user(referrer.id).await?.unwrap();

    let referred = ctx
        .user_service
        .signup(
            "Rohan Gupta",
            "rohan@example.com",
            "secret-password",
            None,
            Some(&referral.code),
        )
        .await?;

    assert_eq!(referred.discount, 20.0);
    assert_eq!(referred.referred_by.as_deref(), Some(referral.code.as_str()));

    let referral = ctx.referral_repo.find_by_user(referrer.id).await?.unwrap();
    assert_eq!(referral.uses, 1);

    Ok(())
}

#[tokio::test]
async fn test_signup_ignores_unknown_referral_code() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    let user = ctx
        .user_service
        .signup(
            "Asha Verma",
            "asha@example.com",
            "secret-password",
            None,
            Some("NOSUCHCODE123"),
        )
        .await?;

    assert_eq!(user.discount, 0.0);
    assert!(user.referred_by.is_none());

    Ok(())
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    ctx.user_service
        .signup("Asha Verma", "asha@example.com", "secret-password", None, None)
        .await?;

    let err = ctx
        .user_service
        .signup("Other Person", "asha@example.com", "secret-password", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn test_account_approval_notifies_the_owner() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    let user = ctx
        .user_service
        .signup("Asha Verma", "asha@example.com", "secret-password", None, None)
        .await?;

    let approved = ctx
        .user_service
        .set_status(user.id, UserStatus::Approved)
        .await?;
    assert_eq!(approved.status, UserStatus::Approved);

    let notes = ctx.notification_repo.list_for_user(user.id).await?;
    assert!(notes
        .iter()
        .any(|n| n.message == "Your account has been approved."));

    let rejected = ctx
        .user_service
        .set_status(user.id, UserStatus::Rejected)
        .await?;
    assert_eq!(rejected.status, UserStatus::Rejected);

    let notes = ctx.notification_repo.list_for_user(user.id).await?;
    assert!(notes
        .iter()
        .any(|n| n.message == "Your account has been rejected."));

    Ok(())
}

#[tokio::test]
async fn test_delete_user_cascades_to_owned_rows() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let admin = create_admin(&ctx, "teacherone").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    ctx.payment_service
        .record_payment(
            &actor,
            enrollment.id,
            100_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;
    ctx.user_service.generate_referral(&actor).await?;

    assert!(!ctx.notification_repo.list_for_user(student.id).await?.is_empty());

    ctx.user_service
        .delete_user(&Identity::from(&admin), student.id)
        .await?;

    assert!(ctx.user_repo.find_by_id(student.id).await?.is_none());
    assert!(ctx.enrollment_repo.list_for_user(student.id).await?.is_empty());
    assert!(ctx.payment_repo.list_for_user(student.id).await?.is_empty());
    assert!(ctx.referral_repo.find_by_user(student.id).await?.is_none());
    assert!(ctx.notification_repo.list_for_user(student.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_delete_guards() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let admin = create_admin(&ctx, "teacherone").await?;
    let main_admin = create_student(&ctx, "principal").await?;
    // Promote to main admin for the guard check.
    let main_admin = ctx
        .user_repo
        .update(
            main_admin.id,
            vidyasetu::domain::UpdateUserRequest {
                role: Some(Role::MainAdmin),
                ..Default::default()
            },
        )
        .await?;

    let actor = Identity::from(&admin);

    let err = ctx
        .user_service
        .delete_user(&actor, admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = ctx
        .user_service
        .delete_user(&actor, main_admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_generate_referral_only_once() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let actor = Identity::from(&student);

    let referral = ctx.user_service.generate_referral(&actor).await?;
    assert!(referral.code.starts_with("ASHA"));

    let err = ctx.user_service.generate_referral(&actor).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn test_password_hashing() -> anyhow::Result<()> {
    let password = "my_secure_password";
    let hash = AuthService::hash_password(password).await?;

    assert!(AuthService::verify_password(password, &hash).await?);
    assert!(!AuthService::verify_password("wrong_password", &hash).await?);

    Ok(())
}
