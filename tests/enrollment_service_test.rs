mod common;

use common::{create_admin, create_course, create_student, test_context};
use vidyasetu::{
    domain::{EnrollmentStatus, Identity, PaymentOrigin, PaymentStatus},
    error::AppError,
};

#[tokio::test]
async fn test_duplicate_enrollment_is_rejected() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    assert_eq!(enrollment.status, EnrollmentStatus::Pending);

    // Second request while the first is still pending
    let err = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Still blocked once active
    ctx.enrollment_service.approve(enrollment.id).await?;
    let err = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn test_reenrollment_after_cancellation_creates_new_row() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let first = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    ctx.enrollment_service.unenroll(&actor, first.id).await?;

    let second = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    assert_ne!(first.id, second.id);
    assert_eq!(second.status, EnrollmentStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn test_request_enrollment_fans_out_notifications() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let admin_one = create_admin(&ctx, "teacherone").await?;
    let admin_two = create_admin(&ctx, "teachertwo").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    ctx.enrollment_service
        .request_enrollment(&Identity::from(&student), course.id)
        .await?;

    let student_notes = ctx.notification_repo.list_for_user(student.id).await?;
    assert_eq!(student_notes.len(), 1);
    assert!(student_notes[0].message.contains("pending approval"));
    assert!(!student_notes[0].is_read);

    for admin in [&admin_one, &admin_two] {
        let notes = ctx.notification_repo.list_for_user(admin.id).await?;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("New enrollment request from asha"));
    }

    Ok(())
}

#[tokio::test]
async fn test_approve_is_idempotent_and_does_not_renotify() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&Identity::from(&student), course.id)
        .await?;

    let approved = ctx.enrollment_service.approve(enrollment.id).await?;
    assert_eq!(approved.status, EnrollmentStatus::Active);
    let after_first = ctx.notification_repo.list_for_user(student.id).await?.len();

    // Repeat approval: same state back, no duplicate notification.
    let again = ctx.enrollment_service.approve(enrollment.id).await?;
    assert_eq!(again.status, EnrollmentStatus::Active);
    let after_second = ctx.notification_repo.list_for_user(student.id).await?.len();
    assert_eq!(after_first, after_second);

    Ok(())
}

#[tokio::test]
async fn test_reject_wins_over_approve() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&Identity::from(&student), course.id)
        .await?;

    ctx.enrollment_service.approve(enrollment.id).await?;
    let rejected = ctx.enrollment_service.reject(enrollment.id).await?;
    assert_eq!(rejected.status, EnrollmentStatus::Cancelled);

    // Rejecting again is a no-op without another notification.
    let before = ctx.notification_repo.list_for_user(student.id).await?.len();
    let again = ctx.enrollment_service.reject(enrollment.id).await?;
    assert_eq!(again.status, EnrollmentStatus::Cancelled);
    let after = ctx.notification_repo.list_for_user(student.id).await?.len();
    assert_eq!(before, after);

    // A cancelled enrollment cannot be approved back to life.
    let err = ctx.enrollment_service.approve(enrollment.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    Ok(())
}

#[tokio::test]
async fn test_admin_unenroll_refunds_latest_completed_payment() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let admin = create_admin(&ctx, "teacherone").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let student_actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&student_actor, course.id)
        .await?;
    let payment = ctx
        .payment_service
        .record_payment(
            &student_actor,
            enrollment.id,
            300_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    let cancelled = ctx
        .enrollment_service
        .unenroll(&Identity::from(&admin), enrollment.id)
        .await?;
    assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);

    let payment = ctx.payment_repo.find_by_id(payment.id).await?.unwrap();
    assert_eq!(payment.status, PaymentStatus::Refunded);

    let notes = ctx.notification_repo.list_for_user(student.id).await?;
    assert!(notes
        .iter()
        .any(|n| n.message.contains("Your payment has been refunded")));

    Ok(())
}

#[tokio::test]
async fn test_student_self_unenroll_keeps_payment_completed() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    let payment = ctx
        .payment_service
        .record_payment(
            &actor,
            enrollment.id,
            300_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    let cancelled = ctx.enrollment_service.unenroll(&actor, enrollment.id).await?;
    assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);

    let payment = ctx.payment_repo.find_by_id(payment.id).await?.unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);

    Ok(())
}

#[tokio::test]
async fn test_student_cannot_unenroll_someone_else() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let owner = create_student(&ctx, "asha").await?;
    let other = create_student(&ctx, "rohan").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&Identity::from(&owner), course.id)
        .await?;

    let err = ctx
        .enrollment_service
        .unenroll(&Identity::from(&other), enrollment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

#[tokio::test]
async fn test_unknown_enrollment_is_not_found() -> anyhow::Result<()> {
    let ctx = test_context().await?;

    let err = ctx
        .enrollment_service
        .approve(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_full_lifecycle_with_partial_payments() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let admin = create_admin(&ctx, "teacherone").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let student_actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&student_actor, course.id)
        .await?;
    assert_eq!(enrollment.status, EnrollmentStatus::Pending);

    let approved = ctx.enrollment_service.approve(enrollment.id).await?;
    assert_eq!(approved.status, EnrollmentStatus::Active);

    let first = ctx
        .payment_service
        .record_payment(
            &student_actor,
            enrollment.id,
            100_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;
    assert_eq!(
        ctx.payment_service.compute_due(enrollment.id).await?,
        200_000
    );

    let second = ctx
        .payment_service
        .record_payment(
            &student_actor,
            enrollment.id,
            200_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;
    assert_eq!(ctx.payment_service.compute_due(enrollment.id).await?, 0);

    // Admin unenroll refunds the most recent completed payment only.
    ctx.enrollment_service
        .unenroll(&Identity::from(&admin), enrollment.id)
        .await?;

    let first = ctx.payment_repo.find_by_id(first.id).await?.unwrap();
    let second = ctx.payment_repo.find_by_id(second.id).await?.unwrap();
    assert_eq!(first.status, PaymentStatus::Completed);
    assert_eq!(second.status, PaymentStatus::Refunded);

    let enrollment = ctx
        .enrollment_repo
        .find_by_id(enrollment.id)
        .await?
        .unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Cancelled);

    Ok(())
}
