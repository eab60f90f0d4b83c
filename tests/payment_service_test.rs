mod common;

use common::{create_admin, create_course, create_student, test_context};
use vidyasetu::{
    domain::{EnrollmentStatus, Identity, PaymentOrigin, PaymentStatus},
    error::AppError,
};

#[tokio::test]
async fn test_due_equals_fee_without_payments() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&Identity::from(&student), course.id)
        .await?;

    assert_eq!(
        ctx.payment_service.compute_due(enrollment.id).await?,
        300_000
    );

    Ok(())
}

#[tokio::test]
async fn test_due_is_never_negative() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;

    // Overpayment is hidden from the dues view, not an error.
    ctx.payment_service
        .record_payment(
            &actor,
            enrollment.id,
            500_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    assert_eq!(ctx.payment_service.compute_due(enrollment.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_completed_self_payment_activates_pending_enrollment() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    assert_eq!(enrollment.status, EnrollmentStatus::Pending);

    ctx.payment_service
        .record_payment(
            &actor,
            enrollment.id,
            300_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    let enrollment = ctx
        .enrollment_repo
        .find_by_id(enrollment.id)
        .await?
        .unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
    assert_eq!(ctx.payment_service.compute_due(enrollment.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_pending_self_payment_does_not_activate() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
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
            300_000,
            PaymentStatus::Pending,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    let enrollment = ctx
        .enrollment_repo
        .find_by_id(enrollment.id)
        .await?
        .unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Pending);

    // A pending payment does not count toward the due either.
    assert_eq!(
        ctx.payment_service.compute_due(enrollment.id).await?,
        300_000
    );

    Ok(())
}

#[tokio::test]
async fn test_offline_payment_never_changes_enrollment_status() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let _admin = create_admin(&ctx, "teacherone").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&Identity::from(&student), course.id)
        .await?;

    // Even clearing the full due offline leaves the request pending;
    // activation stays an explicit admin decision.
    let payment = ctx
        .payment_service
        .record_offline_payment("asha", course.id, 300_000)
        .await?;
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.enrollment_id, Some(enrollment.id));

    let enrollment = ctx
        .enrollment_repo
        .find_by_id(enrollment.id)
        .await?
        .unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Pending);
    assert_eq!(ctx.payment_service.compute_due(enrollment.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_offline_payment_requires_existing_enrollment() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let _student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let err = ctx
        .payment_service
        .record_offline_payment("asha", course.id, 100_000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = ctx
        .payment_service
        .record_offline_payment("nobody", course.id, 100_000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_payment_amount_must_be_positive() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let actor = Identity::from(&student);

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;

    for amount in [0, -100] {
        let err = ctx
            .payment_service
            .record_payment(
                &actor,
                enrollment.id,
                amount,
                PaymentStatus::Completed,
                PaymentOrigin::StudentSelfPay,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    Ok(())
}

#[tokio::test]
async fn test_student_cannot_pay_for_someone_elses_enrollment() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let owner = create_student(&ctx, "asha").await?;
    let other = create_student(&ctx, "rohan").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;

    let enrollment = ctx
        .enrollment_service
        .request_enrollment(&Identity::from(&owner), course.id)
        .await?;

    let err = ctx
        .payment_service
        .record_payment(
            &Identity::from(&other),
            enrollment.id,
            100_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

#[tokio::test]
async fn test_revenue_counts_only_completed_payments() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let admin = create_admin(&ctx, "teacherone").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let other_course = create_course(&ctx, "Web Development", 350_000).await?;
    let actor = Identity::from(&student);

    let first = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    ctx.payment_service
        .record_payment(
            &actor,
            first.id,
            300_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    let second = ctx
        .enrollment_service
        .request_enrollment(&actor, other_course.id)
        .await?;
    ctx.payment_service
        .record_payment(
            &actor,
            second.id,
            100_000,
            PaymentStatus::Pending,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    assert_eq!(ctx.payment_repo.total_revenue_cents().await?, 300_000);

    // A refund drops out of revenue immediately.
    ctx.enrollment_service
        .unenroll(&Identity::from(&admin), first.id)
        .await?;
    assert_eq!(ctx.payment_repo.total_revenue_cents().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_dues_views_report_only_positive_active_dues() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;
    let course = create_course(&ctx, "Python Programming", 300_000).await?;
    let other_course = create_course(&ctx, "Web Development", 350_000).await?;
    let actor = Identity::from(&student);

    // Active with an outstanding balance: reported.
    let first = ctx
        .enrollment_service
        .request_enrollment(&actor, course.id)
        .await?;
    ctx.enrollment_service.approve(first.id).await?;
    ctx.payment_service
        .record_payment(
            &actor,
            first.id,
            100_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;

    // Pending enrollment: not reported even though nothing is paid.
    ctx.enrollment_service
        .request_enrollment(&actor, other_course.id)
        .await?;

    let dues = ctx.payment_service.dues_for_user(student.id).await?;
    assert_eq!(dues.len(), 1);
    assert_eq!(dues[0].enrollment_id, first.id);
    assert_eq!(dues[0].due_cents, 200_000);

    let all_dues = ctx.payment_service.dues_all_active().await?;
    assert_eq!(all_dues.len(), 1);
    assert_eq!(all_dues[0].due_cents, 200_000);

    // Fully paid: drops off the dues view.
    ctx.payment_service
        .record_payment(
            &actor,
            first.id,
            200_000,
            PaymentStatus::Completed,
            PaymentOrigin::StudentSelfPay,
        )
        .await?;
    let dues = ctx.payment_service.dues_for_user(student.id).await?;
    assert!(dues.is_empty());

    Ok(())
}
