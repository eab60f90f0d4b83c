mod common;

use common::{create_admin, create_student, test_context};

#[tokio::test]
async fn test_notification_lifecycle() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let student = create_student(&ctx, "asha").await?;

    let first = ctx
        .notification_repo
        .create(student.id, "Your account has been approved.")
        .await?;
    let second = ctx
        .notification_repo
        .create(student.id, "The course 'Python Programming' has been updated.")
        .await?;

    let all = ctx.notification_repo.list_for_user(student.id).await?;
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0].id, second.id);

    let unread = ctx.notification_repo.list_unread_for_user(student.id).await?;
    assert_eq!(unread.len(), 2);

    assert!(ctx.notification_repo.mark_read(first.id, student.id).await?);
    let unread = ctx.notification_repo.list_unread_for_user(student.id).await?;
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id, second.id);

    let affected = ctx.notification_repo.mark_all_read(student.id).await?;
    assert_eq!(affected, 2);
    assert!(ctx
        .notification_repo
        .list_unread_for_user(student.id)
        .await?
        .is_empty());

    let removed = ctx.notification_repo.delete_all_for_user(student.id).await?;
    assert_eq!(removed, 2);
    assert!(ctx
        .notification_repo
        .list_for_user(student.id)
        .await?
        .is_empty());

    Ok(())
}

#[tokio::test]
async fn test_mark_read_checks_ownership() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let owner = create_student(&ctx, "asha").await?;
    let other = create_student(&ctx, "rohan").await?;

    let notification = ctx
        .notification_repo
        .create(owner.id, "Your account has been approved.")
        .await?;

    // Someone else's id never matches the row.
    assert!(!ctx.notification_repo.mark_read(notification.id, other.id).await?);

    let unread = ctx.notification_repo.list_unread_for_user(owner.id).await?;
    assert_eq!(unread.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_admin_fanout_reads_recipients_at_call_time() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let admin_one = create_admin(&ctx, "teacherone").await?;

    ctx.notification_service
        .notify_admins("New enquiry from Asha for course 'Python Programming'.")
        .await?;

    // An admin added later only sees messages sent after they joined.
    let admin_two = create_admin(&ctx, "teachertwo").await?;
    ctx.notification_service
        .notify_admins("New enquiry from Rohan for course 'Web Development'.")
        .await?;

    let first = ctx.notification_repo.list_for_user(admin_one.id).await?;
    assert_eq!(first.len(), 2);

    let second = ctx.notification_repo.list_for_user(admin_two.id).await?;
    assert_eq!(second.len(), 1);
    assert!(second[0].message.contains("Rohan"));

    Ok(())
}
