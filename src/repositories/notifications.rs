use sqlx::PgPool;

use crate::db::models::Notification;

const COLUMNS: &str =
    "id, recipient_id, notification_type, title, message, is_read, metadata, created_at";

pub(crate) async fn create(
    pool: &PgPool,
    notification: &Notification,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (
            id, recipient_id, notification_type, title, message, is_read, metadata, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}",
    ))
    .bind(&notification.id)
    .bind(&notification.recipient_id)
    .bind(notification.notification_type)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.is_read)
    .bind(&notification.metadata)
    .bind(notification.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_recipient(
    pool: &PgPool,
    recipient_id: &str,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {COLUMNS} FROM notifications
         WHERE recipient_id = $1 AND ($2 = FALSE OR is_read = FALSE)
         ORDER BY created_at DESC, seq DESC
         LIMIT $3",
    ))
    .bind(recipient_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_unread(pool: &PgPool, recipient_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
    )
    .bind(recipient_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn set_read(
    pool: &PgPool,
    recipient_id: &str,
    notification_id: &str,
    read: bool,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET is_read = $3
         WHERE id = $1 AND recipient_id = $2
         RETURNING {COLUMNS}",
    ))
    .bind(notification_id)
    .bind(recipient_id)
    .bind(read)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_all_read(pool: &PgPool, recipient_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
    )
    .bind(recipient_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
