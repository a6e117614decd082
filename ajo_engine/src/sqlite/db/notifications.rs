use chrono::Utc;
use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{NewNotification, Notification};

pub async fn insert_notifications(
    notifications: &[NewNotification],
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now();
    let mut written = 0;
    for n in notifications {
        let result = sqlx::query(
            "INSERT INTO notifications (user_id, group_id, message, is_read, created_at) VALUES ($1, $2, $3, FALSE, $4)",
        )
        .bind(&n.user_id)
        .bind(n.group_id)
        .bind(&n.message)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        written += result.rows_affected();
    }
    trace!("🗃️ {written} notifications written");
    Ok(written)
}

pub async fn fetch_notifications_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

pub async fn mark_read(
    notification_id: i64,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}
