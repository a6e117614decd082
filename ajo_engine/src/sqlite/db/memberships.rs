use chrono::Utc;
use log::*;
use sqlx::SqliteConnection;

use super::{is_foreign_key_violation, is_unique_violation};
use crate::{
    db_types::{Membership, UserInfo},
    traits::LedgerError,
};

pub async fn insert_membership(
    group_id: i64,
    user: &UserInfo,
    conn: &mut SqliteConnection,
) -> Result<Membership, LedgerError> {
    let result = sqlx::query_as(
        "INSERT INTO memberships (user_id, user_email, group_id, joined_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&user.user_id)
    .bind(&user.email)
    .bind(group_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(membership) => Ok(membership),
        Err(e) if is_unique_violation(&e) => {
            Err(LedgerError::AlreadyMember { user_id: user.user_id.clone(), group_id })
        },
        Err(e) if is_foreign_key_violation(&e) => Err(LedgerError::GroupNotFound(group_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_membership(
    membership_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM memberships WHERE id = $1").bind(membership_id).fetch_optional(conn).await
}

pub async fn fetch_membership_for_user(
    group_id: i64,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM memberships WHERE group_id = $1 AND user_id = $2")
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_memberships_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Membership>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM memberships WHERE user_id = $1 ORDER BY id DESC").bind(user_id).fetch_all(conn).await
}

pub async fn fetch_members_of_group(
    group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Membership>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM memberships WHERE group_id = $1 ORDER BY id").bind(group_id).fetch_all(conn).await
}

/// Removes a membership. Payment intents and contributions go with it (`ON DELETE CASCADE`).
pub async fn delete_membership(group_id: i64, user_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM memberships WHERE group_id = $1 AND user_id = $2")
        .bind(group_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    let deleted = result.rows_affected() > 0;
    if deleted {
        debug!("🗃️ User {user_id} removed from group #{group_id}");
    }
    Ok(deleted)
}
