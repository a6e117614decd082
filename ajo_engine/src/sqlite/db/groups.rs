use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{Group, Kobo, NewGroup},
    traits::LedgerError,
};

/// Inserts a new group. A clash on the referral code is reported as [`LedgerError::ReferralCodeTaken`].
pub async fn insert_group(
    organizer_id: &str,
    group: NewGroup,
    referral_code: &str,
    created_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Group, LedgerError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO groups (
                name,
                description,
                organizer_id,
                contribution_cycle,
                contribution_amount,
                withdrawal_schedule,
                fee_percent,
                referral_code,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(group.name)
    .bind(group.description)
    .bind(organizer_id)
    .bind(group.contribution_cycle)
    .bind(group.contribution_amount)
    .bind(group.withdrawal_schedule)
    .bind(group.fee_percent)
    .bind(referral_code)
    .bind(created_at)
    .fetch_one(conn)
    .await;
    match result {
        Ok(group) => Ok(group),
        Err(e) if is_unique_violation(&e) => {
            debug!("🗃️ Referral code {referral_code} is already taken");
            Err(LedgerError::ReferralCodeTaken(referral_code.to_string()))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_group(group_id: i64, conn: &mut SqliteConnection) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM groups WHERE id = $1").bind(group_id).fetch_optional(conn).await
}

pub async fn fetch_group_by_referral_code(
    code: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM groups WHERE referral_code = $1").bind(code).fetch_optional(conn).await
}

pub async fn fetch_group_for_membership(
    membership_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT groups.* FROM groups
        JOIN memberships ON memberships.group_id = groups.id
        WHERE memberships.id = $1
        "#,
    )
    .bind(membership_id)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_group_for_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT groups.* FROM groups
        JOIN memberships ON memberships.group_id = groups.id
        JOIN payment_intents ON payment_intents.membership_id = memberships.id
        WHERE payment_intents.reference = $1
        "#,
    )
    .bind(reference)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_groups_for_organizer(
    organizer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM groups WHERE organizer_id = $1 ORDER BY id DESC")
        .bind(organizer_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_all_group_ids(conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM groups ORDER BY id").fetch_all(conn).await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Members of the group with no completed contribution in the group's current cycle. Always zero before the first roll.
const UNPAID_MEMBERS: &str = r#"
    CASE WHEN groups.current_cycle_month IS NULL THEN 0 ELSE (
        SELECT COUNT(*) FROM memberships
        WHERE memberships.group_id = groups.id AND NOT EXISTS (
            SELECT 1 FROM contributions
            WHERE contributions.membership_id = memberships.id
              AND contributions.status = 'completed'
              AND contributions.cycle_month = groups.current_cycle_month
        )
    ) END
"#;

/// Adds `amount` to the group's running total and recounts the members who have not paid this cycle.
pub async fn credit_group(group_id: i64, amount: Kobo, conn: &mut SqliteConnection) -> Result<Group, sqlx::Error> {
    let sql = format!(
        "UPDATE groups SET monthly_total = monthly_total + $2, unpaid_count = {UNPAID_MEMBERS} WHERE id = $1 RETURNING *"
    );
    let group: Group = sqlx::query_as(&sql).bind(group_id).bind(amount).fetch_one(conn).await?;
    trace!(
        "🗃️ Group #{group_id} credited with {amount}. Total: {}. Unpaid: {}",
        group.monthly_total,
        group.unpaid_count
    );
    Ok(group)
}

/// Recounts `unpaid_count` after the membership list changes. Run it in the same transaction as the change.
pub async fn refresh_unpaid_count(group_id: i64, conn: &mut SqliteConnection) -> Result<Option<Group>, sqlx::Error> {
    let sql = format!("UPDATE groups SET unpaid_count = {UNPAID_MEMBERS} WHERE id = $1 RETURNING *");
    let group: Option<Group> = sqlx::query_as(&sql).bind(group_id).fetch_optional(conn).await?;
    if let Some(group) = &group {
        trace!("🗃️ Group #{group_id} now has {} unpaid members", group.unpaid_count);
    }
    Ok(group)
}
