use chrono::Utc;
use sqlx::SqliteConnection;

use super::{is_foreign_key_violation, is_unique_violation};
use crate::{
    db_types::{NewPayout, Payout},
    traits::LedgerError,
};

pub async fn insert_payout(payout: NewPayout, conn: &mut SqliteConnection) -> Result<Payout, LedgerError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO payouts (group_id, total_amount, fee_deducted, recipient_id, distributed, paid_at, cycle_month)
            VALUES ($1, $2, $3, $4, FALSE, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(payout.group_id)
    .bind(payout.total_amount)
    .bind(payout.fee_deducted)
    .bind(&payout.recipient_id)
    .bind(Utc::now())
    .bind(payout.cycle_month)
    .fetch_one(conn)
    .await;
    match result {
        Ok(payout) => Ok(payout),
        Err(e) if is_unique_violation(&e) => {
            Err(LedgerError::PayoutExists { group_id: payout.group_id, cycle_month: payout.cycle_month })
        },
        Err(e) if is_foreign_key_violation(&e) => Err(LedgerError::GroupNotFound(payout.group_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_payout(payout_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payout>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payouts WHERE id = $1").bind(payout_id).fetch_optional(conn).await
}

pub async fn mark_distributed(payout_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payout>, sqlx::Error> {
    sqlx::query_as("UPDATE payouts SET distributed = TRUE WHERE id = $1 RETURNING *")
        .bind(payout_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_payouts_for_group(group_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Payout>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payouts WHERE group_id = $1 ORDER BY id DESC").bind(group_id).fetch_all(conn).await
}
