use chrono::{NaiveDate, Utc};
use log::*;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::db_types::{ConfirmationSource, Contribution, Kobo, PaidBy, PaymentIntent};

/// A completed ledger entry that has not been written yet.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub membership_id: i64,
    pub amount: Kobo,
    pub payment_reference: Option<String>,
    pub paid_by: PaidBy,
    pub source: ConfirmationSource,
    pub note: Option<String>,
    pub cycle_month: NaiveDate,
}

impl NewLedgerEntry {
    pub fn for_intent(intent: &PaymentIntent, source: ConfirmationSource, cycle_month: NaiveDate) -> Self {
        Self {
            membership_id: intent.membership_id,
            amount: intent.amount,
            payment_reference: Some(intent.reference.clone()),
            paid_by: intent.paid_by,
            source,
            note: None,
            cycle_month,
        }
    }
}

/// Writes a completed contribution.
///
/// Returns `None` if a contribution for the same payment reference already exists. The unique index on
/// `payment_reference` is what guarantees at most one ledger entry per reference.
pub async fn insert_contribution(
    entry: NewLedgerEntry,
    conn: &mut SqliteConnection,
) -> Result<Option<Contribution>, sqlx::Error> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO contributions (
                membership_id,
                amount,
                status,
                payment_reference,
                paid_by,
                source,
                note,
                cycle_month,
                created_at
            ) VALUES ($1, $2, 'completed', $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(entry.membership_id)
    .bind(entry.amount)
    .bind(&entry.payment_reference)
    .bind(entry.paid_by)
    .bind(entry.source)
    .bind(&entry.note)
    .bind(entry.cycle_month)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(contribution) => Ok(Some(contribution)),
        Err(e) if is_unique_violation(&e) => {
            debug!("🗃️ A contribution for reference {:?} already exists", entry.payment_reference);
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

pub async fn fetch_contributions_for_group(
    group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Contribution>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT contributions.* FROM contributions
        JOIN memberships ON memberships.id = contributions.membership_id
        WHERE memberships.group_id = $1
        ORDER BY contributions.id DESC
        "#,
    )
    .bind(group_id)
    .fetch_all(conn)
    .await
}

pub async fn fetch_contributions_for_membership(
    membership_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Contribution>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM contributions WHERE membership_id = $1 ORDER BY id DESC")
        .bind(membership_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_contribution_for_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Contribution>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM contributions WHERE payment_reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await
}
