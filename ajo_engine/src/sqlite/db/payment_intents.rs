use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqliteConnection;

use super::{is_foreign_key_violation, is_unique_violation};
use crate::{
    db_types::{Kobo, NewPaymentIntent, PaymentIntent},
    traits::LedgerError,
};

/// Inserts a new intent in the `initiated` state. A reference that is already taken yields
/// [`LedgerError::DuplicateReference`].
pub async fn insert_intent(intent: NewPaymentIntent, conn: &mut SqliteConnection) -> Result<PaymentIntent, LedgerError> {
    let now = Utc::now();
    let result = sqlx::query_as(
        r#"
            INSERT INTO payment_intents (membership_id, amount, reference, status, paid_by, created_at, updated_at)
            VALUES ($1, $2, $3, 'initiated', $4, $5, $5)
            RETURNING *;
        "#,
    )
    .bind(intent.membership_id)
    .bind(intent.amount)
    .bind(&intent.reference)
    .bind(intent.paid_by)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(intent) => Ok(intent),
        Err(e) if is_unique_violation(&e) => Err(LedgerError::DuplicateReference(intent.reference)),
        Err(e) if is_foreign_key_violation(&e) => Err(LedgerError::MembershipNotFound(intent.membership_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_intent_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentIntent>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payment_intents WHERE reference = $1").bind(reference).fetch_optional(conn).await
}

pub async fn fetch_intents_for_membership(
    membership_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentIntent>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payment_intents WHERE membership_id = $1 ORDER BY id DESC")
        .bind(membership_id)
        .fetch_all(conn)
        .await
}

/// The conditional update that serializes concurrent success transitions for the same reference.
///
/// Only one caller gets the row back. Everyone else gets `None`, either because the intent is already `success`, the
/// amount does not match, or the reference does not exist.
pub async fn mark_success(
    reference: &str,
    amount: Kobo,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentIntent>, sqlx::Error> {
    let intent: Option<PaymentIntent> = sqlx::query_as(
        r#"
        UPDATE payment_intents SET status = 'success', updated_at = $3
        WHERE reference = $1 AND amount = $2 AND status <> 'success'
        RETURNING *
        "#,
    )
    .bind(reference)
    .bind(amount)
    .bind(now)
    .fetch_optional(conn)
    .await?;
    if let Some(intent) = &intent {
        trace!("🗃️ Payment intent {reference} (#{}) marked as success", intent.id);
    }
    Ok(intent)
}

/// `initiated -> failed`. Intents in any other state are left untouched.
pub async fn mark_failed(reference: &str, conn: &mut SqliteConnection) -> Result<Option<PaymentIntent>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE payment_intents SET status = 'failed', updated_at = $2
        WHERE reference = $1 AND status = 'initiated'
        RETURNING *
        "#,
    )
    .bind(reference)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await
}
