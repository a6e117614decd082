use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    db_types::{CycleRoll, Group, NewPaymentIntent, PaymentIntent},
    traits::data_objects::{PaymentConfirmation, TransitionOutcome},
};

/// The reconciliation contract of a ledger backend.
///
/// Every method that changes state is atomic. In particular, [`Self::complete_payment`] must have exactly-once
/// effect for a given reference, no matter how many callers race to apply it.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Persists a new payment intent in the `initiated` state.
    ///
    /// If the reference is already in use, [`LedgerError::DuplicateReference`] is returned and nothing is written.
    async fn insert_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, LedgerError>;

    async fn fetch_payment_intent(&self, reference: &str) -> Result<Option<PaymentIntent>, LedgerError>;

    /// Moves an `initiated` intent to `failed`. Intents in any other state are left alone, and `None` is returned.
    async fn mark_intent_failed(&self, reference: &str) -> Result<Option<PaymentIntent>, LedgerError>;

    /// Applies the success transition for the confirmed reference in a single transaction:
    /// * the intent moves to `success` (the conditional update is the serialization point),
    /// * the group's cycle is rolled if the calendar month has changed,
    /// * exactly one completed contribution is written for the reference,
    /// * the group's `monthly_total` and `unpaid_count` are adjusted.
    ///
    /// Losing a race, or a replay of an already-applied reference, yields [`TransitionOutcome::AlreadyProcessed`].
    async fn complete_payment(&self, confirmation: PaymentConfirmation) -> Result<TransitionOutcome, LedgerError>;

    /// Rolls the group into the billing period containing `today`, if it is not already there.
    ///
    /// Returns `None` when the group was already in the current period. Concurrent callers produce exactly one roll.
    async fn roll_group_cycle(&self, group_id: i64, today: NaiveDate) -> Result<Option<CycleRoll>, LedgerError>;

    /// The group that owns the membership that the payment reference belongs to.
    async fn fetch_group_for_reference(&self, reference: &str) -> Result<Option<Group>, LedgerError>;

    async fn fetch_all_group_ids(&self) -> Result<Vec<i64>, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Payment reference {0} is already in use")]
    DuplicateReference(String),
    #[error("Referral code {0} is already in use")]
    ReferralCodeTaken(String),
    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember { user_id: String, group_id: i64 },
    #[error("The requested group {0} does not exist")]
    GroupNotFound(i64),
    #[error("The requested membership {0} does not exist")]
    MembershipNotFound(i64),
    #[error("The requested payout {0} does not exist")]
    PayoutNotFound(i64),
    #[error("Group {group_id} has already been paid out for the {cycle_month} cycle")]
    PayoutExists { group_id: i64, cycle_month: NaiveDate },
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
