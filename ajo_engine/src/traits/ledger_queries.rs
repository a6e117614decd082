use crate::{
    db_types::{Contribution, HistoryEntry, PaymentIntent},
    traits::LedgerError,
};

/// Read-only views of the ledger. Every listing is ordered newest first.
#[allow(async_fn_in_trait)]
pub trait LedgerQueries: Clone {
    async fn fetch_contributions_for_group(&self, group_id: i64) -> Result<Vec<Contribution>, LedgerError>;

    async fn fetch_contributions_for_membership(&self, membership_id: i64) -> Result<Vec<Contribution>, LedgerError>;

    async fn fetch_contribution_for_reference(&self, reference: &str) -> Result<Option<Contribution>, LedgerError>;

    async fn fetch_history_for_group(&self, group_id: i64) -> Result<Vec<HistoryEntry>, LedgerError>;

    async fn fetch_payment_intents_for_membership(&self, membership_id: i64)
        -> Result<Vec<PaymentIntent>, LedgerError>;
}
