use crate::{
    db_types::{NewPayout, Payout},
    traits::LedgerError,
};

#[allow(async_fn_in_trait)]
pub trait PayoutManagement: Clone {
    async fn insert_payout(&self, payout: NewPayout) -> Result<Payout, LedgerError>;

    async fn fetch_payout(&self, payout_id: i64) -> Result<Option<Payout>, LedgerError>;

    /// Sets the distributed flag. Returns `None` if the payout does not exist.
    async fn mark_payout_distributed(&self, payout_id: i64) -> Result<Option<Payout>, LedgerError>;

    async fn fetch_payouts_for_group(&self, group_id: i64) -> Result<Vec<Payout>, LedgerError>;
}
