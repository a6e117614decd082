use std::fmt::Debug;

use log::*;

use crate::{
    ajo_api::{cycle_api::CycleApi, errors::GroupApiError, group_api::ensure_organizer},
    db_types::{Group, NewPayout, Payout},
    events::EventProducers,
    traits::{GroupManagement, LedgerDatabase, PayoutManagement},
};

/// `PayoutApi` records the organizer paying the pot out to a member.
///
/// Payouts are bookkeeping only. No money moves through the gateway.
pub struct PayoutApi<B> {
    db: B,
    cycles: CycleApi<B>,
}

impl<B> Debug for PayoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PayoutApi")
    }
}

impl<B: Clone> PayoutApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        let cycles = CycleApi::new(db.clone(), producers);
        Self { db, cycles }
    }
}

impl<B> PayoutApi<B>
where B: PayoutManagement + GroupManagement + LedgerDatabase
{
    /// Records a payout of the group's current `monthly_total`, less the group fee (rounded down to the kobo).
    ///
    /// If a recipient is named, they must be a member of the group. Each cycle's pot is paid out at most once; a second
    /// attempt in the same cycle fails with [`GroupApiError::AlreadyPaidOut`].
    pub async fn create_payout(
        &self,
        organizer_id: &str,
        group_id: i64,
        recipient_id: Option<String>,
    ) -> Result<Payout, GroupApiError> {
        let group = self.fetch_group(group_id).await?;
        ensure_organizer(&group, organizer_id)?;
        self.cycles.roll_group(group_id).await?;
        let group = self.fetch_group(group_id).await?;
        let total_amount = group.monthly_total;
        if !total_amount.is_positive() {
            return Err(GroupApiError::InvalidInput(format!("Group #{group_id} has nothing to pay out this cycle")));
        }
        if let Some(recipient) = &recipient_id {
            if self.db.fetch_membership_for_user(group_id, recipient).await?.is_none() {
                return Err(GroupApiError::NotFound(format!("Member {recipient} of group #{group_id}")));
            }
        }
        let cycle_month = group
            .current_cycle_month
            .ok_or_else(|| GroupApiError::InvalidInput(format!("Group #{group_id} has not started a cycle yet")))?;
        let fee_deducted = total_amount.percentage(group.fee_percent);
        let new_payout = NewPayout { group_id, total_amount, fee_deducted, recipient_id, cycle_month };
        let payout = self.db.insert_payout(new_payout).await?;
        info!("💻️ Payout #{} of {total_amount} (fee {fee_deducted}) recorded for group #{group_id}", payout.id);
        Ok(payout)
    }

    pub async fn mark_distributed(&self, organizer_id: &str, payout_id: i64) -> Result<Payout, GroupApiError> {
        let payout = self
            .db
            .fetch_payout(payout_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Payout #{payout_id}")))?;
        let group = self.fetch_group(payout.group_id).await?;
        ensure_organizer(&group, organizer_id)?;
        let payout = self
            .db
            .mark_payout_distributed(payout_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Payout #{payout_id}")))?;
        info!("💻️ Payout #{payout_id} marked as distributed");
        Ok(payout)
    }

    pub async fn payouts_for_group(&self, group_id: i64) -> Result<Vec<Payout>, GroupApiError> {
        Ok(self.db.fetch_payouts_for_group(group_id).await?)
    }

    async fn fetch_group(&self, group_id: i64) -> Result<Group, GroupApiError> {
        self.db.fetch_group(group_id).await?.ok_or_else(|| GroupApiError::NotFound(format!("Group #{group_id}")))
    }
}
