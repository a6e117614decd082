use std::fmt::Debug;

use chrono::{NaiveDate, Utc};
use log::*;

use crate::{
    db_types::CycleRoll,
    events::{CycleRolledEvent, EventProducers},
    traits::{LedgerDatabase, LedgerError},
};

/// `CycleApi` moves groups into new billing periods at calendar-month boundaries.
///
/// Rolling is idempotent within a month, so it is safe to call it as often as you like. The other APIs call it lazily
/// before they read a group or credit it with a payment. The server can also run [`CycleApi::roll_all_groups`]
/// periodically.
#[derive(Clone)]
pub struct CycleApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for CycleApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CycleApi")
    }
}

impl<B> CycleApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CycleApi<B>
where B: LedgerDatabase
{
    /// Rolls the group into the current calendar month, if it is not there already.
    pub async fn roll_group(&self, group_id: i64) -> Result<Option<CycleRoll>, LedgerError> {
        self.roll_group_at(group_id, Utc::now().date_naive()).await
    }

    /// Rolls the group into the month containing `today`. Groups are never rolled backwards.
    pub async fn roll_group_at(&self, group_id: i64, today: NaiveDate) -> Result<Option<CycleRoll>, LedgerError> {
        let roll = self.db.roll_group_cycle(group_id, today).await?;
        if let Some(roll) = &roll {
            info!(
                "📆️ Group #{group_id} closed the {} cycle with {} unpaid entries and is now in {}",
                roll.closed_period, roll.unpaid_entries, roll.new_period
            );
            self.producers.publish_cycle_rolled(CycleRolledEvent::new(roll.clone())).await;
        }
        Ok(roll)
    }

    /// Rolls every group. A failure on one group is logged and does not stop the others.
    pub async fn roll_all_groups(&self) -> Result<Vec<CycleRoll>, LedgerError> {
        self.roll_all_groups_at(Utc::now().date_naive()).await
    }

    pub async fn roll_all_groups_at(&self, today: NaiveDate) -> Result<Vec<CycleRoll>, LedgerError> {
        let ids = self.db.fetch_all_group_ids().await?;
        debug!("📆️ Checking {} groups for a cycle roll", ids.len());
        let mut rolls = Vec::new();
        for id in ids {
            match self.roll_group_at(id, today).await {
                Ok(Some(roll)) => rolls.push(roll),
                Ok(None) => {},
                Err(e) => error!("📆️ Could not roll the cycle for group #{id}. {e}"),
            }
        }
        Ok(rolls)
    }
}
