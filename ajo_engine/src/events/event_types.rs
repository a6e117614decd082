use serde::{Deserialize, Serialize};

use crate::db_types::{ConfirmationSource, Contribution, CycleRoll};

/// Published once per payment reference, when its contribution is written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCompletedEvent {
    pub group_id: i64,
    pub contribution: Contribution,
    pub source: ConfirmationSource,
}

impl ContributionCompletedEvent {
    pub fn new(group_id: i64, contribution: Contribution) -> Self {
        let source = contribution.source;
        Self { group_id, contribution, source }
    }
}

/// Published when a group moves into a new billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRolledEvent {
    pub roll: CycleRoll,
}

impl CycleRolledEvent {
    pub fn new(roll: CycleRoll) -> Self {
        Self { roll }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    ContributionCompleted(ContributionCompletedEvent),
    CycleRolled(CycleRolledEvent),
}
