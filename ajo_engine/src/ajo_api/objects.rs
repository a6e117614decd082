use chrono::{DateTime, Utc};
use paystack_tools::TransactionStatus;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Contribution, Kobo, Membership, PaidBy, PaymentIntent},
    traits::TransitionOutcome,
};

/// Everything needed to start a gateway transaction for a membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionRequest {
    pub membership_id: i64,
    /// The email the gateway sends its receipt to, i.e. the payer's
    pub email: String,
    pub amount: Kobo,
    pub paid_by: PaidBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedPayment {
    pub intent: PaymentIntent,
    pub authorization_url: String,
    pub access_code: String,
}

/// The result of verifying a payment when the contributor returns from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The gateway reports success. The outcome is either `Applied` or `AlreadyProcessed`.
    Paid(TransitionOutcome),
    /// The gateway reports a terminal failure. The intent is now `failed` if it was still `initiated`.
    Declined(TransactionStatus),
    /// The gateway has not settled the transaction yet.
    Pending(TransactionStatus),
}

/// The result of handling an authentic webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed(TransitionOutcome),
    /// Event types other than `charge.success` are acknowledged and dropped.
    Ignored(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub membership: Membership,
    pub total_contributed: Kobo,
    pub completed_contributions: i64,
    pub last_contribution: Option<Contribution>,
    pub next_due: DateTime<Utc>,
}
