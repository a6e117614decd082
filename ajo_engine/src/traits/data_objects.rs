use serde::{Deserialize, Serialize};

use crate::db_types::{ConfirmationSource, Contribution, Kobo};

/// A claim, from either the callback or the webhook path, that the gateway received `amount` for `reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub amount: Kobo,
    pub source: ConfirmationSource,
}

impl PaymentConfirmation {
    pub fn new<S: Into<String>>(reference: S, amount: Kobo, source: ConfirmationSource) -> Self {
        Self { reference: reference.into(), amount, source }
    }
}

/// The result of applying the success transition for a payment reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionOutcome {
    /// The intent moved to `success` and this contribution was written to the ledger.
    Applied(Contribution),
    /// Another invocation got there first. Nothing was changed.
    AlreadyProcessed,
    /// No payment intent carries this reference. Nothing was changed.
    UnknownReference,
    /// The confirmed amount does not match the intent. Nothing was changed.
    AmountMismatch { expected: Kobo, received: Kobo },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}
