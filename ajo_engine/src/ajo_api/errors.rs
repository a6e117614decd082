use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    db_types::Kobo,
    traits::{GatewayError, LedgerError},
};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("The webhook signature is missing or does not match the payload")]
    InvalidSignature,
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("Payment reference {0} has already been issued")]
    DuplicateReference(String),
    #[error("Payment {reference} was expected to be {expected}, but the gateway reported {received}")]
    AmountMismatch { reference: String, expected: Kobo, received: Kobo },
    #[error("Could not understand the gateway payload. {0}")]
    MalformedPayload(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<LedgerError> for ReconciliationError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DuplicateReference(r) => ReconciliationError::DuplicateReference(r),
            LedgerError::GroupNotFound(id) => ReconciliationError::NotFound(format!("Group #{id}")),
            LedgerError::MembershipNotFound(id) => ReconciliationError::NotFound(format!("Membership #{id}")),
            e => ReconciliationError::Database(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum GroupApiError {
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("User {user_id} is already a member of group #{group_id}")]
    AlreadyMember { user_id: String, group_id: i64 },
    #[error("Only the group organizer may do this")]
    NotOrganizer,
    #[error("User is not a member of group #{0}")]
    NotMember(i64),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("Group #{group_id} has already been paid out for the {cycle_month} cycle")]
    AlreadyPaidOut { group_id: i64, cycle_month: NaiveDate },
    #[error("Could not find an unused referral code after {0} attempts")]
    ReferralCodeExhausted(usize),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<LedgerError> for GroupApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::AlreadyMember { user_id, group_id } => GroupApiError::AlreadyMember { user_id, group_id },
            LedgerError::GroupNotFound(id) => GroupApiError::NotFound(format!("Group #{id}")),
            LedgerError::MembershipNotFound(id) => GroupApiError::NotFound(format!("Membership #{id}")),
            LedgerError::PayoutNotFound(id) => GroupApiError::NotFound(format!("Payout #{id}")),
            LedgerError::PayoutExists { group_id, cycle_month } => GroupApiError::AlreadyPaidOut { group_id, cycle_month },
            e => GroupApiError::Database(e.to_string()),
        }
    }
}
