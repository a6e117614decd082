//! A thin client for the Paystack payment gateway.
//!
//! Only the three operations the contribution ledger needs are exposed:
//! * [`PaystackApi::initialize`] creates a transaction and returns the URL the contributor is redirected to.
//! * [`PaystackApi::verify`] asks Paystack for the current state of a transaction.
//! * [`PaystackApi::validate_signature`] checks the `x-paystack-signature` header of an inbound webhook.
mod api;
mod config;
mod error;
mod signature;

pub mod data_objects;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use data_objects::{
    InitializeTransaction,
    TransactionAuthorization,
    TransactionStatus,
    VerifiedTransaction,
    WebhookData,
    WebhookEvent,
};
pub use error::PaystackApiError;
pub use signature::{calculate_signature, signatures_match, PAYSTACK_SIGNATURE_HEADER};
