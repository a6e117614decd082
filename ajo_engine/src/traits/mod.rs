//! # Ledger store and gateway contracts
//!
//! This module defines the interfaces that ledger *backends* and payment gateways need to expose to the engine.
//!
//! * [`LedgerDatabase`] is the reconciliation contract. It owns payment intents, the exactly-once success transition and
//!   the cycle roll. These are the only operations that mutate group aggregates.
//! * [`GroupManagement`] creates groups and memberships and records manual contributions.
//! * [`LedgerQueries`] provides read-only listings of contributions, history and payment intents.
//! * [`PayoutManagement`] stores organizer payouts.
//! * [`NotificationManagement`] keeps each user's inbox, and [`ReportManagement`] the reports members raise with their
//!   organizer.
//! * [`PaymentGateway`] is the engine's view of the payment provider. The Paystack client implements it, and tests swap
//!   in a mock.
mod data_objects;
mod group_management;
mod ledger_database;
mod ledger_queries;
mod notification_management;
mod payment_gateway;
mod payout_management;
mod report_management;

pub use data_objects::{PaymentConfirmation, TransitionOutcome};
pub use group_management::GroupManagement;
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use ledger_queries::LedgerQueries;
pub use notification_management::NotificationManagement;
pub use payment_gateway::{GatewayError, PaymentGateway};
pub use payout_management::PayoutManagement;
pub use report_management::ReportManagement;

/// A backend that provides every store contract. This is what the HTTP server is generic over.
pub trait LedgerStore:
    LedgerDatabase + GroupManagement + LedgerQueries + PayoutManagement + NotificationManagement + ReportManagement
{
}

impl<T> LedgerStore for T where T: LedgerDatabase
        + GroupManagement
        + LedgerQueries
        + PayoutManagement
        + NotificationManagement
        + ReportManagement
{
}
