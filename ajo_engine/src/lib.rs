//! Ajo Engine
//!
//! The engine behind an ajo (rotating savings) group platform. Organizers create groups, members join with a referral
//! code and pay their contributions through Paystack, and organizers record payouts.
//!
//! The library is divided into two main sections:
//! 1. The ledger store ([`mod@traits`] and the SQLite backend). You should never need to access the database directly.
//!    The exception is the data types, which are defined in [`mod@db_types`] and are public.
//! 2. The public API ([`mod@ajo_api`]). [`ReconciliationApi`] is the heart of the engine: it keeps payment intents,
//!    contributions and group totals consistent while the gateway confirms payments through two independent channels
//!    that may each fire more than once. [`CycleApi`] resets group totals at month boundaries.
//!
//! The engine also publishes events (see [`mod@events`]) when a contribution is completed or a cycle rolls over.
//! [`NotificationApi`] turns those events into inbox messages, and [`ReportApi`] carries members' reports to their
//! organizer.
mod ajo_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ajo_api::{
    cycle_api::CycleApi,
    errors::{GroupApiError, ReconciliationError},
    group_api::{GroupApi, MAX_REFERRAL_CODE_ATTEMPTS},
    notification_api::NotificationApi,
    objects::{CallbackOutcome, ContributionRequest, MemberSummary, StartedPayment, WebhookOutcome},
    payout_api::PayoutApi,
    reconciliation_api::{ReconciliationApi, DEFAULT_CALLBACK_URL},
    report_api::{ReportApi, MAX_REPORT_SUBJECT_LENGTH},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    GatewayError,
    GroupManagement,
    LedgerDatabase,
    LedgerError,
    LedgerQueries,
    LedgerStore,
    NotificationManagement,
    PaymentConfirmation,
    PaymentGateway,
    PayoutManagement,
    ReportManagement,
    TransitionOutcome,
};
