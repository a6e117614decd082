//! # Ajo engine public API
//!
//! The `ajo_api` module exposes the programmatic API of the contribution ledger. Each API is created by supplying a
//! ledger backend that implements the traits it needs, plus the [`EventProducers`](crate::events::EventProducers) it
//! should publish to.
//!
//! * [`reconciliation_api`] starts payments and converts gateway callbacks and webhooks into ledger entries.
//! * [`cycle_api`] moves groups into new billing periods.
//! * [`group_api`] manages groups and memberships, and provides the read-only ledger views.
//! * [`payout_api`] records payouts.
//! * [`notification_api`] turns ledger events into inbox messages.
//! * [`report_api`] carries members' reports to their organizer.
//!
//! ```rust,ignore
//! use ajo_engine::{events::EventProducers, ReconciliationApi, SqliteDatabase};
//! use paystack_tools::{PaystackApi, PaystackConfig};
//! let db = SqliteDatabase::new_with_url("sqlite://data/ajo.db", 5).await?;
//! let gateway = PaystackApi::new(PaystackConfig::new_from_env_or_default())?;
//! let api = ReconciliationApi::new(db, gateway, EventProducers::default());
//! let outcome = api.verify_callback("ajo_q3ZkP0w8r2LmXa9TbC1d").await?;
//! ```
pub mod cycle_api;
pub mod errors;
pub mod group_api;
pub mod notification_api;
pub mod objects;
pub mod payout_api;
pub mod reconciliation_api;
pub mod report_api;
