//! # Ajo server
//! The HTTP front end of the ajo contribution ledger. It is responsible for:
//! * Starting contribution payments with Paystack and sending contributors to the checkout page.
//! * Verifying payments when contributors return from checkout, and accepting Paystack's signed webhooks. Both paths
//!   feed the same exactly-once reconciliation in `ajo_engine`.
//! * Group, membership and payout endpoints for the web front end.
//! * Rolling group cycles over at month boundaries in a background worker.
//! * Turning ledger events into inbox notifications (see [integrations](integrations/index.html)), and carrying members'
//!   reports to their organizer.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payment/callback`: Where Paystack redirects the contributor after checkout (`GET` or `POST`).
//! * `/webhook/paystack`: Paystack's signed event notifications.
//! * `/api/...`: Group, membership, contribution, payout, notification and report endpoints. These require the
//!   identity headers set by the authenticating proxy (see [auth](auth/index.html)).
pub mod auth;
pub mod cli;
pub mod config;
pub mod cycle_worker;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
