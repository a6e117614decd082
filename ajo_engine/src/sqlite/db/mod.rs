//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection`
//! argument. Callers can obtain a connection from a pool, or open an atomic transaction as the need arises and pass
//! `&mut tx` through without any other changes.
//!
//! SQLite only has one writer at a time. Every read-modify-write transaction in this crate starts with a write
//! statement, so that the transaction holds the write lock before it reads anything it will act upon.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod contributions;
pub mod cycles;
pub mod groups;
pub mod memberships;
pub mod notifications;
pub mod payment_intents;
pub mod payouts;
pub mod reports;

const SQLITE_DB_URL: &str = "sqlite://data/ajo_ledger.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("AJO_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ AJO_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// True if the error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db) if db.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db) if db.is_foreign_key_violation())
}
