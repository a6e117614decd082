//! SQLite backend for the contribution ledger.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
