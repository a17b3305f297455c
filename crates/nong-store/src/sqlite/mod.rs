//! SQLite-backed store.
//!
//! # Invariants
//! - Connections have `foreign_keys=ON` and all migrations applied before use.
//! - `assignments.partner_id` is `UNIQUE`; the schema is the final arbiter of
//!   partner uniqueness, not the engine.
//! - Blocking SQLite calls run on the tokio blocking pool.
//! - `event_log` rows are written by one thread, in `record` order.
mod events;
pub mod migrations;
mod open;
mod store;

pub use store::SqliteStore;

use nong_core::StoreError;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    #[error("failed to start event writer: {0}")]
    EventWriter(#[source] std::io::Error),
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        StoreError::Backend(value.to_string())
    }
}
