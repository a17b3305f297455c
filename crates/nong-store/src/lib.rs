//! Store implementations for the assignment engine.
//!
//! - [`MemoryStore`]: process-local maps, used for tests and ephemeral runs.
//! - [`SqliteStore`]: durable SQLite database with the uniqueness constraint
//!   enforced by the schema.
mod memory;
pub use memory::MemoryStore;

mod seed;
pub use seed::{Seed, SeedRegistrant, SeedTarget};

pub mod sqlite;
pub use sqlite::{DbError, SqliteStore};
