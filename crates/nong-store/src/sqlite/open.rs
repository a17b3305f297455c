use std::{
    path::Path,
    time::{Duration, Instant},
};

use rusqlite::Connection;
use tracing::{error, info};

use super::{DbResult, migrations::apply_migrations};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a database file and applies pending migrations.
pub(crate) fn open_db(path: &Path) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path))
}

/// Opens a private in-memory database and applies pending migrations.
pub(crate) fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory)
}

fn bootstrap(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!(event = "db_open", mode, status = "start");

    let result: DbResult<Connection> = open().map_err(Into::into).and_then(|mut conn| {
        configure(&mut conn)?;
        Ok(conn)
    });

    let duration_ms = started_at.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => info!(event = "db_open", mode, status = "ok", duration_ms),
        Err(err) => error!(event = "db_open", mode, status = "error", duration_ms, error = %err),
    }
    result
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
