//! Connection bootstrap utilities for the document store.
//!
//! # Responsibility
//! - Resolve connection strings into file or in-memory SQLite targets.
//! - Open connections and trigger schema migrations before returning them.
//! - Provide an explicit connectivity check and an explicit close.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - A blank connection string is a configuration error, never a default.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SQLITE_SCHEME: &str = "sqlite://";
const MEMORY_TARGETS: &[&str] = &[":memory:", "sqlite::memory:", "sqlite://:memory:"];

/// Concrete target resolved from a store connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process-private store, discarded when the connection closes.
    Memory,
    /// SQLite database file.
    File(PathBuf),
}

impl StoreLocation {
    /// Parses a connection string.
    ///
    /// Accepted forms: `:memory:`, `sqlite::memory:`, `sqlite://<path>` and a
    /// bare file path.
    pub fn parse(uri: &str) -> DbResult<Self> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(DbError::InvalidStoreUri(
                "connection string cannot be empty".to_string(),
            ));
        }

        if MEMORY_TARGETS.contains(&trimmed) {
            return Ok(Self::Memory);
        }

        let path = match trimmed.strip_prefix(SQLITE_SCHEME) {
            Some(rest) if rest.trim().is_empty() => {
                return Err(DbError::InvalidStoreUri(format!(
                    "`{trimmed}` does not name a database path"
                )));
            }
            Some(rest) => rest,
            None => trimmed,
        };

        Ok(Self::File(PathBuf::from(path)))
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

/// Opens the store named by `uri` and applies all pending migrations.
///
/// # Side effects
/// - Creates the database file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(uri: &str) -> DbResult<Connection> {
    let location = StoreLocation::parse(uri)?;
    open_location(&location)
}

/// Opens an in-memory store and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_location(&StoreLocation::Memory)
}

/// Verifies that the connection can execute queries.
pub fn ping(conn: &Connection) -> DbResult<()> {
    let started_at = Instant::now();
    match conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0)) {
        Ok(_) => {
            info!(
                "event=db_ping module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_ping module=db status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err.into())
        }
    }
}

/// Closes the connection, surfacing any error reported by SQLite.
pub fn close_store(conn: Connection) -> DbResult<()> {
    match conn.close() {
        Ok(()) => {
            info!("event=db_close module=db status=ok");
            Ok(())
        }
        Err((_conn, err)) => {
            error!("event=db_close module=db status=error error={}", err);
            Err(err.into())
        }
    }
}

fn open_location(location: &StoreLocation) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match location {
        StoreLocation::Memory => Connection::open_in_memory(),
        StoreLocation::File(path) => Connection::open(Path::new(path)),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
