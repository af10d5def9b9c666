//! Connection shim (§4.6): every store call is routed through this guard.
//!
//! 1. If the session is absent or closed, close all resources and re-initialize.
//! 2. Execute the statement.
//! 3. On a connection-level failure, close everything, re-initialize, and retry exactly once.
//!    A second failure propagates.
//!
//! Modeled on the teacher crate's lazy reopen in `db_ops::connection::open_db`, generalized into
//! a guard object per spec.md's "session recycling" redesign note (§9).

use anyhow::{Context, Result};
use rusqlite::{Connection, ErrorCode};
use std::path::PathBuf;
use std::sync::Mutex;

use super::schema::{SCHEMA, WAL_PRAGMAS};

enum Backing {
    File(PathBuf),
    Memory,
}

/// Owns the single connection to the backing store and re-establishes it transparently.
pub struct Session {
    backing: Backing,
    conn: Mutex<Option<Connection>>,
}

impl Session {
    /// Open (or create) a file-backed session, applying schema and WAL pragmas.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        let backing = Backing::File(path.into());
        let conn = Self::connect(&backing)?;
        Ok(Self {
            backing,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Open an in-memory session (schema only, no WAL). Used by tests and short-lived callers.
    pub fn open_memory() -> Result<Self> {
        let backing = Backing::Memory;
        let conn = Self::connect(&backing)?;
        Ok(Self {
            backing,
            conn: Mutex::new(Some(conn)),
        })
    }

    fn connect(backing: &Backing) -> Result<Connection> {
        let conn = match backing {
            Backing::File(path) => {
                let conn = Connection::open(path)
                    .with_context(|| format!("open database at {}", path.display()))?;
                conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
                    .context("enable WAL")?;
                conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
                conn
            }
            Backing::Memory => Connection::open_in_memory().context("open in-memory database")?,
        };
        conn.execute_batch(SCHEMA).context("create schema")?;
        Ok(conn)
    }

    /// Run `f` against the live connection, reconnecting (at most once) on a connection-level
    /// failure. Non-connection errors (e.g. constraint violations) propagate immediately.
    pub fn with<T>(&self, f: impl Fn(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let mut guard = self.conn.lock().unwrap();
        if guard.is_none() {
            *guard = Some(Self::connect(&self.backing).context("re-initialize session")?);
        }
        let conn = guard.as_ref().unwrap();
        match f(conn) {
            Ok(v) => Ok(v),
            Err(e) if is_connection_error(&e) => {
                log::warn!("store connection lost ({e}); reconnecting and retrying once");
                *guard = None;
                *guard = Some(Self::connect(&self.backing).context("re-initialize session")?);
                let conn = guard.as_ref().unwrap();
                f(conn).context("retry after reconnect")
            }
            Err(e) => Err(e).context("store operation failed"),
        }
    }

    /// Force-close the underlying connection; the next call to [`Self::with`] reconnects.
    pub fn close(&self) {
        *self.conn.lock().unwrap() = None;
    }
}

fn is_connection_error(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::SystemIoFailure
            )
    )
}
