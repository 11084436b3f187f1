//! Pooled SQLite access
//!
//! Every tool call borrows a connection from a small r2d2 pool. The journal is
//! single-user, so the pool only needs to cover the occasional overlapping call.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

const POOL_SIZE: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection pool error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON column (mission lists, feedback meta) could not be (de)serialized
    #[error("Stored JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected caller input; the message is shown to the user as-is
    #[error("{0}")]
    InvalidInput(String),
}

pub type DbResult<T> = Result<T, DbError>;

pub type PooledConn = PooledConnection<SqliteConnectionManager>;

fn configure(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )
}

/// Handle to the journal database; cheap to clone
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let manager = SqliteConnectionManager::file(path)
            .with_flags(flags)
            .with_init(configure);

        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn get_conn(&self) -> DbResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// Run `f` with a pooled connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }
}
