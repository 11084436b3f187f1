//! Database module
//!
//! SQLite storage for the profile, missions, meal items and feedback records.

pub mod connection;
pub mod migrations;

use std::path::Path;

pub use connection::{Database, DbError, DbResult};

/// Open the pool at `path`, creating the parent directory, and bring the schema up to date
pub fn open_and_migrate(path: &Path) -> DbResult<Database> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbError::InvalidInput(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }

    let database = Database::new(path)?;
    database.with_conn(|conn| {
        if migrations::needs_migration(conn)? {
            migrations::run_migrations(conn)?;
        }
        let version = migrations::get_schema_version(conn)?;
        tracing::info!(version, path = %path.display(), "database ready");
        Ok(())
    })?;
    Ok(database)
}
