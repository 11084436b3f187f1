//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USER PROFILE
        -- Single row (id = 1)
        -- ============================================
        CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            birth TEXT NOT NULL,                 -- ISO date: "2000-01-01"
            gender TEXT NOT NULL,
            region TEXT NOT NULL,
            age INTEGER NOT NULL,
            self_esteem_level TEXT CHECK(self_esteem_level IN ('low', 'high')),
            self_esteem_score INTEGER,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MISSION DAYS
        -- Suggested and chosen missions per date
        -- ============================================
        CREATE TABLE mission_days (
            date TEXT PRIMARY KEY,               -- ISO date
            auto_missions TEXT NOT NULL,         -- JSON array of strings
            custom_missions TEXT NOT NULL DEFAULT '[]',
            selected TEXT,
            status TEXT NOT NULL DEFAULT '{}',   -- JSON object: mission -> achieved
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEAL ITEMS
        -- Ordered per (date, slot)
        -- ============================================
        CREATE TABLE meal_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            slot TEXT NOT NULL CHECK(slot IN ('breakfast', 'lunch', 'dinner', 'snack')),
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            portion TEXT NOT NULL CHECK(portion IN ('small', 'normal', 'large')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_items_day ON meal_items(date, slot, position);

        -- ============================================
        -- FEEDBACK RECORDS
        -- One per date, replaced on regeneration
        -- ============================================
        CREATE TABLE feedback_records (
            date TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            meta TEXT NOT NULL,                  -- JSON snapshot of the inputs
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Migration v2: one meal item per (date, slot, position)
///
/// Positions are renumbered by insertion order first so days that picked up
/// duplicate positions still satisfy the unique index.
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TEMP TABLE meal_item_order AS
            SELECT id,
                   ROW_NUMBER() OVER (PARTITION BY date, slot ORDER BY position, id) - 1
                       AS new_position
            FROM meal_items;
        UPDATE meal_items
        SET position = (
            SELECT new_position FROM meal_item_order WHERE meal_item_order.id = meal_items.id
        );
        DROP TABLE meal_item_order;

        DROP INDEX IF EXISTS idx_meal_items_day;
        CREATE UNIQUE INDEX idx_meal_items_day ON meal_items(date, slot, position);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
