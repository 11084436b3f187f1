//! Journal file MCP Tools
//!
//! Export to and import from the `user_data.json` / `app_data.json` pair.

use std::path::Path;

use crate::db::Database;
use crate::journal_json::{self, ExportSummary, ImportSummary};

pub fn export_journal(db: &Database, output_dir: &str) -> Result<ExportSummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    journal_json::export_journal(&conn, Path::new(output_dir))
        .map_err(|e| format!("Export failed: {}", e))
}

/// Import journal files, replacing stored data for every imported date.
/// A profile that cannot be restored is reported in `warnings` instead of failing the import.
pub fn import_journal(db: &Database, input_dir: &str) -> Result<ImportSummary, String> {
    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    journal_json::import_journal(&mut conn, Path::new(input_dir))
        .map_err(|e| format!("Import failed: {}", e))
}
