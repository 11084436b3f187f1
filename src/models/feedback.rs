//! Feedback record model
//!
//! Generated feedback text for a date together with a snapshot of the inputs it was
//! generated from. Regenerating replaces the record.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

use super::nutrition::NutrientTotals;

/// Inputs captured when the feedback was produced.
///
/// Field values are kept as display strings so records imported from journal files
/// round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMeta {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub self_esteem: Option<String>,
    #[serde(default)]
    pub selected_mission: Option<String>,
    #[serde(default)]
    pub nutrient_totals: NutrientTotals,
    #[serde(default)]
    pub tendencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub date: String,
    pub text: String,
    pub meta: FeedbackMeta,
}

impl FeedbackRecord {
    fn from_row(row: &Row) -> rusqlite::Result<(String, String, String)> {
        Ok((row.get("date")?, row.get("text")?, row.get("meta")?))
    }

    fn decode(raw: (String, String, String)) -> DbResult<Self> {
        let (date, text, meta) = raw;
        Ok(Self {
            date,
            text,
            meta: serde_json::from_str(&meta)?,
        })
    }

    pub fn get(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT date, text, meta FROM feedback_records WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(raw) => Ok(Some(Self::decode(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store the record, replacing any earlier feedback for the same date
    pub fn upsert(&self, conn: &Connection) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO feedback_records (date, text, meta)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(date) DO UPDATE SET
                text = excluded.text,
                meta = excluded.meta,
                created_at = datetime('now')
            "#,
            params![self.date, self.text, serde_json::to_string(&self.meta)?],
        )?;
        Ok(())
    }

    /// All records, newest date first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT date, text, meta FROM feedback_records ORDER BY date DESC")?;
        let raws = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(Self::decode).collect()
    }
}
