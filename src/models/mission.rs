//! Mission model
//!
//! A day's suggested missions, any missions the user wrote, the one chosen, and
//! whether it was achieved.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// How the user picks the day's mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionChoice {
    /// Zero-based index into the suggested missions
    Suggested(usize),
    /// User-authored mission text
    Custom(String),
}

/// Achievement state of a chosen mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Achieved,
    NotAchieved,
    Unset,
}

impl MissionStatus {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => MissionStatus::Achieved,
            Some(false) => MissionStatus::NotAchieved,
            None => MissionStatus::Unset,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Achieved => "achieved",
            MissionStatus::NotAchieved => "not_achieved",
            MissionStatus::Unset => "unset",
        }
    }
}

/// Missions for one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDay {
    pub date: String,
    pub auto: Vec<String>,
    pub custom: Vec<String>,
    pub selected: Option<String>,
    pub status: BTreeMap<String, bool>,
}

impl MissionDay {
    pub fn new(date: &str, auto: Vec<String>) -> Self {
        Self {
            date: date.to_string(),
            auto,
            custom: Vec::new(),
            selected: None,
            status: BTreeMap::new(),
        }
    }

    /// Select the day's mission, returning the chosen text
    pub fn choose(&mut self, choice: MissionChoice) -> Result<String, String> {
        let chosen = match choice {
            MissionChoice::Suggested(index) => self
                .auto
                .get(index)
                .cloned()
                .ok_or_else(|| format!("No suggested mission at index {}", index))?,
            MissionChoice::Custom(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err("Custom mission is empty".to_string());
                }
                if !self.custom.contains(&text) {
                    self.custom.push(text.clone());
                }
                text
            }
        };

        self.status.entry(chosen.clone()).or_insert(false);
        self.selected = Some(chosen.clone());
        Ok(chosen)
    }

    /// Mark the selected mission achieved or not
    pub fn set_achieved(&mut self, achieved: bool) -> Result<&str, String> {
        let selected = self
            .selected
            .as_deref()
            .ok_or_else(|| "No mission has been selected for this date".to_string())?;
        self.status.insert(selected.to_string(), achieved);
        Ok(selected)
    }

    pub fn selected_status(&self) -> MissionStatus {
        let flag = self
            .selected
            .as_ref()
            .and_then(|s| self.status.get(s).copied());
        MissionStatus::from_flag(flag)
    }

    fn from_row(row: &Row) -> rusqlite::Result<(String, String, String, Option<String>, String)> {
        Ok((
            row.get("date")?,
            row.get("auto_missions")?,
            row.get("custom_missions")?,
            row.get("selected")?,
            row.get("status")?,
        ))
    }

    fn decode(raw: (String, String, String, Option<String>, String)) -> DbResult<Self> {
        let (date, auto, custom, selected, status) = raw;
        Ok(Self {
            date,
            auto: serde_json::from_str(&auto)?,
            custom: serde_json::from_str(&custom)?,
            selected,
            status: serde_json::from_str(&status)?,
        })
    }

    /// Get the missions for a date
    pub fn get(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM mission_days WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(raw) => Ok(Some(Self::decode(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a new mission day unless one already exists; returns the stored day
    pub fn insert_if_absent(conn: &Connection, day: &MissionDay) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT OR IGNORE INTO mission_days (date, auto_missions, custom_missions, selected, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                day.date,
                serde_json::to_string(&day.auto)?,
                serde_json::to_string(&day.custom)?,
                day.selected,
                serde_json::to_string(&day.status)?,
            ],
        )?;

        Self::get(conn, &day.date)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Insert or replace the stored missions for this date
    pub fn save(&self, conn: &Connection) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO mission_days (date, auto_missions, custom_missions, selected, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(date) DO UPDATE SET
                auto_missions = excluded.auto_missions,
                custom_missions = excluded.custom_missions,
                selected = excluded.selected,
                status = excluded.status,
                updated_at = datetime('now')
            "#,
            params![
                self.date,
                serde_json::to_string(&self.auto)?,
                serde_json::to_string(&self.custom)?,
                self.selected,
                serde_json::to_string(&self.status)?,
            ],
        )?;
        Ok(())
    }

    /// All mission days, ascending by date
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM mission_days ORDER BY date ASC")?;
        let raws = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(Self::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn day() -> MissionDay {
        MissionDay::new(
            "2025-06-01",
            vec!["野菜を1食とる".into(), "水を1杯飲む".into(), "20分歩く".into()],
        )
    }

    #[test]
    fn test_choose_suggested() {
        let mut d = day();
        assert_eq!(d.choose(MissionChoice::Suggested(1)).unwrap(), "水を1杯飲む");
        assert_eq!(d.selected.as_deref(), Some("水を1杯飲む"));
        assert_eq!(d.status.get("水を1杯飲む"), Some(&false));
        assert_eq!(d.selected_status(), MissionStatus::NotAchieved);
        assert!(d.choose(MissionChoice::Suggested(3)).is_err());
    }

    #[test]
    fn test_choose_custom() {
        let mut d = day();
        assert!(d.choose(MissionChoice::Custom("   ".into())).is_err());
        assert!(d.selected.is_none());

        d.choose(MissionChoice::Custom(" 早く寝る ".into())).unwrap();
        d.choose(MissionChoice::Custom("早く寝る".into())).unwrap();
        assert_eq!(d.custom, vec!["早く寝る"]);
        assert_eq!(d.selected.as_deref(), Some("早く寝る"));
    }

    #[test]
    fn test_status_requires_selection() {
        let mut d = day();
        assert!(d.set_achieved(true).is_err());
        assert_eq!(d.selected_status(), MissionStatus::Unset);

        d.choose(MissionChoice::Suggested(0)).unwrap();
        d.set_achieved(true).unwrap();
        assert_eq!(d.selected_status(), MissionStatus::Achieved);

        // re-choosing keeps an existing status
        d.choose(MissionChoice::Suggested(0)).unwrap();
        assert_eq!(d.selected_status(), MissionStatus::Achieved);
    }

    #[test]
    fn test_persistence() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let stored = MissionDay::insert_if_absent(&conn, &day()).unwrap();
        assert_eq!(stored, day());

        let mut changed = stored.clone();
        changed.choose(MissionChoice::Custom("ストレッチ".into())).unwrap();
        changed.save(&conn).unwrap();

        // a second insert does not clobber the saved selection
        let again = MissionDay::insert_if_absent(&conn, &day()).unwrap();
        assert_eq!(again.selected.as_deref(), Some("ストレッチ"));

        MissionDay::new("2025-05-31", vec![]).save(&conn).unwrap();
        let dates: Vec<_> = MissionDay::list(&conn).unwrap().into_iter().map(|d| d.date).collect();
        assert_eq!(dates, vec!["2025-05-31", "2025-06-01"]);
    }
}
