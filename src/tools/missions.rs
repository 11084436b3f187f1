//! Mission MCP Tools
//!
//! Daily mission suggestions, selection and achievement tracking.

use rusqlite::TransactionBehavior;
use serde::Serialize;

use crate::coach::{generate_missions, CoachContext, TextGenerator};
use crate::db::Database;
use crate::models::{get_day_meals, MissionChoice, MissionDay, MissionStatus, UserProfile};
use crate::nutrition::estimate_day;

use super::validate_date;

/// Response for the mission tools
#[derive(Debug, Serialize)]
pub struct MissionDayResponse {
    pub date: String,
    pub suggestions: Vec<String>,
    pub custom: Vec<String>,
    pub selected: Option<String>,
    pub status: MissionStatus,
    /// true if the suggestions were generated by this call
    pub generated: bool,
}

impl MissionDayResponse {
    fn new(day: MissionDay, generated: bool) -> Self {
        let status = day.selected_status();
        Self {
            date: day.date,
            suggestions: day.auto,
            custom: day.custom,
            selected: day.selected,
            status,
            generated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MissionHistoryEntry {
    pub date: String,
    pub mission: String,
    pub status: MissionStatus,
}

/// Response for mission_history
#[derive(Debug, Serialize)]
pub struct MissionHistoryResponse {
    pub entries: Vec<MissionHistoryEntry>,
    pub achieved: usize,
    pub total: usize,
}

/// Get the day's missions, generating suggestions first if the day has none
pub async fn get_missions(
    db: &Database,
    generator: &dyn TextGenerator,
    date: &str,
) -> Result<MissionDayResponse, String> {
    let date = validate_date(date)?;

    // Gather everything needed for the prompt, then release the connection
    // before awaiting the generator.
    let ctx = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        if let Some(day) = MissionDay::get(&conn, &date)
            .map_err(|e| format!("Failed to get missions: {}", e))?
        {
            return Ok(MissionDayResponse::new(day, false));
        }

        let profile =
            UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
        let meals =
            get_day_meals(&conn, &date).map_err(|e| format!("Failed to load meals: {}", e))?;
        CoachContext::new(profile.as_ref(), estimate_day(&meals))
    };

    let suggestions = generate_missions(generator, &ctx).await;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let stored = MissionDay::insert_if_absent(&conn, &MissionDay::new(&date, suggestions))
        .map_err(|e| format!("Failed to store missions: {}", e))?;
    tracing::info!(%date, backend = generator.name(), "missions created");
    Ok(MissionDayResponse::new(stored, true))
}

fn load_day(conn: &rusqlite::Connection, date: &str) -> Result<MissionDay, String> {
    MissionDay::get(conn, date)
        .map_err(|e| format!("Failed to get missions: {}", e))?
        .ok_or_else(|| format!("No missions for {}. Call get_missions first.", date))
}

/// Load, modify and save a mission day under one immediate transaction
fn modify_day<T>(
    db: &Database,
    date: &str,
    modify: impl FnOnce(&mut MissionDay) -> Result<T, String>,
) -> Result<(MissionDay, T), String> {
    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| format!("Database error: {}", e))?;

    let mut day = load_day(&tx, date)?;
    let out = modify(&mut day)?;
    day.save(&tx).map_err(|e| format!("Failed to save missions: {}", e))?;
    tx.commit().map_err(|e| format!("Failed to save missions: {}", e))?;
    Ok((day, out))
}

/// Choose a suggested mission by index, or set a custom one
pub fn choose_mission(
    db: &Database,
    date: &str,
    index: Option<usize>,
    custom_text: Option<&str>,
) -> Result<MissionDayResponse, String> {
    let date = validate_date(date)?;
    let choice = match (index, custom_text) {
        (Some(i), None) => MissionChoice::Suggested(i),
        (None, Some(text)) => MissionChoice::Custom(text.to_string()),
        _ => return Err("Provide exactly one of index or custom_text".to_string()),
    };

    let (day, chosen) = modify_day(db, &date, |day| day.choose(choice))?;

    tracing::info!(%date, mission = %chosen, "mission chosen");
    Ok(MissionDayResponse::new(day, false))
}

/// Record whether the selected mission was achieved
pub fn set_mission_status(
    db: &Database,
    date: &str,
    achieved: bool,
) -> Result<MissionDayResponse, String> {
    let date = validate_date(date)?;

    let (day, _) = modify_day(db, &date, |day| day.set_achieved(achieved).map(|_| ()))?;
    Ok(MissionDayResponse::new(day, false))
}

/// Days with a chosen mission, oldest first
pub fn mission_history(db: &Database) -> Result<MissionHistoryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let days = MissionDay::list(&conn).map_err(|e| format!("Failed to list missions: {}", e))?;

    let entries: Vec<MissionHistoryEntry> = days
        .into_iter()
        .filter_map(|day| {
            let status = day.selected_status();
            day.selected.map(|mission| MissionHistoryEntry {
                date: day.date,
                mission,
                status,
            })
        })
        .collect();

    let achieved = entries
        .iter()
        .filter(|e| e.status == MissionStatus::Achieved)
        .count();
    let total = entries.len();
    Ok(MissionHistoryResponse { entries, achieved, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::coach::{DisabledGenerator, GenerationError, GenerationPurpose, FALLBACK_MISSIONS};

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate_text(
            &self,
            _purpose: GenerationPurpose,
            prompt: &str,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.contains("年齢: 未登録"));
            Ok("1. 朝に白湯を飲む\n2. 階段を使う\n3. 早めに寝る".to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = crate::db::open_and_migrate(&dir.path().join("wellness.db")).unwrap();
        (dir, database)
    }

    #[tokio::test]
    async fn test_missions_generated_once() {
        let (_dir, db) = db();
        let generator = CountingGenerator::default();

        let first = get_missions(&db, &generator, "2025-06-01").await.unwrap();
        assert!(first.generated);
        assert_eq!(first.suggestions, vec!["朝に白湯を飲む", "階段を使う", "早めに寝る"]);
        assert_eq!(first.status, MissionStatus::Unset);

        let second = get_missions(&db, &generator, "2025-06-01").await.unwrap();
        assert!(!second.generated);
        assert_eq!(second.suggestions, first.suggestions);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_then_choose_and_complete() {
        let (_dir, db) = db();
        let day = get_missions(&db, &DisabledGenerator, "2025-06-02").await.unwrap();
        assert_eq!(day.suggestions, FALLBACK_MISSIONS.to_vec());

        assert!(set_mission_status(&db, "2025-06-02", true).is_err());

        let chosen = choose_mission(&db, "2025-06-02", Some(2), None).unwrap();
        assert_eq!(chosen.selected.as_deref(), Some("20分歩く"));
        assert_eq!(chosen.status, MissionStatus::NotAchieved);

        let done = set_mission_status(&db, "2025-06-02", true).unwrap();
        assert_eq!(done.status, MissionStatus::Achieved);
    }

    #[tokio::test]
    async fn test_history_lists_only_chosen_days() {
        let (_dir, db) = db();
        for date in ["2025-06-03", "2025-06-01", "2025-06-02"] {
            get_missions(&db, &DisabledGenerator, date).await.unwrap();
        }
        choose_mission(&db, "2025-06-03", None, Some("ストレッチ")).unwrap();
        choose_mission(&db, "2025-06-01", Some(0), None).unwrap();
        set_mission_status(&db, "2025-06-01", true).unwrap();

        let history = mission_history(&db).unwrap();
        let dates: Vec<_> = history.entries.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-01", "2025-06-03"]);
        assert_eq!(history.achieved, 1);
        assert_eq!(history.entries[1].status, MissionStatus::NotAchieved);
    }

    #[tokio::test]
    async fn test_concurrent_custom_choices_are_all_kept() {
        let (_dir, db) = db();
        get_missions(&db, &DisabledGenerator, "2025-06-04").await.unwrap();

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let db = db.clone();
                std::thread::spawn(move || {
                    for n in 0..5 {
                        let text = format!("custom-{}-{}", worker, n);
                        choose_mission(&db, "2025-06-04", None, Some(&text)).unwrap();
                    }
                })
            })
            .collect();
        for handle in workers {
            handle.join().unwrap();
        }

        let conn = db.get_conn().unwrap();
        let day = MissionDay::get(&conn, "2025-06-04").unwrap().unwrap();
        assert_eq!(day.custom.len(), 20);
        assert_eq!(day.status.len(), 20);
        let selected = day.selected.unwrap();
        assert!(day.custom.contains(&selected));
    }

    #[test]
    fn test_choose_argument_rules() {
        let (_dir, db) = db();
        assert!(choose_mission(&db, "2025-06-01", Some(0), Some("x")).is_err());
        assert!(choose_mission(&db, "2025-06-01", None, None).is_err());
        let err = choose_mission(&db, "2025-06-01", Some(0), None).unwrap_err();
        assert!(err.contains("get_missions"));
    }
}
