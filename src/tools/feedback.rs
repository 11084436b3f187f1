//! Feedback MCP Tools
//!
//! Generates, stores and lists the end-of-day feedback text.

use serde::Serialize;

use crate::coach::{generate_feedback_text, CoachContext, TextGenerator};
use crate::db::Database;
use crate::models::{get_day_meals, FeedbackMeta, FeedbackRecord, MissionDay, UserProfile};
use crate::nutrition::estimate_day;

use super::meals::DayMealsView;
use super::validate_date;

/// Response for generate_feedback
#[derive(Debug, Serialize)]
pub struct GenerateFeedbackResponse {
    pub date: String,
    pub text: String,
    pub meta: FeedbackMeta,
    /// true if an older record for the date was replaced
    pub replaced: bool,
}

/// Stored feedback together with that day's meals
#[derive(Debug, Serialize)]
pub struct FeedbackHistoryEntry {
    pub date: String,
    pub text: String,
    pub meta: FeedbackMeta,
    pub meals: DayMealsView,
}

#[derive(Debug, Serialize)]
pub struct FeedbackHistoryResponse {
    pub entries: Vec<FeedbackHistoryEntry>,
    pub total: usize,
}

/// Generate feedback for a date and store it, replacing any earlier record
pub async fn generate_feedback(
    db: &Database,
    generator: &dyn TextGenerator,
    date: &str,
) -> Result<GenerateFeedbackResponse, String> {
    let date = validate_date(date)?;

    let (ctx, meals, selected, replaced) = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
        let meals = get_day_meals(&conn, &date).map_err(|e| format!("Failed to load meals: {}", e))?;
        let selected = MissionDay::get(&conn, &date)
            .map_err(|e| format!("Failed to get missions: {}", e))?
            .and_then(|d| d.selected);
        let replaced = FeedbackRecord::get(&conn, &date)
            .map_err(|e| format!("Failed to get feedback: {}", e))?
            .is_some();
        let ctx = CoachContext::new(profile.as_ref(), estimate_day(&meals));
        (ctx, meals, selected, replaced)
    };

    let text = generate_feedback_text(generator, &ctx, &meals, selected.as_deref()).await;

    let meta = FeedbackMeta {
        age: ctx.age,
        gender: ctx.gender.clone(),
        self_esteem: ctx.self_esteem.clone(),
        selected_mission: selected,
        nutrient_totals: ctx.totals,
        tendencies: ctx.tendencies.iter().map(|t| t.label().to_string()).collect(),
    };
    let record = FeedbackRecord {
        date: date.clone(),
        text,
        meta,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    record
        .upsert(&conn)
        .map_err(|e| format!("Failed to store feedback: {}", e))?;

    tracing::info!(%date, replaced, backend = generator.name(), "feedback stored");
    Ok(GenerateFeedbackResponse {
        date: record.date,
        text: record.text,
        meta: record.meta,
        replaced,
    })
}

pub fn get_feedback(db: &Database, date: &str) -> Result<Option<FeedbackRecord>, String> {
    let date = validate_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    FeedbackRecord::get(&conn, &date).map_err(|e| format!("Failed to get feedback: {}", e))
}

/// All stored feedback, newest first
pub fn feedback_history(db: &Database) -> Result<FeedbackHistoryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let records = FeedbackRecord::list(&conn).map_err(|e| format!("Failed to list feedback: {}", e))?;

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let meals = get_day_meals(&conn, &record.date)
            .map_err(|e| format!("Failed to load meals: {}", e))?;
        entries.push(FeedbackHistoryEntry {
            date: record.date,
            text: record.text,
            meta: record.meta,
            meals: DayMealsView::from(&meals),
        });
    }

    let total = entries.len();
    Ok(FeedbackHistoryResponse { entries, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::coach::{DisabledGenerator, GenerationError, GenerationPurpose, FEEDBACK_FALLBACK};
    use crate::tools::{meals, missions, profile};

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate_text(
            &self,
            _purpose: GenerationPurpose,
            prompt: &str,
        ) -> Result<String, GenerationError> {
            Ok(prompt.to_string())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = crate::db::open_and_migrate(&dir.path().join("wellness.db")).unwrap();
        (dir, database)
    }

    #[tokio::test]
    async fn test_feedback_snapshot() {
        let (_dir, db) = db();
        profile::register_profile(&db, "1990-05-05", "女性", "京都府").unwrap();
        profile::submit_self_esteem(&db, &[1, 1, 6, 1, 6, 1, 1, 6, 6, 6]).unwrap();
        meals::add_meal_item(&db, "2025-06-01", "夕食", "ハンバーグ", Some("多め")).unwrap();
        missions::get_missions(&db, &DisabledGenerator, "2025-06-01").await.unwrap();
        missions::choose_mission(&db, "2025-06-01", Some(1), None).unwrap();

        let resp = generate_feedback(&db, &EchoGenerator, "2025-06-01").await.unwrap();
        assert!(!resp.replaced);
        assert!(resp.text.contains("夕食: ハンバーグ（量: 多め）"));
        assert!(resp.text.contains("今日のミッション: 水を1杯飲む"));
        assert!(resp.text.contains("自尊感情レベル: 低"));

        assert_eq!(resp.meta.gender.as_deref(), Some("女性"));
        assert_eq!(resp.meta.self_esteem.as_deref(), Some("低"));
        assert_eq!(resp.meta.selected_mission.as_deref(), Some("水を1杯飲む"));
        assert_eq!(resp.meta.nutrient_totals.protein, 21.6);
        assert_eq!(resp.meta.tendencies, vec!["タンパク質不足傾向"]);
    }

    #[tokio::test]
    async fn test_regenerate_replaces() {
        let (_dir, db) = db();
        generate_feedback(&db, &EchoGenerator, "2025-06-01").await.unwrap();
        let second = generate_feedback(&db, &DisabledGenerator, "2025-06-01").await.unwrap();
        assert!(second.replaced);
        assert_eq!(second.text, FEEDBACK_FALLBACK);
        assert!(second.meta.age.is_none());

        let stored = get_feedback(&db, "2025-06-01").unwrap().unwrap();
        assert_eq!(stored.text, FEEDBACK_FALLBACK);
        assert_eq!(feedback_history(&db).unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_history_newest_first_with_meals() {
        let (_dir, db) = db();
        meals::add_meal_item(&db, "2025-06-02", "朝食", "パン", None).unwrap();
        for date in ["2025-06-01", "2025-06-02"] {
            generate_feedback(&db, &DisabledGenerator, date).await.unwrap();
        }

        let history = feedback_history(&db).unwrap();
        assert_eq!(history.entries[0].date, "2025-06-02");
        assert_eq!(history.entries[0].meals.breakfast[0].name, "パン");
        assert!(history.entries[1].meals.breakfast.is_empty());
    }
}
