//! Profile and Self-Esteem MCP Tools
//!
//! Tools for registering the user and recording the self-esteem inventory.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::esteem::{self, EsteemLevel, QUESTIONS, SCALE_LABELS};
use crate::models::{calculate_age, is_prefecture, Gender, ProfileRegistration, UserProfile};

const MIN_BIRTH_YEAR: i32 = 1900;

/// One inventory statement
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub number: usize,
    pub text: &'static str,
}

/// One point on the answer scale
#[derive(Debug, Serialize)]
pub struct ScaleView {
    pub value: usize,
    pub label: &'static str,
}

/// Response for self_esteem_questions
#[derive(Debug, Serialize)]
pub struct SelfEsteemQuestionsResponse {
    pub questions: Vec<QuestionView>,
    pub scale: Vec<ScaleView>,
}

/// Response for submit_self_esteem
#[derive(Debug, Serialize)]
pub struct SubmitSelfEsteemResponse {
    pub raw_score: u32,
    pub level: EsteemLevel,
    pub level_label: &'static str,
    pub profile: UserProfile,
}

/// Validate raw registration input against `today`
pub fn validate_registration(
    birth: &str,
    gender: &str,
    region: &str,
    today: NaiveDate,
) -> Result<ProfileRegistration, String> {
    let birth = NaiveDate::parse_from_str(birth.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid birth date '{}'. Use YYYY-MM-DD.", birth))?;
    if birth > today {
        return Err("Birth date cannot be in the future".to_string());
    }
    if birth.year() < MIN_BIRTH_YEAR {
        return Err(format!("Birth year must be {} or later", MIN_BIRTH_YEAR));
    }

    let gender = Gender::parse(gender)
        .ok_or_else(|| format!("Invalid gender '{}'. Use 男性, 女性 or その他.", gender))?;

    let region = region.trim();
    if !is_prefecture(region) {
        return Err(format!("Unknown region '{}'. Use a prefecture name such as 東京都.", region));
    }

    Ok(ProfileRegistration {
        birth,
        gender,
        region: region.to_string(),
        age: calculate_age(birth, today),
    })
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Register or update the profile
pub fn register_profile(
    db: &Database,
    birth: &str,
    gender: &str,
    region: &str,
) -> Result<UserProfile, String> {
    register_profile_on(db, birth, gender, region, today())
}

pub fn register_profile_on(
    db: &Database,
    birth: &str,
    gender: &str,
    region: &str,
    today: NaiveDate,
) -> Result<UserProfile, String> {
    let data = validate_registration(birth, gender, region, today)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = UserProfile::register(&conn, &data)
        .map_err(|e| format!("Failed to register profile: {}", e))?;
    tracing::info!(age = profile.age, region = %profile.region, "profile registered");
    Ok(profile)
}

pub fn get_profile(db: &Database) -> Result<Option<UserProfile>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))
}

pub fn self_esteem_questions() -> SelfEsteemQuestionsResponse {
    SelfEsteemQuestionsResponse {
        questions: QUESTIONS
            .iter()
            .enumerate()
            .map(|(i, text)| QuestionView { number: i + 1, text: *text })
            .collect(),
        scale: SCALE_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| ScaleView { value: i + 1, label: *label })
            .collect(),
    }
}

/// Score ten responses and store the result on the profile
pub fn submit_self_esteem(db: &Database, responses: &[i64]) -> Result<SubmitSelfEsteemResponse, String> {
    let result = esteem::score(responses).map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::set_self_esteem(&conn, &result)
        .map_err(|e| format!("Failed to save self-esteem result: {}", e))?;

    tracing::info!(score = result.raw_score, level = result.level.as_str(), "self-esteem recorded");
    Ok(SubmitSelfEsteemResponse {
        raw_score: result.raw_score,
        level: result.level,
        level_label: result.level.label(),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = crate::db::open_and_migrate(&dir.path().join("wellness.db")).unwrap();
        (dir, database)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_registration() {
        let today = day(2025, 6, 1);
        let ok = validate_registration("1990-06-02", "その他", " 沖縄県 ", today).unwrap();
        assert_eq!(ok.age, 34);
        assert_eq!(ok.region, "沖縄県");

        assert!(validate_registration("1990/06/02", "女性", "東京都", today).is_err());
        assert!(validate_registration("2025-06-02", "女性", "東京都", today).is_err());
        assert!(validate_registration("1899-12-31", "女性", "東京都", today).is_err());
        assert!(validate_registration("1990-01-01", "不明", "東京都", today).is_err());
        assert!(validate_registration("1990-01-01", "女性", "Tokyo", today).is_err());
    }

    #[test]
    fn test_questions_and_scale() {
        let resp = self_esteem_questions();
        assert_eq!(resp.questions.len(), 10);
        assert_eq!(resp.questions[0].number, 1);
        assert_eq!(resp.scale.len(), 6);
        assert_eq!(resp.scale[5].value, 6);
    }

    #[test]
    fn test_submit_requires_profile_then_persists() {
        let (_dir, db) = db();
        assert!(submit_self_esteem(&db, &[3; 10]).is_err());

        register_profile_on(&db, "2000-01-15", "男性", "北海道", day(2025, 1, 14)).unwrap();
        let resp = submit_self_esteem(&db, &[3; 10]).unwrap();
        assert_eq!(resp.raw_score, 35);
        assert_eq!(resp.level_label, "高");
        assert_eq!(resp.profile.age, 24);

        let stored = get_profile(&db).unwrap().unwrap();
        assert_eq!(stored.self_esteem_level, Some(EsteemLevel::High));
    }

    #[test]
    fn test_submit_rejects_bad_responses() {
        let (_dir, db) = db();
        register_profile_on(&db, "2000-01-15", "男性", "北海道", day(2025, 1, 14)).unwrap();
        let err = submit_self_esteem(&db, &[3, 3, 7, 3, 3, 3, 3, 3, 3, 3]).unwrap_err();
        assert!(err.contains("Invalid input"));
        assert!(get_profile(&db).unwrap().unwrap().self_esteem_score.is_none());
    }
}
