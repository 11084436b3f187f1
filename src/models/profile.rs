//! User profile model
//!
//! Demographics and the latest self-esteem result. Single row table.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::esteem::{EsteemLevel, EsteemResult};

/// Gender as offered at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "男性",
            Gender::Female => "女性",
            Gender::Other => "その他",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "男性" => Some(Gender::Male),
            "女性" => Some(Gender::Female),
            "その他" => Some(Gender::Other),
            other => match other.to_lowercase().as_str() {
                "male" => Some(Gender::Male),
                "female" => Some(Gender::Female),
                "other" => Some(Gender::Other),
                _ => None,
            },
        }
    }
}

pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県",
    "岐阜県", "静岡県", "愛知県", "三重県",
    "滋賀県", "京都府", "大阪府", "兵庫県", "奈良県", "和歌山県",
    "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県",
    "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

pub fn is_prefecture(region: &str) -> bool {
    PREFECTURES.contains(&region)
}

/// Completed years between `birth` and `today`
pub fn calculate_age(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Registered user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub birth: String,
    pub gender: Gender,
    pub region: String,
    pub age: u32,
    pub self_esteem_level: Option<EsteemLevel>,
    pub self_esteem_score: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for registering a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRegistration {
    pub birth: NaiveDate,
    pub gender: Gender,
    pub region: String,
    pub age: u32,
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender_str: String = row.get("gender")?;
        let level_str: Option<String> = row.get("self_esteem_level")?;
        let score: Option<i64> = row.get("self_esteem_score")?;
        let age: i64 = row.get("age")?;
        Ok(Self {
            birth: row.get("birth")?,
            gender: Gender::parse(&gender_str).unwrap_or(Gender::Other),
            region: row.get("region")?,
            age: age.max(0) as u32,
            self_esteem_level: level_str.as_deref().and_then(EsteemLevel::parse),
            self_esteem_score: score.map(|s| s.max(0) as u32),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile, if registered
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Register or re-register demographics (upsert). Self-esteem fields are kept.
    pub fn register(conn: &Connection, data: &ProfileRegistration) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO user_profile (id, birth, gender, region, age)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                birth = excluded.birth,
                gender = excluded.gender,
                region = excluded.region,
                age = excluded.age,
                updated_at = datetime('now')
            "#,
            params![
                data.birth.format("%Y-%m-%d").to_string(),
                data.gender.as_str(),
                data.region,
                data.age as i64,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Record a scored inventory on the profile
    pub fn set_self_esteem(conn: &Connection, result: &EsteemResult) -> DbResult<Self> {
        let rows = conn.execute(
            r#"
            UPDATE user_profile SET
                self_esteem_level = ?1,
                self_esteem_score = ?2,
                updated_at = datetime('now')
            WHERE id = 1
            "#,
            params![result.level.as_str(), result.raw_score as i64],
        )?;
        if rows == 0 {
            return Err(DbError::InvalidInput(
                "Profile is not registered. Call register_profile first.".to_string(),
            ));
        }

        Self::get(conn)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Restore a profile exactly as given (used by journal import)
    pub fn restore(
        conn: &Connection,
        data: &ProfileRegistration,
        level: Option<EsteemLevel>,
        score: Option<u32>,
    ) -> DbResult<Self> {
        Self::register(conn, data)?;
        conn.execute(
            "UPDATE user_profile SET self_esteem_level = ?1, self_esteem_score = ?2 WHERE id = 1",
            params![level.map(|l| l.as_str()), score.map(|s| s as i64)],
        )?;
        Self::get(conn)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn registration() -> ProfileRegistration {
        ProfileRegistration {
            birth: NaiveDate::from_ymd_opt(2000, 4, 2).unwrap(),
            gender: Gender::Female,
            region: "大阪府".to_string(),
            age: 25,
        }
    }

    #[test]
    fn test_calculate_age() {
        let birth = NaiveDate::from_ymd_opt(2000, 4, 2).unwrap();
        assert_eq!(calculate_age(birth, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()), 24);
        assert_eq!(calculate_age(birth, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap()), 25);
        assert_eq!(calculate_age(birth, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()), 0);
    }

    #[test]
    fn test_gender_and_region() {
        assert_eq!(Gender::parse("女性"), Some(Gender::Female));
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse("?"), None);
        assert!(is_prefecture("東京都"));
        assert!(!is_prefecture("Tokyo"));
    }

    #[test]
    fn test_register_then_score() {
        let conn = conn();
        assert!(UserProfile::get(&conn).unwrap().is_none());

        let profile = UserProfile::register(&conn, &registration()).unwrap();
        assert_eq!(profile.birth, "2000-04-02");
        assert_eq!(profile.gender, Gender::Female);
        assert!(profile.self_esteem_level.is_none());

        let result = EsteemResult { raw_score: 41, level: EsteemLevel::High };
        let profile = UserProfile::set_self_esteem(&conn, &result).unwrap();
        assert_eq!(profile.self_esteem_score, Some(41));
        assert_eq!(profile.self_esteem_level, Some(EsteemLevel::High));

        // re-registering keeps the inventory result
        let mut again = registration();
        again.region = "北海道".to_string();
        let profile = UserProfile::register(&conn, &again).unwrap();
        assert_eq!(profile.region, "北海道");
        assert_eq!(profile.self_esteem_score, Some(41));
    }

    #[test]
    fn test_score_requires_profile() {
        let conn = conn();
        let result = EsteemResult { raw_score: 20, level: EsteemLevel::Low };
        assert!(matches!(
            UserProfile::set_self_esteem(&conn, &result),
            Err(DbError::InvalidInput(_))
        ));
    }
}
